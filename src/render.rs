use crossterm::{
    cursor,
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use purrgotchi::{Facing, MoodId, PetView};
use std::io::{self, Write};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: Color::Black,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }
    pub(crate) fn clear(&mut self, bg: Color) {
        for c in &mut self.cells {
            *c = Cell {
                bg,
                ..Cell::default()
            };
        }
    }
}

pub(crate) struct Terminal {
    pub(crate) out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) prev: CellBuffer,
    pub(crate) cur: CellBuffer,
    /// The terminal sends key release events, so holds can be timed.
    pub(crate) reports_release: bool,
}

impl Terminal {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            terminal::Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let reports_release = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if reports_release {
            execute!(
                out,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }

        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
            reports_release,
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        if self.reports_release {
            queue!(self.out, PopKeyboardEnhancementFlags)?;
        }
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            EndSynchronizedUpdate,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        Ok(true)
    }

    pub(crate) fn present(&mut self, color: bool) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if c == self.prev.cells[i] {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;

                let (fg, bg) = if color {
                    (c.fg, c.bg)
                } else {
                    (Color::White, Color::Black)
                };
                if last_fg != Some(fg) {
                    queue!(self.out, SetForegroundColor(fg))?;
                    last_fg = Some(fg);
                }
                if last_bg != Some(bg) {
                    queue!(self.out, SetBackgroundColor(bg))?;
                    last_bg = Some(bg);
                }

                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}

/* -----------------------------
   Text + meters
------------------------------ */

pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color) {
    for (i, ch) in s.chars().enumerate() {
        let xx = x.saturating_add(i as u16);
        if xx >= buf.w || y >= buf.h {
            break;
        }
        buf.set(
            xx,
            y,
            Cell {
                ch,
                fg,
                bg: Color::Black,
            },
        );
    }
}

fn bar(value: i32, width: usize) -> String {
    let fill = (value.clamp(0, 100) as usize * width + 50) / 100;
    let mut s = String::with_capacity(width + 2);
    s.push('[');
    for i in 0..width {
        s.push(if i < fill { '█' } else { ' ' });
    }
    s.push(']');
    s
}

/// Hunger is bad when high, the others when low.
fn meter_color(value: i32, high_is_good: bool) -> Color {
    let goodness = if high_is_good { value } else { 100 - value };
    match goodness {
        g if g < 25 => Color::Red,
        g if g < 50 => Color::Yellow,
        _ => Color::Green,
    }
}

pub(crate) fn ui_overlay(buf: &mut CellBuffer, view: &PetView, show_help: bool) {
    let fg = Color::White;

    let title = format!(
        "Purrgotchi  |  mood: {}  |  day {}  streak {}",
        view.mood.label(),
        view.total_care_days,
        view.daily_streak
    );
    draw_text(buf, 1, 0, &title, fg);

    let s = view.stats;
    let lines = [
        ("Hunger", s.hunger, false),
        ("Happy ", s.happiness, true),
        ("Energy", s.energy, true),
    ];
    for (i, (name, val, high_is_good)) in lines.iter().enumerate() {
        let line = format!("{name}: {} {:>3}", bar(*val, 14), val);
        draw_text(buf, 1, 2 + i as u16, &line, meter_color(*val, *high_is_good));
    }

    let a = view.activity;
    let flags = format!(
        "eating={} sleeping={} playing={} petting={} dragging={}",
        a.is_eating as u8, a.is_sleeping as u8, a.is_playing as u8, a.is_petting as u8,
        a.is_dragging as u8
    );
    draw_text(buf, 1, 6, &flags, Color::DarkGrey);

    if show_help {
        let sleep = if view.can_sleep { "z sleep" } else { "(z sleep: not tired)" };
        let help = format!(
            "f feed | b/m ball/mouse | ←→ drag | space drop | x stop | p/P pet | {sleep} | h help | q quit"
        );
        draw_text(buf, 1, buf.h.saturating_sub(1), &help, fg);
    }
}

/* -----------------------------
   Cat sprites
------------------------------ */

fn sprite(view: &PetView) -> [&'static str; 4] {
    match view.mood {
        MoodId::Eating => [" /\\_/\\   ", "( o.o )  ", " > ^ <  o", " (nom)   "],
        MoodId::Resting => [" /\\_/\\   ", "( -.- )  ", " > ~ < zz", " (purr)  "],
        MoodId::Running => match (view.facing, view.run_frame) {
            (Facing::Right, 0) => ["   /\\_/\\ ", "~ ( o.o)>", "  /|  |\\ ", "         "],
            (Facing::Right, _) => ["   /\\_/\\ ", "~ ( o.o)>", "   |\\/|  ", "         "],
            (Facing::Left, 0) => [" /\\_/\\   ", "<(o.o ) ~", " /|  |\\  ", "         "],
            (Facing::Left, _) => [" /\\_/\\   ", "<(o.o ) ~", "  |\\/|   ", "         "],
        },
        MoodId::VeryHappy => [" /\\_/\\   ", "( ^o^ )  ", " > v <   ", "  \\_/    "],
        MoodId::SittingHappy => [" /\\_/\\   ", "( ^.^ )  ", " > w <   ", " (   )   "],
        MoodId::MildHappy => [" /\\_/\\   ", "( o.o )  ", " > - <   ", " (   )   "],
        MoodId::Sad => [" /\\_/\\   ", "( T.T )  ", " > n <   ", " (   )   "],
    }
}

pub(crate) fn draw_cat(buf: &mut CellBuffer, view: &PetView, cx: i32, cy: i32) {
    let lines = sprite(view);
    let fg = match view.mood {
        MoodId::Sad => Color::Blue,
        MoodId::Resting => Color::Magenta,
        MoodId::VeryHappy | MoodId::Running => Color::Yellow,
        _ => Color::White,
    };
    let x0 = cx - 4;
    let y0 = cy - 2;
    for (yy, line) in lines.iter().enumerate() {
        let y = y0 + yy as i32;
        if y < 0 || y >= buf.h as i32 {
            continue;
        }
        for (xx, ch) in line.chars().enumerate() {
            let x = x0 + xx as i32;
            if x >= 0 && x < buf.w as i32 {
                buf.set(
                    x as u16,
                    y as u16,
                    Cell {
                        ch,
                        fg,
                        bg: Color::Black,
                    },
                );
            }
        }
    }

    // hearts fan out above the head as the burst reveals them
    for i in 0..view.particles as i32 {
        let x = cx - 6 + (i * 2) % 14;
        let y = y0 - 1 - (i % 3);
        if x >= 0 && y >= 0 && x < buf.w as i32 && y < buf.h as i32 {
            buf.set(
                x as u16,
                y as u16,
                Cell {
                    ch: '♥',
                    fg: Color::Red,
                    bg: Color::Black,
                },
            );
        }
    }
}
