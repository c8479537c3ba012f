use crate::config::{load_settings, project_paths, save_settings_atomic, Paths, Settings};
use crate::input::{collect_input_nonblocking, AppAction, InputMapper};
use crate::render::{draw_cat, ui_overlay, Terminal};
use anyhow::Context;
use chrono::{Local, Utc};
use purrgotchi::{FileStore, PetGame, RngDice, Rules};
use rand::{rngs::StdRng, SeedableRng};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::info;

pub(crate) struct App {
    settings: Settings,
    game: PetGame<FileStore>,
    paths: Paths,
    term: Terminal,
    should_quit: bool,
}

impl App {
    fn init() -> anyhow::Result<Self> {
        let paths = project_paths()?;
        init_tracing(&paths.log_path)?;
        let settings = load_settings(&paths.settings_path);

        let rng = if settings.seed == 0 {
            StdRng::from_entropy()
        } else {
            StdRng::seed_from_u64(settings.seed)
        };
        let store = FileStore::open(&paths.data_dir)
            .with_context(|| format!("opening save directory {}", paths.data_dir.display()))?;
        let now = Utc::now();
        let today = now.with_timezone(&Local).date_naive();
        let game = PetGame::start(store, Box::new(RngDice(rng)), Rules::default(), now, today);

        let term = Terminal::begin()?;

        Ok(Self {
            settings,
            game,
            paths,
            term,
            should_quit: false,
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let fps = self.settings.fps_cap.clamp(10, 240);
        let frame_dt = Duration::from_secs_f32(1.0 / fps as f32);
        let mut mapper = InputMapper::new(self.game.rules().long_press_ms, self.term.reports_release);

        while !self.should_quit {
            self.term.resize_if_needed()?;

            let events = collect_input_nonblocking(frame_dt)?;
            for ev in events {
                match mapper.map(&ev) {
                    Some(AppAction::Quit) => {
                        self.should_quit = true;
                        break;
                    }
                    Some(AppAction::HelpToggle) => {
                        self.settings.show_help = !self.settings.show_help;
                    }
                    Some(AppAction::Care(interaction)) => {
                        self.game.apply(interaction, Utc::now());
                    }
                    None => {}
                }
            }

            self.game.advance(Utc::now());
            self.render_frame()?;

            spin_sleep(frame_dt, Instant::now());
        }

        self.game.shutdown(Utc::now());
        self.term.end()?;
        save_settings_atomic(&self.paths.settings_path, &self.settings)?;
        Ok(())
    }

    fn render_frame(&mut self) -> anyhow::Result<()> {
        self.term.cur.clear(crossterm::style::Color::Black);

        let view = self.game.view(Utc::now());
        let cols = self.term.cols as i32;
        let rows = self.term.rows as i32;
        // the cat trots toward the side it faces while chasing
        let shift = match (view.activity.is_running(), view.facing) {
            (true, purrgotchi::Facing::Left) => -6,
            (true, purrgotchi::Facing::Right) => 6,
            _ => 0,
        };
        draw_cat(&mut self.term.cur, &view, cols / 2 + shift, rows / 2 + 2);
        ui_overlay(&mut self.term.cur, &view, self.settings.show_help);

        self.term.present(self.settings.enable_color)?;
        Ok(())
    }
}

pub(crate) fn run() -> anyhow::Result<()> {
    let mut app = App::init()?;
    info!("purrgotchi started");
    app.run()?;
    Ok(())
}

/// Logs go to a file; stdout belongs to the terminal UI.
fn init_tracing(log_path: &Path) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("opening log file {}", log_path.display()))?;
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
