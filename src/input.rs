use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use purrgotchi::{Facing, Interaction, PressKind, Toy};
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AppAction {
    Care(Interaction),
    HelpToggle,
    Quit,
}

#[derive(Clone, Debug)]
pub(crate) struct InputEvent {
    pub(crate) key: KeyCode,
    pub(crate) mods: KeyModifiers,
    pub(crate) kind: KeyEventKind,
    pub(crate) at: Instant,
}

pub(crate) fn collect_input_nonblocking(max_frame_time: Duration) -> anyhow::Result<Vec<InputEvent>> {
    let mut out = Vec::new();

    // poll with a tiny timeout so we stay responsive
    let timeout = std::cmp::min(Duration::from_millis(1), max_frame_time);
    while event::poll(timeout)? {
        if let Event::Key(k) = event::read()? {
            out.push(InputEvent {
                key: k.code,
                mods: k.modifiers,
                kind: k.kind,
                at: Instant::now(),
            });
            if out.len() >= 32 {
                break;
            }
        }
    }
    Ok(out)
}

/// Turns key events into actions. When the terminal reports releases, `p`
/// is classified by how long it was held; otherwise `p` is a tap and `P`
/// (shift) stands in for a held press.
#[derive(Debug)]
pub(crate) struct InputMapper {
    long_press_ms: u64,
    reports_release: bool,
    pet_down: Option<Instant>,
}

impl InputMapper {
    pub(crate) fn new(long_press_ms: u64, reports_release: bool) -> Self {
        Self {
            long_press_ms,
            reports_release,
            pet_down: None,
        }
    }

    pub(crate) fn map(&mut self, ev: &InputEvent) -> Option<AppAction> {
        if ev.key == KeyCode::Char('p') && self.reports_release {
            return self.timed_pet(ev);
        }
        if ev.kind == KeyEventKind::Release {
            return None;
        }
        if ev.key == KeyCode::Char('c') && ev.mods.contains(KeyModifiers::CONTROL) {
            return Some(AppAction::Quit);
        }
        let care = match ev.key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Some(AppAction::Quit),
            KeyCode::Char('h') | KeyCode::Char('H') => return Some(AppAction::HelpToggle),
            KeyCode::Char('f') | KeyCode::Char('F') => Interaction::Feed,
            KeyCode::Char('b') | KeyCode::Char('B') => Interaction::StartPlay(Toy::Ball),
            KeyCode::Char('m') | KeyCode::Char('M') => Interaction::StartPlay(Toy::Mouse),
            KeyCode::Left => Interaction::Drag(Facing::Left),
            KeyCode::Right => Interaction::Drag(Facing::Right),
            KeyCode::Char(' ') => Interaction::Drop,
            KeyCode::Char('x') | KeyCode::Char('X') => Interaction::StopPlay,
            KeyCode::Char('p') => Interaction::Pet(PressKind::Tap),
            KeyCode::Char('P') => Interaction::Pet(PressKind::LongPress),
            KeyCode::Char('z') | KeyCode::Char('Z') => Interaction::Sleep,
            _ => return None,
        };
        Some(AppAction::Care(care))
    }

    fn timed_pet(&mut self, ev: &InputEvent) -> Option<AppAction> {
        match ev.kind {
            KeyEventKind::Press => {
                self.pet_down.get_or_insert(ev.at);
                None
            }
            // auto-repeat while held
            KeyEventKind::Repeat => None,
            KeyEventKind::Release => {
                let down = self.pet_down.take()?;
                let held = ev.at.saturating_duration_since(down);
                let press = PressKind::from_hold(held, self.long_press_ms);
                Some(AppAction::Care(Interaction::Pet(press)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_at(code: KeyCode, kind: KeyEventKind, at: Instant) -> InputEvent {
        InputEvent {
            key: code,
            mods: KeyModifiers::NONE,
            kind,
            at,
        }
    }

    fn key(code: KeyCode) -> InputEvent {
        key_at(code, KeyEventKind::Press, Instant::now())
    }

    #[test]
    fn care_keys_map_to_interactions() {
        let mut m = InputMapper::new(600, false);
        assert_eq!(m.map(&key(KeyCode::Char('f'))), Some(AppAction::Care(Interaction::Feed)));
        assert_eq!(
            m.map(&key(KeyCode::Char('p'))),
            Some(AppAction::Care(Interaction::Pet(PressKind::Tap)))
        );
        assert_eq!(
            m.map(&key(KeyCode::Char('P'))),
            Some(AppAction::Care(Interaction::Pet(PressKind::LongPress)))
        );
        assert_eq!(
            m.map(&key(KeyCode::Left)),
            Some(AppAction::Care(Interaction::Drag(Facing::Left)))
        );
        assert_eq!(m.map(&key(KeyCode::Char('?'))), None);
    }

    #[test]
    fn releases_are_ignored_for_other_keys() {
        let mut m = InputMapper::new(600, true);
        let ev = key_at(KeyCode::Char('f'), KeyEventKind::Release, Instant::now());
        assert_eq!(m.map(&ev), None);
    }

    #[test]
    fn held_pet_key_is_classified_on_release() {
        let mut m = InputMapper::new(600, true);
        let t0 = Instant::now();

        assert_eq!(m.map(&key_at(KeyCode::Char('p'), KeyEventKind::Press, t0)), None);
        let quick = key_at(KeyCode::Char('p'), KeyEventKind::Release, t0 + Duration::from_millis(120));
        assert_eq!(
            m.map(&quick),
            Some(AppAction::Care(Interaction::Pet(PressKind::Tap)))
        );

        assert_eq!(m.map(&key_at(KeyCode::Char('p'), KeyEventKind::Press, t0)), None);
        let repeat = key_at(KeyCode::Char('p'), KeyEventKind::Repeat, t0 + Duration::from_millis(300));
        assert_eq!(m.map(&repeat), None);
        let held = key_at(KeyCode::Char('p'), KeyEventKind::Release, t0 + Duration::from_millis(650));
        assert_eq!(
            m.map(&held),
            Some(AppAction::Care(Interaction::Pet(PressKind::LongPress)))
        );
    }

    #[test]
    fn stray_release_without_press_does_nothing() {
        let mut m = InputMapper::new(600, true);
        let ev = key_at(KeyCode::Char('p'), KeyEventKind::Release, Instant::now());
        assert_eq!(m.map(&ev), None);
    }

    #[test]
    fn ctrl_c_quits() {
        let mut m = InputMapper::new(600, false);
        let ev = InputEvent {
            key: KeyCode::Char('c'),
            mods: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            at: Instant::now(),
        };
        assert_eq!(m.map(&ev), Some(AppAction::Quit));
    }
}
