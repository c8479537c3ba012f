//! Session-only state: the animation flags set by interactions and cleared
//! by timers. None of this is persisted.

use crate::rules::after;
use chrono::{DateTime, Utc};
use std::time::Duration;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PressKind {
    Tap,
    LongPress,
}

impl PressKind {
    /// Classifies a touch by how long it was held.
    pub fn from_hold(held: Duration, long_press_ms: u64) -> Self {
        if held >= Duration::from_millis(long_press_ms) {
            PressKind::LongPress
        } else {
            PressKind::Tap
        }
    }
}

/// Hearts spawned by petting. Particle `i` appears `i * stagger_ms` after
/// the burst starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParticleBurst {
    pub started_at: DateTime<Utc>,
    pub count: u32,
    pub stagger_ms: u64,
}

impl ParticleBurst {
    pub fn visible(&self, now: DateTime<Utc>) -> u32 {
        if now < self.started_at {
            return 0;
        }
        let elapsed = (now - self.started_at).num_milliseconds().max(0) as u64;
        let shown = match self.stagger_ms {
            0 => self.count,
            s => u32::try_from(elapsed / s + 1).unwrap_or(u32::MAX),
        };
        shown.min(self.count)
    }

    pub fn appear_at(&self, index: u32) -> DateTime<Utc> {
        after(self.started_at, self.stagger_ms.saturating_mul(u64::from(index)))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Activity {
    pub is_eating: bool,
    pub is_sleeping: bool,
    pub is_playing: bool,
    pub is_petting: bool,
    pub is_dragging: bool,
    pub facing: Facing,
    /// Alternates 0/1 while the cat chases a dragged toy.
    pub run_frame: u8,
    pub burst: Option<ParticleBurst>,
}

impl Activity {
    pub fn is_running(&self) -> bool {
        self.is_playing && self.is_dragging
    }

    pub fn flip_run_frame(&mut self) {
        self.run_frame ^= 1;
    }
}
