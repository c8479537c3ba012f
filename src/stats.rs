//! Bounded pet stats.
//!
//! Every write to hunger, happiness or energy goes through [`clamp`], so the
//! values stay in `[STAT_MIN, STAT_MAX]` no matter what delta is applied.

use serde::{Deserialize, Serialize};

pub const STAT_MIN: i32 = 0;
pub const STAT_MAX: i32 = 100;

/// Saturates `value` into `[min, max]`. Never fails.
pub fn clamp(value: i32, min: i32, max: i32) -> i32 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Clamp into the stat range.
pub fn clamp_stat(value: i32) -> i32 {
    clamp(value, STAT_MIN, STAT_MAX)
}

/// Signed change to apply to [`Stats`]. Fields default to zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatDelta {
    pub hunger: i32,
    pub happiness: i32,
    pub energy: i32,
}

impl StatDelta {
    pub const fn new(hunger: i32, happiness: i32, energy: i32) -> Self {
        Self {
            hunger,
            happiness,
            energy,
        }
    }

    pub const fn happiness(amount: i32) -> Self {
        Self::new(0, amount, 0)
    }
}

/// The three core stats. Higher hunger is worse; higher happiness and
/// energy are better.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub hunger: i32,
    pub happiness: i32,
    pub energy: i32,
}

impl Stats {
    pub fn new(hunger: i32, happiness: i32, energy: i32) -> Self {
        Self {
            hunger: clamp_stat(hunger),
            happiness: clamp_stat(happiness),
            energy: clamp_stat(energy),
        }
    }

    /// Returns the stats after `delta`, each field saturated independently.
    pub fn with(self, delta: StatDelta) -> Self {
        Self {
            hunger: clamp_stat(self.hunger.saturating_add(delta.hunger)),
            happiness: clamp_stat(self.happiness.saturating_add(delta.happiness)),
            energy: clamp_stat(self.energy.saturating_add(delta.energy)),
        }
    }

    pub fn in_range(&self) -> bool {
        [self.hunger, self.happiness, self.energy]
            .iter()
            .all(|v| (STAT_MIN..=STAT_MAX).contains(v))
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            hunger: 40,
            happiness: 60,
            energy: 70,
        }
    }
}
