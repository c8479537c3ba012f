use crate::model::Toy;
use crate::stats::StatDelta;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};

/// Inclusive millisecond range for randomized durations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl MsRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurstRules {
    pub bonus: i32,
    pub particles: u32,
    pub stagger_ms: u64,
    pub clear_after_ms: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rules {
    pub decay_period_ms: u64,  // 15s
    pub decay: StatDelta,
    pub mood_swing_cadence: MsRange, // 2h..4h
    pub mood_swing_chance: f64,
    pub mood_swing_amount: i32,
    pub autosave_period_ms: u64, // 5m

    pub combo_window_ms: u64,
    pub combo_bonus: i32,

    pub feed: StatDelta,
    pub eat_duration: MsRange,
    pub play_ball: StatDelta,
    pub play_mouse: StatDelta,
    pub run_frame_ms: u64,
    pub pet_tap: BurstRules,
    pub pet_long: BurstRules,
    pub long_press_ms: u64,
    pub petting_ms: u64,
    pub sleep: StatDelta,
    pub sleep_duration: MsRange,
    pub sleep_allowed_max_energy: i32,

    pub purr_window_ms: u64,
    /// Gap between two `advance` calls beyond which the session is treated
    /// as suspended and missed periodic ticks are dropped.
    pub suspend_threshold_ms: u64,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            decay_period_ms: 15_000,
            decay: StatDelta::new(2, -1, -2),
            mood_swing_cadence: MsRange::new(2 * 3_600_000, 4 * 3_600_000),
            mood_swing_chance: 0.2,
            mood_swing_amount: 10,
            autosave_period_ms: 5 * 60_000,

            combo_window_ms: 10_000,
            combo_bonus: 10,

            feed: StatDelta::new(-35, 5, 0),
            eat_duration: MsRange::new(4_000, 6_000),
            play_ball: StatDelta::new(8, 25, -12),
            play_mouse: StatDelta::new(6, 30, -8),
            run_frame_ms: 300,
            pet_tap: BurstRules {
                bonus: 15,
                particles: 6,
                stagger_ms: 200,
                clear_after_ms: 3_000,
            },
            pet_long: BurstRules {
                bonus: 25,
                particles: 8,
                stagger_ms: 150,
                clear_after_ms: 3_500,
            },
            long_press_ms: 600,
            petting_ms: 5_000,
            sleep: StatDelta::new(0, 0, 55),
            sleep_duration: MsRange::new(10_000, 15_000),
            sleep_allowed_max_energy: 40,

            purr_window_ms: 5 * 60_000,
            suspend_threshold_ms: 60_000,
        }
    }
}

impl Rules {
    pub fn play_delta(&self, toy: Toy) -> StatDelta {
        match toy {
            Toy::Ball => self.play_ball,
            Toy::Mouse => self.play_mouse,
        }
    }
}

pub fn ms(n: u64) -> ChronoDuration {
    ChronoDuration::milliseconds(i64::try_from(n).unwrap_or(i64::MAX))
}

/// `t + d`, saturating at the last representable instant.
pub fn later(t: DateTime<Utc>, d: ChronoDuration) -> DateTime<Utc> {
    t.checked_add_signed(d).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// `t` plus `n` milliseconds, saturating.
pub fn after(t: DateTime<Utc>, n: u64) -> DateTime<Utc> {
    later(t, ms(n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn after_saturates_instead_of_overflowing() {
        let t = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        assert_eq!(after(t, 1_500), t + ChronoDuration::milliseconds(1_500));
        assert_eq!(after(t, u64::MAX), DateTime::<Utc>::MAX_UTC);
        assert_eq!(after(DateTime::<Utc>::MAX_UTC, 1), DateTime::<Utc>::MAX_UTC);
    }
}
