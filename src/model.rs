use crate::mood::MoodId;
use crate::stats::{clamp_stat, StatDelta, Stats};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const MOOD_HISTORY_CAP: usize = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Toy {
    Ball,
    Mouse,
}

/// Last toy picked for play; `Nothing` once the play reward is committed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToyChoice {
    Ball,
    Mouse,
    #[default]
    #[serde(rename = "none")]
    Nothing,
}

impl From<Toy> for ToyChoice {
    fn from(t: Toy) -> Self {
        match t {
            Toy::Ball => ToyChoice::Ball,
            Toy::Mouse => ToyChoice::Mouse,
        }
    }
}

impl ToyChoice {
    pub fn toy(self) -> Option<Toy> {
        match self {
            ToyChoice::Ball => Some(Toy::Ball),
            ToyChoice::Mouse => Some(Toy::Mouse),
            ToyChoice::Nothing => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodEntry {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub time: DateTime<Utc>,
    pub mood: MoodId,
}

/// The persisted pet. Serialized with the same camelCase keys the
/// `cat_game_stats_v1` snapshot has always used.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetState {
    #[serde(flatten)]
    pub stats: Stats,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_interaction_time: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_fed_time: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_play_time: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_pet_time: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_sleep_time: DateTime<Utc>,
    pub total_care_days: u32,
    pub daily_streak: u32,
    pub last_toy: ToyChoice,
    pub mood_history: VecDeque<MoodEntry>,
}

/// Timestamp used for "never happened".
pub fn never() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}

impl PetState {
    /// A fresh pet created at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            stats: Stats::default(),
            last_interaction_time: now,
            last_fed_time: never(),
            last_play_time: never(),
            last_pet_time: never(),
            last_sleep_time: never(),
            total_care_days: 1,
            daily_streak: 1,
            last_toy: ToyChoice::Nothing,
            mood_history: VecDeque::new(),
        }
    }

    pub fn hunger(&self) -> i32 {
        self.stats.hunger
    }

    pub fn happiness(&self) -> i32 {
        self.stats.happiness
    }

    pub fn energy(&self) -> i32 {
        self.stats.energy
    }

    /// Copy of `self` with `delta` applied and clamped.
    pub fn adjusted(&self, delta: StatDelta) -> Self {
        Self {
            stats: self.stats.with(delta),
            ..self.clone()
        }
    }

    /// Appends `mood` if it differs from the newest entry. Returns whether
    /// the history changed.
    pub fn record_mood(&mut self, time: DateTime<Utc>, mood: MoodId) -> bool {
        if self.mood_history.back().map(|e| e.mood) == Some(mood) {
            return false;
        }
        self.mood_history.push_back(MoodEntry { time, mood });
        while self.mood_history.len() > MOOD_HISTORY_CAP {
            self.mood_history.pop_front();
        }
        true
    }

    pub fn current_mood_entry(&self) -> Option<&MoodEntry> {
        self.mood_history.back()
    }

    /// Restores invariants on a snapshot that came from outside the
    /// process.
    pub fn sanitized(mut self) -> Self {
        self.stats = Stats {
            hunger: clamp_stat(self.stats.hunger),
            happiness: clamp_stat(self.stats.happiness),
            energy: clamp_stat(self.stats.energy),
        };
        self.total_care_days = self.total_care_days.max(1);
        self.daily_streak = self.daily_streak.max(1);
        while self.mood_history.len() > MOOD_HISTORY_CAP {
            self.mood_history.pop_front();
        }
        self
    }
}
