use crate::model::PetState;
use crate::store::{KeyValueStore, StoreError};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

pub const STATS_KEY: &str = "cat_game_stats_v1";
pub const LAST_DAY_KEY: &str = "cat_game_last_day";
const DAY_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Loaded {
    pub state: PetState,
    /// A stored snapshot contributed at least the defaults' shape.
    pub restored: bool,
    /// Care-day counters were bumped for a new calendar day.
    pub new_day: bool,
}

/// Saves and restores the pet through a [`KeyValueStore`]. Loading never
/// fails: anything unreadable falls back to a fresh pet.
pub struct Persistence<S> {
    store: S,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    pub fn save(&mut self, pet: &PetState) -> Result<(), StoreError> {
        let data = serde_json::to_string(pet)?;
        self.store.set(STATS_KEY, &data)
    }

    /// Restores the snapshot and runs the once-per-day care counter check.
    pub fn load(&mut self, now: DateTime<Utc>, today: NaiveDate) -> Loaded {
        let (mut state, restored) = self.load_snapshot(now);
        let new_day = self.track_day(&mut state, today);
        if new_day {
            if let Err(e) = self.save(&state) {
                warn!(error = %e, "could not save day rollover");
            }
        }
        Loaded {
            state,
            restored,
            new_day,
        }
    }

    pub fn load_snapshot(&self, now: DateTime<Utc>) -> (PetState, bool) {
        let defaults = PetState::new(now);
        let raw = match self.store.get(STATS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!("no saved pet, starting fresh");
                return (defaults, false);
            }
            Err(e) => {
                warn!(error = %e, "pet snapshot unreadable, starting fresh");
                return (defaults, false);
            }
        };
        match merge_over_defaults(&defaults, &raw) {
            Ok(state) => {
                info!(
                    hunger = state.hunger(),
                    happiness = state.happiness(),
                    energy = state.energy(),
                    care_days = state.total_care_days,
                    "restored pet"
                );
                (state, true)
            }
            Err(e) => {
                warn!(error = %e, "pet snapshot corrupt, starting fresh");
                (defaults, false)
            }
        }
    }

    fn track_day(&mut self, state: &mut PetState, today: NaiveDate) -> bool {
        let last = match self.store.get(LAST_DAY_KEY) {
            Ok(v) => v.and_then(|s| NaiveDate::parse_from_str(s.trim(), DAY_FORMAT).ok()),
            Err(e) => {
                warn!(error = %e, "last-day key unreadable");
                None
            }
        };
        let rolled = match last {
            Some(day) if day == today => return false,
            Some(day) => {
                state.total_care_days = state.total_care_days.saturating_add(1);
                state.daily_streak = state.daily_streak.saturating_add(1);
                info!(
                    %day,
                    %today,
                    care_days = state.total_care_days,
                    streak = state.daily_streak,
                    "new care day"
                );
                true
            }
            None => {
                debug!(%today, "first recorded day");
                false
            }
        };
        let stamp = today.format(DAY_FORMAT).to_string();
        if let Err(e) = self.store.set(LAST_DAY_KEY, &stamp) {
            warn!(error = %e, "could not record last-seen day");
        }
        rolled
    }
}

/// Overlays the stored object onto the defaults field by field. Fields that
/// do not fit the current shape are dropped and keep their default.
pub fn merge_over_defaults(defaults: &PetState, raw: &str) -> Result<PetState, StoreError> {
    let stored: Value = serde_json::from_str(raw)?;
    let Value::Object(stored) = stored else {
        return Ok(defaults.clone());
    };
    let mut merged = match serde_json::to_value(defaults)? {
        Value::Object(m) => m,
        _ => Map::new(),
    };
    for (key, value) in stored {
        if value.is_null() {
            continue;
        }
        let mut trial = merged.clone();
        trial.insert(key.clone(), value);
        if serde_json::from_value::<PetState>(Value::Object(trial.clone())).is_ok() {
            merged = trial;
        } else {
            warn!(field = %key, "ignoring malformed snapshot field");
        }
    }
    let state: PetState = serde_json::from_value(Value::Object(merged))?;
    Ok(state.sanitized())
}
