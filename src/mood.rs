use crate::activity::Activity;
use crate::model::PetState;
use crate::rules::{ms, Rules};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sprite the cat is shown with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodId {
    Eating,
    /// Curled up and purring.
    Resting,
    Running,
    VeryHappy,
    SittingHappy,
    MildHappy,
    Sad,
}

impl MoodId {
    pub fn label(self) -> &'static str {
        match self {
            MoodId::Eating => "eating",
            MoodId::Resting => "purring",
            MoodId::Running => "chasing",
            MoodId::VeryHappy => "very happy",
            MoodId::SittingHappy => "content",
            MoodId::MildHappy => "okay",
            MoodId::Sad => "sad",
        }
    }
}

/// First match wins. Active animations beat stat-derived moods, which beat
/// the idle default.
pub fn resolve_mood(
    pet: &PetState,
    activity: &Activity,
    now: DateTime<Utc>,
    rules: &Rules,
) -> MoodId {
    let s = pet.stats;

    if activity.is_eating {
        return MoodId::Eating;
    }
    if activity.is_sleeping {
        return MoodId::Resting;
    }
    if activity.is_playing && activity.is_dragging {
        return MoodId::Running;
    }
    if activity.is_playing {
        return MoodId::VeryHappy;
    }
    if activity.is_petting {
        return MoodId::SittingHappy;
    }
    // tired
    if s.energy < 20 {
        return MoodId::MildHappy;
    }
    if s.happiness < 30 || s.hunger > 80 {
        return MoodId::Sad;
    }
    if s.happiness > 90 && s.energy > 70 {
        return MoodId::VeryHappy;
    }
    if s.happiness > 80 && s.hunger < 50 {
        return MoodId::SittingHappy;
    }
    if (60..=80).contains(&s.happiness) && now - pet.last_pet_time < ms(rules.purr_window_ms) {
        return MoodId::Resting;
    }
    if (30..60).contains(&s.happiness) && s.hunger < 70 && s.energy > 30 {
        return MoodId::MildHappy;
    }
    MoodId::MildHappy
}
