//! Stat transitions. Each function takes the committed state and returns the
//! next one; `PetGame` owns the timers and transient flags around them.

use crate::activity::{Facing, PressKind};
use crate::model::{PetState, Toy, ToyChoice};
use crate::rules::{ms, Rules};
use crate::stats::StatDelta;
use chrono::{DateTime, Duration as ChronoDuration, Utc};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interaction {
    Feed,
    /// Pick up a toy. Rewards are paid out on [`Interaction::StopPlay`].
    StartPlay(Toy),
    Drag(Facing),
    Drop,
    StopPlay,
    Pet(PressKind),
    Sleep,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// A no-op, e.g. feeding a cat that is already eating.
    Ignored,
}

/// Happiness bonus for interacting again within the combo window, measured
/// against the `last_interaction_time` before this interaction lands.
pub fn combo_bonus(pet: &PetState, now: DateTime<Utc>, rules: &Rules) -> i32 {
    let gap = now - pet.last_interaction_time;
    if gap >= ChronoDuration::zero() && gap < ms(rules.combo_window_ms) {
        rules.combo_bonus
    } else {
        0
    }
}

fn with_combo(pet: &PetState, delta: StatDelta, now: DateTime<Utc>, rules: &Rules) -> PetState {
    let combo = combo_bonus(pet, now, rules);
    let mut next = pet.adjusted(delta);
    if combo > 0 {
        next = next.adjusted(StatDelta::happiness(combo));
    }
    next.last_interaction_time = now;
    next
}

pub fn feed(pet: &PetState, now: DateTime<Utc>, rules: &Rules) -> PetState {
    let mut next = with_combo(pet, rules.feed, now, rules);
    next.last_fed_time = now;
    next
}

/// Pays out a finished play session with `toy`.
pub fn finish_play(pet: &PetState, toy: Toy, now: DateTime<Utc>, rules: &Rules) -> PetState {
    let mut next = with_combo(pet, rules.play_delta(toy), now, rules);
    next.last_play_time = now;
    next.last_toy = ToyChoice::Nothing;
    next
}

pub fn pet_cat(pet: &PetState, press: PressKind, now: DateTime<Utc>, rules: &Rules) -> PetState {
    let burst = match press {
        PressKind::Tap => rules.pet_tap,
        PressKind::LongPress => rules.pet_long,
    };
    let mut next = with_combo(pet, StatDelta::happiness(burst.bonus), now, rules);
    next.last_pet_time = now;
    next
}

pub fn sleep(pet: &PetState, now: DateTime<Utc>, rules: &Rules) -> PetState {
    let mut next = with_combo(pet, rules.sleep, now, rules);
    next.last_sleep_time = now;
    next
}

/// Passive neglect applied on every decay period.
pub fn decay_tick(pet: &PetState, now: DateTime<Utc>, rules: &Rules) -> PetState {
    let mut next = pet.adjusted(rules.decay);
    next.last_interaction_time = now;
    next
}

pub fn mood_swing(pet: &PetState, upward: bool, rules: &Rules) -> PetState {
    let amount = if upward {
        rules.mood_swing_amount
    } else {
        -rules.mood_swing_amount
    };
    pet.adjusted(StatDelta::happiness(amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::Stats;
    use chrono::TimeZone;

    fn t(ms_: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms_).unwrap()
    }

    fn idle_pet() -> PetState {
        // last interaction long ago so no combo applies
        PetState::new(t(0))
    }

    #[test]
    fn feed_reduces_hunger_and_stamps_times() {
        let r = Rules::default();
        let p = feed(&idle_pet(), t(60_000), &r);
        assert_eq!((p.hunger(), p.happiness()), (5, 65));
        assert_eq!(p.last_fed_time, t(60_000));
        assert_eq!(p.last_interaction_time, t(60_000));
    }

    #[test]
    fn combo_needs_gap_under_window() {
        let r = Rules::default();
        let p = idle_pet();
        assert_eq!(combo_bonus(&p, t(9_999), &r), 10);
        assert_eq!(combo_bonus(&p, t(10_000), &r), 0);
        assert_eq!(combo_bonus(&p, t(-1), &r), 0);
    }

    #[test]
    fn second_feed_within_window_gets_combo() {
        let r = Rules::default();
        let first = feed(&idle_pet(), t(60_000), &r);
        let second = feed(&first, t(65_000), &r);
        assert_eq!(second.happiness(), first.happiness() + 5 + 10);
        let late = feed(&first, t(70_000), &r);
        assert_eq!(late.happiness(), first.happiness() + 5);
    }

    #[test]
    fn play_deltas_per_toy() {
        let r = Rules::default();
        let ball = finish_play(&idle_pet(), Toy::Ball, t(60_000), &r);
        assert_eq!(ball.stats, Stats::new(48, 85, 58));
        assert_eq!(ball.last_toy, ToyChoice::Nothing);
        let mouse = finish_play(&idle_pet(), Toy::Mouse, t(60_000), &r);
        assert_eq!(mouse.stats, Stats::new(46, 90, 62));
        assert_eq!(mouse.last_play_time, t(60_000));
    }

    #[test]
    fn pet_tap_and_long_press() {
        let r = Rules::default();
        let tap = pet_cat(&idle_pet(), PressKind::Tap, t(60_000), &r);
        assert_eq!(tap.happiness(), 75);
        let long = pet_cat(&idle_pet(), PressKind::LongPress, t(60_000), &r);
        assert_eq!(long.happiness(), 85);
        assert_eq!(long.last_pet_time, t(60_000));
    }

    #[test]
    fn sleep_restores_energy_saturating() {
        let r = Rules::default();
        let p = sleep(&idle_pet(), t(60_000), &r);
        assert_eq!(p.energy(), 100);
        assert_eq!(p.last_sleep_time, t(60_000));
    }

    #[test]
    fn decay_moves_all_three_stats() {
        let r = Rules::default();
        let p = decay_tick(&idle_pet(), t(15_000), &r);
        assert_eq!(p.stats, Stats::new(42, 59, 68));
        assert_eq!(p.last_interaction_time, t(15_000));
    }

    #[test]
    fn mood_swing_both_directions() {
        let r = Rules::default();
        assert_eq!(mood_swing(&idle_pet(), true, &r).happiness(), 70);
        assert_eq!(mood_swing(&idle_pet(), false, &r).happiness(), 50);
    }
}
