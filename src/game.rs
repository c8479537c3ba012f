//! The coordinator. `PetGame` is the only owner of the pet: interactions and
//! timers go through it, every change replaces the committed `PetState`
//! wholesale, and every committed change is written to storage.

use crate::activity::{Activity, Facing, ParticleBurst, PressKind};
use crate::dice::Dice;
use crate::model::{PetState, ToyChoice};
use crate::mood::{resolve_mood, MoodId};
use crate::rules::{after, ms, Rules};
use crate::scheduler::{Scheduler, TimerKind};
use crate::sim::{self, Interaction, Outcome};
use crate::stats::Stats;
use crate::storage::Persistence;
use crate::store::KeyValueStore;
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Utc};
use tracing::{debug, info, warn};

/// Everything a renderer needs for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PetView {
    pub mood: MoodId,
    pub stats: Stats,
    pub activity: Activity,
    pub facing: Facing,
    pub run_frame: u8,
    pub particles: u32,
    pub total_care_days: u32,
    pub daily_streak: u32,
    pub can_sleep: bool,
}

pub struct PetGame<S: KeyValueStore> {
    rules: Rules,
    pet: PetState,
    activity: Activity,
    scheduler: Scheduler,
    dice: Box<dyn Dice>,
    persistence: Persistence<S>,
    last_advance: DateTime<Utc>,
    running: bool,
}

impl<S: KeyValueStore> PetGame<S> {
    /// Loads (or creates) the pet and arms the background timers.
    pub fn start(
        store: S,
        dice: Box<dyn Dice>,
        rules: Rules,
        now: DateTime<Utc>,
        today: NaiveDate,
    ) -> Self {
        let mut persistence = Persistence::new(store);
        let loaded = persistence.load(now, today);
        info!(
            restored = loaded.restored,
            new_day = loaded.new_day,
            streak = loaded.state.daily_streak,
            "session started"
        );

        let mut game = Self {
            rules,
            pet: loaded.state,
            activity: Activity::default(),
            scheduler: Scheduler::new(),
            dice,
            persistence,
            last_advance: now,
            running: true,
        };
        game.scheduler
            .schedule(TimerKind::Decay, after(now, game.rules.decay_period_ms));
        game.scheduler
            .schedule(TimerKind::AutoSave, after(now, game.rules.autosave_period_ms));
        game.arm_mood_swing(now);
        game.commit(now, false);
        game
    }

    pub fn pet(&self) -> &PetState {
        &self.pet
    }

    pub fn stats(&self) -> Stats {
        self.pet.stats
    }

    pub fn activity(&self) -> &Activity {
        &self.activity
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn mood(&self, now: DateTime<Utc>) -> MoodId {
        resolve_mood(&self.pet, &self.activity, now, &self.rules)
    }

    /// Sleep is offered only to a tired cat. Not enforced by `apply`.
    pub fn can_sleep(&self) -> bool {
        !self.activity.is_sleeping && self.pet.energy() <= self.rules.sleep_allowed_max_energy
    }

    pub fn view(&self, now: DateTime<Utc>) -> PetView {
        PetView {
            mood: self.mood(now),
            stats: self.pet.stats,
            activity: self.activity,
            facing: self.activity.facing,
            run_frame: self.activity.run_frame,
            particles: self.activity.burst.map_or(0, |b| b.visible(now)),
            total_care_days: self.pet.total_care_days,
            daily_streak: self.pet.daily_streak,
            can_sleep: self.can_sleep(),
        }
    }

    /// Runs one interaction at `now`. Timers due by `now` fire first so the
    /// handler sees the latest committed state.
    pub fn apply(&mut self, interaction: Interaction, now: DateTime<Utc>) -> Outcome {
        if !self.running {
            return Outcome::Ignored;
        }
        self.advance(now);

        let outcome = match interaction {
            Interaction::Feed => self.feed(now),
            Interaction::StartPlay(toy) => {
                if self.activity.is_playing {
                    Outcome::Ignored
                } else {
                    let mut next = self.pet.clone();
                    next.last_toy = ToyChoice::from(toy);
                    self.pet = next;
                    self.activity.is_playing = true;
                    self.commit(now, true);
                    Outcome::Applied
                }
            }
            Interaction::Drag(facing) => {
                if !self.activity.is_playing {
                    Outcome::Ignored
                } else {
                    self.activity.is_dragging = true;
                    self.activity.facing = facing;
                    if !self.scheduler.is_pending(TimerKind::RunFrame) {
                        self.scheduler
                            .schedule(TimerKind::RunFrame, after(now, self.rules.run_frame_ms));
                    }
                    self.commit(now, false);
                    Outcome::Applied
                }
            }
            Interaction::Drop => {
                if !self.activity.is_dragging {
                    Outcome::Ignored
                } else {
                    self.stop_dragging();
                    self.commit(now, false);
                    Outcome::Applied
                }
            }
            Interaction::StopPlay => self.stop_play(now),
            Interaction::Pet(press) => self.pet_cat(press, now),
            Interaction::Sleep => self.sleep(now),
        };

        match outcome {
            Outcome::Applied => debug!(
                ?interaction,
                hunger = self.pet.hunger(),
                happiness = self.pet.happiness(),
                energy = self.pet.energy(),
                "interaction applied"
            ),
            Outcome::Ignored => debug!(?interaction, "interaction ignored"),
        }
        outcome
    }

    /// Fires every timer due by `now`. Returns how many fired.
    pub fn advance(&mut self, now: DateTime<Utc>) -> usize {
        if !self.running {
            return 0;
        }
        if now - self.last_advance > ms(self.rules.suspend_threshold_ms) {
            info!(
                gap_secs = (now - self.last_advance).num_seconds(),
                "session was suspended, dropping missed ticks"
            );
            let rules = &self.rules;
            self.scheduler.skip_missed(now, |kind| period_of(rules, kind));
            // a missed swing is dropped, not replayed
            if self
                .scheduler
                .deadline(TimerKind::MoodSwing)
                .is_some_and(|at| at <= now)
            {
                self.arm_mood_swing(now);
            }
        }

        let mut fired = 0;
        while let Some((kind, at)) = self.scheduler.pop_due(now) {
            self.fire(kind, at);
            fired += 1;
        }
        if now > self.last_advance {
            self.last_advance = now;
        }
        // moods can also change with time alone, e.g. the purr window closing
        self.commit(now, false);
        fired
    }

    /// Writes the snapshot now. Failures are logged and reported, never
    /// raised.
    pub fn save_now(&mut self) -> bool {
        match self.persistence.save(&self.pet) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "could not save pet");
                false
            }
        }
    }

    /// Final save, then releases every pending timer.
    pub fn shutdown(&mut self, now: DateTime<Utc>) {
        if !self.running {
            return;
        }
        self.advance(now);
        self.save_now();
        let released = self.scheduler.len();
        self.scheduler.clear();
        self.running = false;
        info!(released, "session ended");
    }

    fn feed(&mut self, now: DateTime<Utc>) -> Outcome {
        if self.activity.is_eating {
            return Outcome::Ignored;
        }
        self.pet = sim::feed(&self.pet, now, &self.rules);
        self.activity.is_eating = true;
        let eat_for = self.dice.in_range(self.rules.eat_duration);
        self.scheduler.schedule(TimerKind::EatEnd, after(now, eat_for));
        self.commit(now, true);
        Outcome::Applied
    }

    fn stop_play(&mut self, now: DateTime<Utc>) -> Outcome {
        if !self.activity.is_playing {
            return Outcome::Ignored;
        }
        match self.pet.last_toy.toy() {
            Some(toy) => self.pet = sim::finish_play(&self.pet, toy, now, &self.rules),
            None => warn!("play stopped without a toy, no reward"),
        }
        self.activity.is_playing = false;
        self.stop_dragging();
        self.commit(now, true);
        Outcome::Applied
    }

    fn pet_cat(&mut self, press: PressKind, now: DateTime<Utc>) -> Outcome {
        let burst = match press {
            PressKind::Tap => self.rules.pet_tap,
            PressKind::LongPress => self.rules.pet_long,
        };
        self.pet = sim::pet_cat(&self.pet, press, now, &self.rules);
        self.activity.is_petting = true;
        self.activity.burst = Some(ParticleBurst {
            started_at: now,
            count: burst.particles,
            stagger_ms: burst.stagger_ms,
        });
        self.scheduler
            .schedule(TimerKind::PetEnd, after(now, self.rules.petting_ms));
        self.scheduler
            .schedule(TimerKind::SparkleEnd, after(now, burst.clear_after_ms));
        self.commit(now, true);
        Outcome::Applied
    }

    fn sleep(&mut self, now: DateTime<Utc>) -> Outcome {
        if self.activity.is_sleeping {
            return Outcome::Ignored;
        }
        self.pet = sim::sleep(&self.pet, now, &self.rules);
        self.activity.is_sleeping = true;
        let sleep_for = self.dice.in_range(self.rules.sleep_duration);
        self.scheduler
            .schedule(TimerKind::SleepEnd, after(now, sleep_for));
        self.commit(now, true);
        Outcome::Applied
    }

    fn stop_dragging(&mut self) {
        self.activity.is_dragging = false;
        self.activity.run_frame = 0;
        self.scheduler.cancel(TimerKind::RunFrame);
    }

    fn fire(&mut self, kind: TimerKind, at: DateTime<Utc>) {
        match kind {
            TimerKind::EatEnd => {
                self.activity.is_eating = false;
                self.commit(at, false);
            }
            TimerKind::SleepEnd => {
                self.activity.is_sleeping = false;
                self.commit(at, false);
            }
            TimerKind::PetEnd => {
                self.activity.is_petting = false;
                self.commit(at, false);
            }
            TimerKind::SparkleEnd => {
                self.activity.burst = None;
            }
            TimerKind::RunFrame => {
                if self.activity.is_running() {
                    self.activity.flip_run_frame();
                    self.scheduler
                        .schedule(TimerKind::RunFrame, after(at, self.rules.run_frame_ms));
                }
            }
            TimerKind::Decay => {
                self.pet = sim::decay_tick(&self.pet, at, &self.rules);
                self.scheduler
                    .schedule(TimerKind::Decay, after(at, self.rules.decay_period_ms));
                self.commit(at, true);
            }
            TimerKind::MoodSwing => {
                if self.dice.chance(self.rules.mood_swing_chance) {
                    let upward = self.dice.chance(0.5);
                    self.pet = sim::mood_swing(&self.pet, upward, &self.rules);
                    info!(upward, happiness = self.pet.happiness(), "mood swing");
                    self.commit(at, true);
                }
                self.arm_mood_swing(at);
            }
            TimerKind::AutoSave => {
                self.save_now();
                self.scheduler
                    .schedule(TimerKind::AutoSave, after(at, self.rules.autosave_period_ms));
            }
        }
    }

    fn arm_mood_swing(&mut self, from: DateTime<Utc>) {
        let wait = self.dice.in_range(self.rules.mood_swing_cadence);
        self.scheduler.schedule(TimerKind::MoodSwing, after(from, wait));
    }

    /// Records the mood if it changed and saves when the pet changed.
    fn commit(&mut self, at: DateTime<Utc>, pet_changed: bool) {
        let mood = resolve_mood(&self.pet, &self.activity, at, &self.rules);
        let mood_changed = self.pet.current_mood_entry().map(|e| e.mood) != Some(mood);
        if mood_changed {
            debug!(mood = mood.label(), "mood changed");
            let mut next = self.pet.clone();
            next.record_mood(at, mood);
            self.pet = next;
        }
        if pet_changed || mood_changed {
            self.save_now();
        }
    }
}

fn period_of(rules: &Rules, kind: TimerKind) -> ChronoDuration {
    match kind {
        TimerKind::Decay => ms(rules.decay_period_ms),
        TimerKind::AutoSave => ms(rules.autosave_period_ms),
        TimerKind::RunFrame => ms(rules.run_frame_ms),
        _ => ChronoDuration::zero(),
    }
}
