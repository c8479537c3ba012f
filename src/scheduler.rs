//! Named timers on a simulated timeline.
//!
//! Each [`TimerKind`] has at most one pending deadline: scheduling a kind
//! that is already pending replaces the old deadline instead of stacking a
//! second one. The owner drains due timers with [`Scheduler::pop_due`].

use crate::rules::later;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Declaration order is the tie-break when two timers share a deadline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimerKind {
    EatEnd,
    SleepEnd,
    PetEnd,
    SparkleEnd,
    RunFrame,
    Decay,
    MoodSwing,
    AutoSave,
}

impl TimerKind {
    /// Periodic timers are rescheduled by their handler every time they fire.
    pub fn is_periodic(self) -> bool {
        matches!(
            self,
            TimerKind::Decay | TimerKind::AutoSave | TimerKind::RunFrame
        )
    }
}

#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    pending: BTreeMap<TimerKind, DateTime<Utc>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms `kind` for `at`, returning the deadline it replaced.
    pub fn schedule(&mut self, kind: TimerKind, at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.pending.insert(kind, at)
    }

    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        self.pending.remove(&kind).is_some()
    }

    pub fn deadline(&self, kind: TimerKind) -> Option<DateTime<Utc>> {
        self.pending.get(&kind).copied()
    }

    pub fn is_pending(&self, kind: TimerKind) -> bool {
        self.pending.contains_key(&kind)
    }

    /// Earliest deadline across all pending timers.
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.pending.values().min().copied()
    }

    /// Removes and returns the earliest timer due at or before `now`.
    pub fn pop_due(&mut self, now: DateTime<Utc>) -> Option<(TimerKind, DateTime<Utc>)> {
        let (kind, at) = self
            .pending
            .iter()
            .filter(|(_, at)| **at <= now)
            .min_by_key(|(kind, at)| (**at, **kind))
            .map(|(k, at)| (*k, *at))?;
        self.pending.remove(&kind);
        Some((kind, at))
    }

    /// Pushes every overdue periodic timer to one period past `now`,
    /// dropping the occurrences that were missed.
    pub fn skip_missed(&mut self, now: DateTime<Utc>, period_of: impl Fn(TimerKind) -> chrono::Duration) {
        for (kind, at) in self.pending.iter_mut() {
            if kind.is_periodic() && *at <= now {
                *at = later(now, period_of(*kind));
            }
        }
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::ms;
    use chrono::TimeZone;

    fn t(ms_: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms_).unwrap()
    }

    #[test]
    fn rescheduling_replaces_instead_of_stacking() {
        let mut s = Scheduler::new();
        assert_eq!(s.schedule(TimerKind::EatEnd, t(5_000)), None);
        assert_eq!(s.schedule(TimerKind::EatEnd, t(9_000)), Some(t(5_000)));
        assert_eq!(s.len(), 1);
        assert_eq!(s.pop_due(t(6_000)), None);
        assert_eq!(s.pop_due(t(9_000)), Some((TimerKind::EatEnd, t(9_000))));
        assert!(s.is_empty());
    }

    #[test]
    fn pops_in_deadline_order_with_kind_tiebreak() {
        let mut s = Scheduler::new();
        s.schedule(TimerKind::Decay, t(15_000));
        s.schedule(TimerKind::PetEnd, t(15_000));
        s.schedule(TimerKind::AutoSave, t(1_000));
        let order: Vec<_> = std::iter::from_fn(|| s.pop_due(t(20_000)))
            .map(|(k, _)| k)
            .collect();
        assert_eq!(
            order,
            vec![TimerKind::AutoSave, TimerKind::PetEnd, TimerKind::Decay]
        );
    }

    #[test]
    fn cancel_and_clear() {
        let mut s = Scheduler::new();
        s.schedule(TimerKind::SleepEnd, t(1));
        s.schedule(TimerKind::Decay, t(2));
        assert!(s.cancel(TimerKind::SleepEnd));
        assert!(!s.cancel(TimerKind::SleepEnd));
        assert_eq!(s.next_deadline(), Some(t(2)));
        s.clear();
        assert_eq!(s.pop_due(t(100)), None);
    }

    #[test]
    fn skip_missed_only_touches_overdue_periodic_timers() {
        let mut s = Scheduler::new();
        s.schedule(TimerKind::Decay, t(15_000));
        s.schedule(TimerKind::SleepEnd, t(20_000));
        s.schedule(TimerKind::AutoSave, t(900_000));
        s.skip_missed(t(600_000), |_| ms(15_000));
        assert_eq!(s.deadline(TimerKind::Decay), Some(t(615_000)));
        assert_eq!(s.deadline(TimerKind::SleepEnd), Some(t(20_000)));
        assert_eq!(s.deadline(TimerKind::AutoSave), Some(t(900_000)));
    }
}
