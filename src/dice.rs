//! Randomness seam. The game never talks to an RNG directly, so tests can
//! swap in [`ScriptedDice`] and get fixed timer jitter and event rolls.

use crate::rules::MsRange;
use rand::Rng;
use std::collections::VecDeque;

pub trait Dice {
    /// Uniform value in `[lo, hi]`.
    fn between(&mut self, lo: u64, hi: u64) -> u64;

    /// `true` with probability `p` (clamped to `[0, 1]`).
    fn chance(&mut self, p: f64) -> bool;

    fn in_range(&mut self, range: MsRange) -> u64 {
        let (lo, hi) = if range.min_ms <= range.max_ms {
            (range.min_ms, range.max_ms)
        } else {
            (range.max_ms, range.min_ms)
        };
        self.between(lo, hi)
    }
}

/// Adapts any `rand` generator.
pub struct RngDice<R>(pub R);

impl<R: Rng> Dice for RngDice<R> {
    fn between(&mut self, lo: u64, hi: u64) -> u64 {
        if lo >= hi {
            return lo;
        }
        self.0.gen_range(lo..=hi)
    }

    fn chance(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }
}

/// Deterministic dice for tests and replays.
///
/// `between` pops the next scripted fraction (`0.0` = low end, `1.0` = high
/// end) and `chance` pops the next scripted outcome. Once a script runs dry
/// it keeps returning its fallback: the low end and `false`.
#[derive(Clone, Debug, Default)]
pub struct ScriptedDice {
    fractions: VecDeque<f64>,
    rolls: VecDeque<bool>,
}

impl ScriptedDice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fractions(mut self, fractions: impl IntoIterator<Item = f64>) -> Self {
        self.fractions.extend(fractions);
        self
    }

    pub fn with_rolls(mut self, rolls: impl IntoIterator<Item = bool>) -> Self {
        self.rolls.extend(rolls);
        self
    }
}

impl Dice for ScriptedDice {
    fn between(&mut self, lo: u64, hi: u64) -> u64 {
        let f = self.fractions.pop_front().unwrap_or(0.0).clamp(0.0, 1.0);
        let span = hi.saturating_sub(lo) as f64;
        lo + (span * f).round() as u64
    }

    fn chance(&mut self, _p: f64) -> bool {
        self.rolls.pop_front().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn rng_dice_stays_in_bounds() {
        let mut d = RngDice(StdRng::seed_from_u64(7));
        for _ in 0..200 {
            let v = d.in_range(MsRange::new(4_000, 6_000));
            assert!((4_000..=6_000).contains(&v));
        }
        assert_eq!(d.between(9, 9), 9);
        assert!(!d.chance(0.0));
        assert!(d.chance(1.0));
    }

    #[test]
    fn scripted_dice_replays_then_falls_back() {
        let mut d = ScriptedDice::new()
            .with_fractions([1.0, 0.5])
            .with_rolls([true]);
        assert_eq!(d.between(10, 20), 20);
        assert_eq!(d.between(10, 20), 15);
        assert_eq!(d.between(10, 20), 10);
        assert!(d.chance(0.2));
        assert!(!d.chance(0.2));
    }
}
