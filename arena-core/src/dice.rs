//! Random rolls for the arena.
//!
//! Every random decision in a fight goes through [`Roller`]. Any `rand::Rng`
//! is a roller, and tests can force exact outcomes with
//! [`ScriptedRoller`](crate::testing::ScriptedRoller).

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Source of the random decisions made during combat.
pub trait Roller {
    /// Uniform integer in `low..=high`.
    fn roll_between(&mut self, low: i64, high: i64) -> i64;

    /// `true` with the given probability.
    fn chance(&mut self, probability: f64) -> bool;
}

impl<R: Rng + ?Sized> Roller for R {
    fn roll_between(&mut self, low: i64, high: i64) -> i64 {
        if low >= high {
            return low;
        }
        self.gen_range(low..=high)
    }

    fn chance(&mut self, probability: f64) -> bool {
        self.gen::<f64>() < probability
    }
}

/// An inclusive integer range rolled uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollRange {
    pub low: i64,
    pub high: i64,
}

impl RollRange {
    pub const fn new(low: i64, high: i64) -> Self {
        Self { low, high }
    }

    pub fn roll<R: Roller + ?Sized>(&self, roller: &mut R) -> i64 {
        roller.roll_between(self.low, self.high)
    }

    pub fn contains(&self, value: i64) -> bool {
        (self.low..=self.high).contains(&value)
    }
}

impl fmt::Display for RollRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.low, self.high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_roll_range_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let range = RollRange::new(10, 50);
        let mut seen_low = false;
        let mut seen_high = false;
        for _ in 0..10_000 {
            let value = range.roll(&mut rng);
            assert!(range.contains(value), "{value} outside {range}");
            seen_low |= value == 10;
            seen_high |= value == 50;
        }
        assert!(seen_low && seen_high);
    }

    #[test]
    fn test_degenerate_range() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(rng.roll_between(3, 3), 3);
        assert_eq!(rng.roll_between(5, 2), 5);
    }

    #[test]
    fn test_chance_extremes() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1_000 {
            assert!(!rng.chance(0.0));
            assert!(rng.chance(1.0));
        }
    }

    #[test]
    fn test_roller_through_trait_object() {
        let mut rng = StdRng::seed_from_u64(3);
        let roller: &mut dyn Roller = &mut rng;
        let value = RollRange::new(-5, 4).roll(roller);
        assert!((-5..=4).contains(&value));
    }
}
