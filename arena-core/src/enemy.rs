//! Arena levels and the enemy generator.

use crate::dice::{RollRange, Roller};
use crate::fighter::{Attributes, Fighter, BASE_HEALTH};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;
use thiserror::Error;

/// Base value of every enemy attribute per level.
pub const STAT_PER_LEVEL: u32 = 5;

/// Extra enemy health per level.
pub const HEALTH_PER_LEVEL: u32 = 20;

/// Random offset applied to each enemy attribute.
pub const PERTURBATION: RollRange = RollRange::new(-5, 4);

/// Range of the display id given to generated enemies.
pub const ENEMY_ID_RANGE: RollRange = RollRange::new(0, 9999);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LevelError {
    #[error("level must be at least 1")]
    Zero,

    #[error("invalid level: {0}")]
    Invalid(String),
}

/// An arena level. Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Level(NonZeroU32);

impl Level {
    pub const FIRST: Level = Level(NonZeroU32::MIN);

    pub fn new(value: u32) -> Result<Self, LevelError> {
        NonZeroU32::new(value).map(Level).ok_or(LevelError::Zero)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// The following level, saturating at the largest representable one.
    pub fn next(self) -> Level {
        Level(self.0.saturating_add(1))
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::FIRST
    }
}

impl TryFrom<u32> for Level {
    type Error = LevelError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Level::new(value)
    }
}

impl From<Level> for u32 {
    fn from(level: Level) -> Self {
        level.get()
    }
}

impl FromStr for Level {
    type Err = LevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u32 = s
            .trim()
            .parse()
            .map_err(|_| LevelError::Invalid(s.to_string()))?;
        Level::new(value)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Generate the opponent for a level.
///
/// Each attribute is `5 * level` shifted by a roll in `-5..=4` and floored
/// at 1. Health is `100 + 20 * level`. The roller is consulted for the id
/// first, then once per attribute in strength, speed, durability, power,
/// combat order.
pub fn generate_enemy<R: Roller + ?Sized>(level: Level, roller: &mut R) -> Fighter {
    let base = STAT_PER_LEVEL.saturating_mul(level.get());
    let max_health = BASE_HEALTH.saturating_add(HEALTH_PER_LEVEL.saturating_mul(level.get()));
    let id = ENEMY_ID_RANGE.roll(roller).max(0) as u64;

    let mut randomize = |value: u32| -> u32 {
        let shifted = i64::from(value) + PERTURBATION.roll(&mut *roller);
        shifted.clamp(1, i64::from(u32::MAX)) as u32
    };

    let attributes = Attributes {
        strength: randomize(base),
        speed: randomize(base),
        durability: randomize(base),
        power: randomize(base),
        combat: randomize(base),
    };

    let enemy = Fighter::new(id, format!("Enemy Level {level}"), attributes, max_health);
    tracing::debug!(
        level = level.get(),
        id,
        durability = enemy.durability(),
        max_health,
        "generated enemy"
    );
    enemy
}
