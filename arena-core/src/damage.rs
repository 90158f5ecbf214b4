//! Damage resolution for a single blow.
//!
//! The order is fixed: roll base damage, roll for a critical, apply the
//! critical multiplier, apply the special bonus (player attacks only),
//! apply the defender's reduction, then floor at 1. Each multiplication
//! floors its result before the next step.

use crate::dice::{RollRange, Roller};
use serde::{Deserialize, Serialize};

/// Base damage of any attack before modifiers.
pub const BASE_DAMAGE: RollRange = RollRange::new(10, 50);

pub const CRITICAL_CHANCE: f64 = 0.15;
pub const CRITICAL_MULTIPLIER: f64 = 1.5;
pub const SPECIAL_MULTIPLIER: f64 = 1.2;

/// Durability needed for each point of fractional reduction.
pub const DURABILITY_PER_REDUCTION: f64 = 200.0;
pub const MAX_DEFENSE_REDUCTION: f64 = 0.5;

/// Every landed blow deals at least this much.
pub const MIN_DAMAGE: u32 = 1;

/// Which fighter acted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AttackKind {
    #[default]
    Normal,
    Special,
}

/// The outcome of one resolved blow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageRoll {
    pub damage: u32,
    pub is_critical: bool,
}

/// Fraction of incoming damage absorbed by a defender, in `0.0..=0.5`.
pub fn defense_reduction(durability: u32) -> f64 {
    (f64::from(durability) / DURABILITY_PER_REDUCTION).min(MAX_DEFENSE_REDUCTION)
}

/// Apply the multipliers and mitigation to an already rolled base damage.
///
/// A special request from the enemy side is treated as a normal attack.
pub fn compute_damage(
    base: u32,
    is_critical: bool,
    attacker: Side,
    kind: AttackKind,
    defender_durability: u32,
) -> u32 {
    let mut damage = f64::from(base);
    if is_critical {
        damage = (damage * CRITICAL_MULTIPLIER).floor();
    }
    if attacker == Side::Player && kind == AttackKind::Special {
        damage = (damage * SPECIAL_MULTIPLIER).floor();
    }
    let mitigated = (damage * (1.0 - defense_reduction(defender_durability))).floor();
    (mitigated as u32).max(MIN_DAMAGE)
}

/// Roll and resolve one blow against a defender.
pub fn resolve_damage<R: Roller + ?Sized>(
    attacker: Side,
    defender_durability: u32,
    kind: AttackKind,
    roller: &mut R,
) -> DamageRoll {
    let base = BASE_DAMAGE.roll(roller).clamp(BASE_DAMAGE.low, BASE_DAMAGE.high) as u32;
    let is_critical = roller.chance(CRITICAL_CHANCE);
    let damage = compute_damage(base, is_critical, attacker, kind, defender_durability);

    tracing::debug!(
        ?attacker,
        ?kind,
        base,
        is_critical,
        defender_durability,
        damage,
        "resolved damage"
    );

    DamageRoll {
        damage,
        is_critical,
    }
}
