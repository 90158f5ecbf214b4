//! Combat participants.
//!
//! A [`Fighter`] is the in-fight view of a character: the five base
//! attributes plus current and maximum health. Health is only changed
//! through [`Fighter::take_damage`] and [`Fighter::restore`], which keep it
//! within `0..=max_health`.

use arena_api::Character;
use serde::{Deserialize, Serialize};

/// Health every fighter starts from before durability is applied.
pub const BASE_HEALTH: u32 = 100;

/// Extra maximum health per point of durability for player characters.
pub const HEALTH_PER_DURABILITY: u32 = 2;

/// The five base attributes shared by characters and enemies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Attributes {
    pub strength: u32,
    pub speed: u32,
    pub durability: u32,
    pub power: u32,
    pub combat: u32,
}

impl Attributes {
    /// Every attribute set to the same value.
    pub const fn uniform(value: u32) -> Self {
        Self {
            strength: value,
            speed: value,
            durability: value,
            power: value,
            combat: value,
        }
    }

    /// Attributes with their display labels, in the usual order.
    pub fn labeled(&self) -> [(&'static str, u32); 5] {
        [
            ("Strength", self.strength),
            ("Speed", self.speed),
            ("Durability", self.durability),
            ("Power", self.power),
            ("Combat", self.combat),
        ]
    }
}

impl From<&Character> for Attributes {
    fn from(character: &Character) -> Self {
        Self {
            strength: character.strength,
            speed: character.speed,
            durability: character.durability,
            power: character.power,
            combat: character.combat,
        }
    }
}

/// A fighter in the arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fighter {
    pub id: u64,
    pub name: String,
    pub attributes: Attributes,
    pub image: Option<String>,
    health: u32,
    max_health: u32,
}

impl Fighter {
    /// Create a fighter at full health.
    pub fn new(id: u64, name: impl Into<String>, attributes: Attributes, max_health: u32) -> Self {
        Self {
            id,
            name: name.into(),
            attributes,
            image: None,
            health: max_health,
            max_health,
        }
    }

    /// Build the player's fighter from a persisted character.
    ///
    /// Maximum health is `100 + durability * 2`.
    pub fn from_character(character: &Character) -> Self {
        let max_health = BASE_HEALTH
            .saturating_add(character.durability.saturating_mul(HEALTH_PER_DURABILITY));
        Self {
            image: character.image.clone(),
            ..Self::new(
                character.id,
                character.name.clone(),
                Attributes::from(character),
                max_health,
            )
        }
    }

    /// Set the current health, clamped to the maximum.
    pub fn with_health(mut self, health: u32) -> Self {
        self.health = health.min(self.max_health);
        self
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn max_health(&self) -> u32 {
        self.max_health
    }

    pub fn durability(&self) -> u32 {
        self.attributes.durability
    }

    pub fn is_defeated(&self) -> bool {
        self.health == 0
    }

    /// Subtract damage, flooring at zero. Returns the remaining health.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        self.health = self.health.saturating_sub(amount);
        self.health
    }

    /// Back to full health.
    pub fn restore(&mut self) {
        self.health = self.max_health;
    }

    /// Current health as a fraction of maximum, in `0.0..=1.0`.
    pub fn health_ratio(&self) -> f64 {
        if self.max_health == 0 {
            return 0.0;
        }
        f64::from(self.health) / f64::from(self.max_health)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn character(durability: u32) -> Character {
        Character {
            id: 12,
            name: "Nyra".to_string(),
            strength: 40,
            speed: 60,
            durability,
            power: 30,
            combat: 70,
            user: Some(1),
            image: Some("/uploads/nyra.png".to_string()),
        }
    }

    #[test]
    fn test_from_character_max_health() {
        let fighter = Fighter::from_character(&character(35));
        assert_eq!(fighter.max_health(), 170);
        assert_eq!(fighter.health(), 170);
        assert_eq!(fighter.attributes.speed, 60);
        assert_eq!(fighter.image.as_deref(), Some("/uploads/nyra.png"));

        assert_eq!(Fighter::from_character(&character(0)).max_health(), 100);
    }

    #[test]
    fn test_take_damage_floors_at_zero() {
        let mut fighter = Fighter::new(1, "Dummy", Attributes::uniform(5), 30);
        assert_eq!(fighter.take_damage(12), 18);
        assert!(!fighter.is_defeated());
        assert_eq!(fighter.take_damage(500), 0);
        assert!(fighter.is_defeated());
    }

    #[test]
    fn test_restore_and_ratio() {
        let mut fighter = Fighter::new(1, "Dummy", Attributes::default(), 200);
        fighter.take_damage(50);
        assert!((fighter.health_ratio() - 0.75).abs() < f64::EPSILON);
        fighter.restore();
        assert_eq!(fighter.health(), 200);
    }

    #[test]
    fn test_with_health_clamps() {
        let fighter = Fighter::new(1, "Dummy", Attributes::default(), 50).with_health(80);
        assert_eq!(fighter.health(), 50);
        let fighter = fighter.with_health(0);
        assert!(fighter.is_defeated());
    }

    #[test]
    fn test_zero_max_health_ratio() {
        let fighter = Fighter::new(1, "Empty", Attributes::default(), 0);
        assert_eq!(fighter.health_ratio(), 0.0);
    }
}
