//! Testing utilities for the arena.
//!
//! This module provides tools for deterministic tests:
//! - `ScriptedRoller` to force exact damage rolls and critical outcomes
//! - `TestHarness` for building fighters and arenas with known stats

use crate::dice::Roller;
use crate::enemy::Level;
use crate::fighter::Fighter;
use crate::pacing::{Arena, Pacing};
use arena_api::Character;
use std::collections::VecDeque;

/// A roller that replays scripted values.
///
/// Integer rolls are clamped into the requested range. Once a queue runs
/// dry, rolls return the low end of the range and chances return `false`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRoller {
    rolls: VecDeque<i64>,
    chances: VecDeque<bool>,
}

impl ScriptedRoller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rolls(mut self, rolls: impl IntoIterator<Item = i64>) -> Self {
        self.rolls.extend(rolls);
        self
    }

    pub fn with_chances(mut self, chances: impl IntoIterator<Item = bool>) -> Self {
        self.chances.extend(chances);
        self
    }

    pub fn push_roll(&mut self, value: i64) {
        self.rolls.push_back(value);
    }

    pub fn push_chance(&mut self, outcome: bool) {
        self.chances.push_back(outcome);
    }

    /// Scripted values not consumed yet, as `(rolls, chances)`.
    pub fn remaining(&self) -> (usize, usize) {
        (self.rolls.len(), self.chances.len())
    }
}

impl Roller for ScriptedRoller {
    fn roll_between(&mut self, low: i64, high: i64) -> i64 {
        match self.rolls.pop_front() {
            Some(value) => value.clamp(low, high.max(low)),
            None => low,
        }
    }

    fn chance(&mut self, _probability: f64) -> bool {
        self.chances.pop_front().unwrap_or(false)
    }
}

/// Builder for deterministic fights.
pub struct TestHarness {
    player: Fighter,
    level: Level,
    roller: ScriptedRoller,
}

impl TestHarness {
    /// A level 1 fight for a 50/50/50/50/50 player with 200 health.
    pub fn new() -> Self {
        Self {
            player: Fighter::from_character(&sample_character("Hero")),
            level: Level::FIRST,
            roller: ScriptedRoller::new(),
        }
    }

    pub fn with_player(mut self, player: Fighter) -> Self {
        self.player = player;
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Make the generated enemy predictable: id 0 and every attribute at
    /// `5 * level + offset`.
    pub fn with_enemy_offset(mut self, offset: i64) -> Self {
        self.roller.push_roll(0);
        for _ in 0..5 {
            self.roller.push_roll(offset);
        }
        self
    }

    /// Queue one resolved blow: its base damage and whether it crits.
    pub fn with_blow(mut self, base: i64, critical: bool) -> Self {
        self.roller.push_roll(base);
        self.roller.push_chance(critical);
        self
    }

    /// An arena that resolves every step on the next tick.
    pub fn build(self) -> Arena<ScriptedRoller> {
        self.build_with_pacing(Pacing::instant())
    }

    pub fn build_with_pacing(self, pacing: Pacing) -> Arena<ScriptedRoller> {
        Arena::with_roller(self.player, self.level, self.roller).with_pacing(pacing)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// A character with every stat at 50.
pub fn sample_character(name: &str) -> Character {
    Character {
        id: 1,
        name: name.to_string(),
        strength: 50,
        speed: 50,
        durability: 50,
        power: 50,
        combat: 50,
        user: Some(1),
        image: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::Phase;
    use crate::fighter::Attributes;
    use crate::damage::{AttackKind, Side};
    use std::time::Instant;

    #[test]
    fn test_scripted_roller_clamps_and_defaults() {
        let mut roller = ScriptedRoller::new().with_rolls([100, -100]).with_chances([true]);
        assert_eq!(roller.roll_between(10, 50), 50);
        assert_eq!(roller.roll_between(10, 50), 10);
        assert_eq!(roller.roll_between(-5, 4), -5);
        assert!(roller.chance(0.0));
        assert!(!roller.chance(1.0));
        assert_eq!(roller.remaining(), (0, 0));
    }

    #[test]
    fn test_harness_builds_predictable_enemy() {
        let arena = TestHarness::new()
            .with_level(Level::new(4).unwrap())
            .with_enemy_offset(2)
            .build();
        let enemy = arena.session().enemy();
        assert_eq!(enemy.attributes, Attributes::uniform(22));
        assert_eq!(enemy.max_health(), 180);
        assert_eq!(arena.session().player().max_health(), 200);
    }

    #[test]
    fn test_harness_blows_are_consumed_in_order() {
        let mut arena = TestHarness::new()
            .with_enemy_offset(0)
            .with_blow(30, false)
            .with_blow(20, true)
            .build();
        let now = Instant::now();
        arena.start().unwrap();
        arena.attack(AttackKind::Normal, now).unwrap();
        let hits = arena.tick(now);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].damage, 29);
        assert_eq!(hits[1].attacker, Side::Enemy);
        assert!(hits[1].is_critical);
        // 20 crit -> 30, quarter off for durability 50
        assert_eq!(hits[1].damage, 22);
        assert_eq!(arena.phase(), Phase::PlayerTurn);
    }
}
