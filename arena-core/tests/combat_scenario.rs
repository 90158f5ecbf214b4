//! End-to-end fights with forced rolls.

use arena_core::combat::{CombatError, Phase};
use arena_core::testing::{sample_character, TestHarness};
use arena_core::{AttackKind, Fighter, Level, Side};
use std::time::{Duration, Instant};

// =============================================================================
// Level 1 scenario
// =============================================================================

#[test]
fn test_level_one_opening_exchange() {
    let mut arena = TestHarness::new()
        .with_enemy_offset(0)
        .with_blow(30, false)
        .with_blow(20, false)
        .build_with_pacing(Default::default());
    let t0 = Instant::now();

    let enemy = arena.session().enemy();
    assert_eq!(enemy.max_health(), 120);
    assert_eq!(enemy.attributes.durability, 5);
    assert_eq!(enemy.name, "Enemy Level 1");

    arena.start().unwrap();
    arena.attack(AttackKind::Normal, t0).unwrap();

    let hits = arena.tick(t0 + Duration::from_millis(300));
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].damage, 29);
    assert_eq!(arena.session().enemy().health(), 91);

    let hits = arena.tick(t0 + Duration::from_millis(1300));
    assert_eq!(hits.len(), 1);
    assert_eq!(arena.session().player().health(), 185);

    let messages: Vec<_> = arena
        .session()
        .logs()
        .iter()
        .map(|log| log.message.as_str())
        .collect();
    assert_eq!(
        messages,
        [
            "A wild Enemy Level 1 appears!",
            "The fight begins!",
            "Hero attacks and deals 29 damage!",
            "Enemy Level 1 counter-attacks and deals 15 damage!",
        ]
    );
    assert_eq!(arena.phase(), Phase::PlayerTurn);
}

// =============================================================================
// Turn sequencing
// =============================================================================

#[test]
fn test_non_lethal_attack_gets_exactly_one_counter() {
    let mut arena = TestHarness::new()
        .with_enemy_offset(0)
        .with_blow(10, false)
        .with_blow(10, false)
        .build();
    let now = Instant::now();
    arena.start().unwrap();
    let before = arena.session().logs().len();

    arena.attack(AttackKind::Special, now).unwrap();
    arena.tick(now);

    let logs = &arena.session().logs()[before..];
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].side, Side::Player);
    assert_eq!(logs[1].side, Side::Enemy);
    assert!(arena.session().is_player_turn());
    assert_eq!(arena.session().winner(), None);
}

#[test]
fn test_lethal_attack_skips_counter() {
    let player = Fighter::from_character(&sample_character("Hero"));
    let mut arena = TestHarness::new()
        .with_player(player)
        .with_enemy_offset(0)
        .with_blow(50, true)
        .with_blow(50, true)
        .with_blow(50, true)
        .build();
    let now = Instant::now();
    arena.start().unwrap();

    // 50 crit special: 75 -> 90 -> 87 after reduction, then again
    arena.attack(AttackKind::Special, now).unwrap();
    arena.tick(now);
    assert_eq!(arena.session().enemy().health(), 33);

    let before = arena.session().logs().len();
    arena.attack(AttackKind::Special, now).unwrap();
    let hits = arena.tick(now);

    assert_eq!(hits.len(), 1);
    assert_eq!(arena.session().winner(), Some(Side::Player));
    let logs = &arena.session().logs()[before..];
    assert_eq!(logs.len(), 2);
    assert_eq!(
        logs[0].message,
        "Hero unleashes a CRITICAL special attack and deals 87 damage!"
    );
    assert_eq!(logs[1].message, "Enemy Level 1 is defeated!");
    assert_eq!(
        arena.attack(AttackKind::Normal, now),
        Err(CombatError::Finished)
    );
}

// =============================================================================
// Restart and progression
// =============================================================================

#[test]
fn test_restart_resets_fight() {
    let mut arena = TestHarness::new()
        .with_enemy_offset(0)
        .with_blow(40, false)
        .with_blow(40, false)
        .build();
    let now = Instant::now();
    arena.start().unwrap();
    arena.attack(AttackKind::Normal, now).unwrap();
    arena.tick(now);
    assert!(arena.session().player().health() < 200);

    arena.restart();
    let session = arena.session();
    assert_eq!(session.player().health(), session.player().max_health());
    assert_eq!(session.enemy().health(), session.enemy().max_health());
    assert_eq!(session.winner(), None);
    assert_eq!(session.phase(), Phase::NotStarted);
    assert_eq!(session.logs().len(), 1);
    assert!(session.logs()[0].message.ends_with("appears!"));
}

#[test]
fn test_next_level_after_victory() {
    let mut arena = TestHarness::new()
        .with_enemy_offset(0)
        .with_blow(50, true)
        .with_blow(50, true)
        .with_blow(50, true)
        .build();
    let now = Instant::now();
    arena.start().unwrap();
    for _ in 0..2 {
        arena.attack(AttackKind::Special, now).unwrap();
        arena.tick(now);
    }
    assert_eq!(arena.session().winner(), Some(Side::Player));

    let level = arena.advance_level().unwrap();
    assert_eq!(level, Level::new(2).unwrap());
    assert_eq!(arena.session().enemy().max_health(), 140);
    assert_eq!(arena.session().enemy().name, "Enemy Level 2");
    assert_eq!(arena.phase(), Phase::NotStarted);
}
