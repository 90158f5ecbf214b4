//! The turn state machine for a single fight.
//!
//! A fight moves through [`Phase`]s:
//!
//! ```text
//! NotStarted -> PlayerTurn -> Striking -> EnemyTurn -> PlayerTurn -> ...
//!                                 |            |
//!                                 +------------+--> Finished(winner)
//! ```
//!
//! Blows that land after a delay are represented as [`Continuation`]s. The
//! session hands one out when a delayed step begins and consumes it in
//! [`CombatSession::resume`]. Each continuation remembers the generation of
//! the fight that issued it, so anything still pending when the fight is
//! restarted is rejected instead of touching the new fight.

use crate::damage::{resolve_damage, AttackKind, DamageRoll, Side};
use crate::dice::Roller;
use crate::fighter::Fighter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombatError {
    #[error("The fight has already started")]
    AlreadyStarted,

    #[error("The fight has not started yet")]
    NotStarted,

    #[error("It is not the player's turn")]
    NotPlayerTurn,

    #[error("The fight is over")]
    Finished,

    #[error("The fight has not been won")]
    NotWon,

    #[error("Continuation was cancelled by a restart")]
    Cancelled,

    #[error("Continuation does not match the current phase")]
    OutOfOrder,
}

/// Where the fight currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    NotStarted,
    /// Waiting for the player to pick an attack.
    PlayerTurn,
    /// The player committed to an attack that has not landed yet.
    Striking(AttackKind),
    /// The enemy is winding up its counter-attack.
    EnemyTurn,
    Finished(Side),
}

/// One line of the combat log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatLog {
    pub message: String,
    pub side: Side,
    pub is_critical: bool,
    pub is_heal: bool,
}

impl CombatLog {
    pub fn new(message: impl Into<String>, side: Side) -> Self {
        Self {
            message: message.into(),
            side,
            is_critical: false,
            is_heal: false,
        }
    }

    pub fn with_critical(mut self, is_critical: bool) -> Self {
        self.is_critical = is_critical;
        self
    }

    pub fn is_player(&self) -> bool {
        self.side == Side::Player
    }
}

/// The delayed step a continuation performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    PlayerStrike(AttackKind),
    EnemyCounter,
}

/// A pending delayed step. Only a [`CombatSession`] can create one.
#[derive(Debug)]
#[must_use = "a continuation does nothing unless resumed"]
pub struct Continuation {
    generation: u64,
    step: Step,
}

impl Continuation {
    pub fn step(&self) -> Step {
        self.step
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// A blow that landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub attacker: Side,
    pub kind: AttackKind,
    pub damage: u32,
    pub is_critical: bool,
    /// Health left on the target afterwards.
    pub remaining: u32,
}

impl Hit {
    pub fn target(&self) -> Side {
        self.attacker.opponent()
    }
}

/// What follows a resolved step.
#[derive(Debug)]
pub enum Next {
    /// The enemy counter-attacks once this continuation is resumed.
    Counter(Continuation),
    PlayerTurn,
    Finished(Side),
}

/// The result of resuming a continuation.
#[derive(Debug)]
pub struct Exchange {
    pub hit: Hit,
    pub next: Next,
}

/// A fight between the player and one enemy.
#[derive(Debug, Clone)]
pub struct CombatSession {
    player: Fighter,
    enemy: Fighter,
    phase: Phase,
    logs: Vec<CombatLog>,
    generation: u64,
}

impl CombatSession {
    pub fn new(player: Fighter, enemy: Fighter) -> Self {
        let mut session = Self {
            player,
            enemy,
            phase: Phase::NotStarted,
            logs: Vec::new(),
            generation: 0,
        };
        session.push_intro();
        session
    }

    pub fn player(&self) -> &Fighter {
        &self.player
    }

    pub fn enemy(&self) -> &Fighter {
        &self.enemy
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn logs(&self) -> &[CombatLog] {
        &self.logs
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn winner(&self) -> Option<Side> {
        match self.phase {
            Phase::Finished(winner) => Some(winner),
            _ => None,
        }
    }

    pub fn is_fighting(&self) -> bool {
        matches!(
            self.phase,
            Phase::PlayerTurn | Phase::Striking(_) | Phase::EnemyTurn
        )
    }

    /// Whether the turn indicator points at the player. True before the
    /// fight starts and while waiting for an attack.
    pub fn is_player_turn(&self) -> bool {
        matches!(self.phase, Phase::NotStarted | Phase::PlayerTurn)
    }

    /// Whether an attack would be accepted right now.
    pub fn can_attack(&self) -> bool {
        self.phase == Phase::PlayerTurn
    }

    pub fn start(&mut self) -> Result<(), CombatError> {
        match self.phase {
            Phase::NotStarted => {
                self.phase = Phase::PlayerTurn;
                self.logs
                    .push(CombatLog::new("The fight begins!", Side::Player));
                tracing::debug!(generation = self.generation, "fight started");
                Ok(())
            }
            Phase::Finished(_) => Err(CombatError::Finished),
            _ => Err(CombatError::AlreadyStarted),
        }
    }

    /// Commit the player to an attack. The blow lands when the returned
    /// continuation is resumed.
    pub fn attack(&mut self, kind: AttackKind) -> Result<Continuation, CombatError> {
        match self.phase {
            Phase::PlayerTurn => {
                self.phase = Phase::Striking(kind);
                tracing::debug!(?kind, "player attack committed");
                Ok(self.continuation(Step::PlayerStrike(kind)))
            }
            Phase::NotStarted => Err(CombatError::NotStarted),
            Phase::Finished(_) => Err(CombatError::Finished),
            Phase::Striking(_) | Phase::EnemyTurn => Err(CombatError::NotPlayerTurn),
        }
    }

    /// Perform a delayed step.
    pub fn resume<R: Roller + ?Sized>(
        &mut self,
        continuation: Continuation,
        roller: &mut R,
    ) -> Result<Exchange, CombatError> {
        if continuation.generation != self.generation {
            tracing::warn!(
                issued = continuation.generation,
                current = self.generation,
                "discarding continuation from a previous fight"
            );
            return Err(CombatError::Cancelled);
        }

        match (continuation.step, self.phase) {
            (Step::PlayerStrike(kind), Phase::Striking(current)) if kind == current => {
                Ok(self.player_strike(kind, roller))
            }
            (Step::EnemyCounter, Phase::EnemyTurn) => Ok(self.enemy_counter(roller)),
            (step, phase) => {
                tracing::warn!(?step, ?phase, "continuation out of order");
                Err(CombatError::OutOfOrder)
            }
        }
    }

    /// Reset to a fresh fight against a new enemy. The player is restored
    /// to full health and outstanding continuations become invalid.
    pub fn restart(&mut self, enemy: Fighter) {
        self.generation += 1;
        self.player.restore();
        self.enemy = enemy;
        self.phase = Phase::NotStarted;
        self.logs.clear();
        self.push_intro();
        tracing::info!(generation = self.generation, enemy = %self.enemy.name, "fight restarted");
    }

    fn continuation(&self, step: Step) -> Continuation {
        Continuation {
            generation: self.generation,
            step,
        }
    }

    fn push_intro(&mut self) {
        let message = format!("A wild {} appears!", self.enemy.name);
        self.logs.push(CombatLog::new(message, Side::Enemy));
    }

    fn player_strike<R: Roller + ?Sized>(&mut self, kind: AttackKind, roller: &mut R) -> Exchange {
        let roll = resolve_damage(Side::Player, self.enemy.durability(), kind, roller);
        let remaining = self.enemy.take_damage(roll.damage);
        let message = player_attack_message(&self.player.name, kind, roll);
        self.logs
            .push(CombatLog::new(message, Side::Player).with_critical(roll.is_critical));

        let hit = Hit {
            attacker: Side::Player,
            kind,
            damage: roll.damage,
            is_critical: roll.is_critical,
            remaining,
        };

        let next = if self.enemy.is_defeated() {
            let message = format!("{} is defeated!", self.enemy.name);
            self.logs.push(CombatLog::new(message, Side::Player));
            self.phase = Phase::Finished(Side::Player);
            tracing::info!(enemy = %self.enemy.name, "player won the fight");
            Next::Finished(Side::Player)
        } else {
            self.phase = Phase::EnemyTurn;
            Next::Counter(self.continuation(Step::EnemyCounter))
        };

        Exchange { hit, next }
    }

    fn enemy_counter<R: Roller + ?Sized>(&mut self, roller: &mut R) -> Exchange {
        let roll = resolve_damage(
            Side::Enemy,
            self.player.durability(),
            AttackKind::Normal,
            roller,
        );
        let remaining = self.player.take_damage(roll.damage);
        let message = if roll.is_critical {
            format!(
                "{} lands a CRITICAL hit and deals {} damage!",
                self.enemy.name, roll.damage
            )
        } else {
            format!(
                "{} counter-attacks and deals {} damage!",
                self.enemy.name, roll.damage
            )
        };
        self.logs
            .push(CombatLog::new(message, Side::Enemy).with_critical(roll.is_critical));

        let hit = Hit {
            attacker: Side::Enemy,
            kind: AttackKind::Normal,
            damage: roll.damage,
            is_critical: roll.is_critical,
            remaining,
        };

        let next = if self.player.is_defeated() {
            let message = format!("{} has been defeated!", self.player.name);
            self.logs.push(CombatLog::new(message, Side::Enemy));
            self.phase = Phase::Finished(Side::Enemy);
            tracing::info!(player = %self.player.name, "player lost the fight");
            Next::Finished(Side::Enemy)
        } else {
            self.phase = Phase::PlayerTurn;
            Next::PlayerTurn
        };

        Exchange { hit, next }
    }
}

fn player_attack_message(name: &str, kind: AttackKind, roll: DamageRoll) -> String {
    match (kind, roll.is_critical) {
        (AttackKind::Special, true) => format!(
            "{name} unleashes a CRITICAL special attack and deals {} damage!",
            roll.damage
        ),
        (AttackKind::Special, false) => format!(
            "{name} unleashes a special attack and deals {} damage!",
            roll.damage
        ),
        (AttackKind::Normal, true) => {
            format!("{name} lands a CRITICAL hit and deals {} damage!", roll.damage)
        }
        (AttackKind::Normal, false) => {
            format!("{name} attacks and deals {} damage!", roll.damage)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fighter::Attributes;
    use crate::testing::ScriptedRoller;

    fn session() -> CombatSession {
        let player = Fighter::new(1, "Hero", Attributes::uniform(50), 200);
        let enemy = Fighter::new(77, "Enemy Level 1", Attributes::uniform(5), 120);
        CombatSession::new(player, enemy)
    }

    #[test]
    fn test_initial_state() {
        let session = session();
        assert_eq!(session.phase(), Phase::NotStarted);
        assert!(!session.is_fighting());
        assert!(session.is_player_turn());
        assert_eq!(session.winner(), None);
        assert_eq!(session.logs().len(), 1);
        assert_eq!(session.logs()[0].message, "A wild Enemy Level 1 appears!");
        assert!(!session.logs()[0].is_player());
    }

    #[test]
    fn test_start_only_once() {
        let mut session = session();
        session.start().unwrap();
        assert!(session.is_fighting());
        assert_eq!(session.logs()[1].message, "The fight begins!");
        assert!(session.logs()[1].is_player());
        assert_eq!(session.start(), Err(CombatError::AlreadyStarted));
    }

    #[test]
    fn test_attack_before_start_rejected() {
        let mut session = session();
        assert!(matches!(
            session.attack(AttackKind::Normal),
            Err(CombatError::NotStarted)
        ));
        assert_eq!(session.phase(), Phase::NotStarted);
    }

    #[test]
    fn test_turn_lock_rejects_second_attack() {
        let mut session = session();
        session.start().unwrap();
        let _pending = session.attack(AttackKind::Special).unwrap();
        assert_eq!(session.phase(), Phase::Striking(AttackKind::Special));
        assert!(!session.is_player_turn());
        assert!(matches!(
            session.attack(AttackKind::Normal),
            Err(CombatError::NotPlayerTurn)
        ));
    }

    #[test]
    fn test_full_exchange() {
        let mut session = session();
        let mut roller = ScriptedRoller::new()
            .with_rolls([30, 20])
            .with_chances([false, false]);

        session.start().unwrap();
        let strike = session.attack(AttackKind::Normal).unwrap();
        let exchange = session.resume(strike, &mut roller).unwrap();
        assert_eq!(exchange.hit.damage, 29);
        assert_eq!(exchange.hit.remaining, 91);
        assert_eq!(exchange.hit.target(), Side::Enemy);
        assert_eq!(session.phase(), Phase::EnemyTurn);
        assert_eq!(session.logs()[2].message, "Hero attacks and deals 29 damage!");

        let Next::Counter(counter) = exchange.next else {
            panic!("expected a counter-attack");
        };
        let exchange = session.resume(counter, &mut roller).unwrap();
        // 20 against durability 50 is reduced by a quarter
        assert_eq!(exchange.hit.damage, 15);
        assert_eq!(session.player().health(), 185);
        assert!(matches!(exchange.next, Next::PlayerTurn));
        assert_eq!(session.phase(), Phase::PlayerTurn);
        assert_eq!(
            session.logs()[3].message,
            "Enemy Level 1 counter-attacks and deals 15 damage!"
        );
    }

    #[test]
    fn test_special_critical_message() {
        let mut session = session();
        let mut roller = ScriptedRoller::new().with_rolls([40]).with_chances([true]);
        session.start().unwrap();
        let strike = session.attack(AttackKind::Special).unwrap();
        session.resume(strike, &mut roller).unwrap();
        let log = session.logs().last().unwrap();
        // 40 -> 60 crit -> 72 special -> 70 after 2.5% reduction
        assert_eq!(
            log.message,
            "Hero unleashes a CRITICAL special attack and deals 70 damage!"
        );
        assert!(log.is_critical);
    }

    #[test]
    fn test_player_victory() {
        let player = Fighter::new(1, "Hero", Attributes::uniform(50), 200);
        let enemy = Fighter::new(2, "Enemy Level 1", Attributes::uniform(5), 120).with_health(10);
        let mut session = CombatSession::new(player, enemy);
        let mut roller = ScriptedRoller::new().with_rolls([30]);

        session.start().unwrap();
        let strike = session.attack(AttackKind::Normal).unwrap();
        let exchange = session.resume(strike, &mut roller).unwrap();
        assert!(matches!(exchange.next, Next::Finished(Side::Player)));
        assert_eq!(session.winner(), Some(Side::Player));
        assert!(!session.is_fighting());
        assert!(!session.is_player_turn());
        assert_eq!(session.enemy().health(), 0);
        assert_eq!(session.logs().last().unwrap().message, "Enemy Level 1 is defeated!");
        assert!(matches!(
            session.attack(AttackKind::Normal),
            Err(CombatError::Finished)
        ));
    }

    #[test]
    fn test_player_defeat() {
        let player = Fighter::new(1, "Hero", Attributes::uniform(0), 100).with_health(5);
        let enemy = Fighter::new(2, "Brute", Attributes::uniform(5), 120);
        let mut session = CombatSession::new(player, enemy);
        let mut roller = ScriptedRoller::new().with_rolls([10, 10]);

        session.start().unwrap();
        let strike = session.attack(AttackKind::Normal).unwrap();
        let Next::Counter(counter) = session.resume(strike, &mut roller).unwrap().next else {
            panic!("expected a counter-attack");
        };
        let exchange = session.resume(counter, &mut roller).unwrap();
        assert!(matches!(exchange.next, Next::Finished(Side::Enemy)));
        assert_eq!(session.winner(), Some(Side::Enemy));
        assert_eq!(session.player().health(), 0);
        let last = session.logs().last().unwrap();
        assert_eq!(last.message, "Hero has been defeated!");
        assert!(!last.is_player());
    }

    #[test]
    fn test_restart_cancels_pending_continuation() {
        let mut session = session();
        let mut roller = ScriptedRoller::new().with_rolls([30]);
        session.start().unwrap();
        let stale = session.attack(AttackKind::Normal).unwrap();

        let fresh_enemy = Fighter::new(3, "Enemy Level 1", Attributes::uniform(4), 120);
        session.restart(fresh_enemy);
        assert_eq!(session.phase(), Phase::NotStarted);
        assert_eq!(session.logs().len(), 1);

        assert_eq!(
            session.resume(stale, &mut roller).unwrap_err(),
            CombatError::Cancelled
        );
        assert_eq!(session.enemy().health(), 120);
        assert_eq!(session.phase(), Phase::NotStarted);
    }

    #[test]
    fn test_restart_restores_player() {
        let mut session = session();
        let mut roller = ScriptedRoller::new().with_rolls([30, 50]).with_chances([false, true]);
        session.start().unwrap();
        let strike = session.attack(AttackKind::Normal).unwrap();
        let Next::Counter(counter) = session.resume(strike, &mut roller).unwrap().next else {
            panic!("expected a counter-attack");
        };
        session.resume(counter, &mut roller).unwrap();
        assert!(session.player().health() < 200);

        let enemy = session.enemy().clone().with_health(120);
        session.restart(enemy);
        assert_eq!(session.player().health(), 200);
        assert_eq!(session.generation(), 1);
    }
}
