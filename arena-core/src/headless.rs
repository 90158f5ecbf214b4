//! Headless fights for programmatic use.
//!
//! This module runs arena fights without a terminal. It's designed for:
//! - Scripted play over stdin/stdout
//! - Automated tests of whole fights
//! - Simulating many fights with a fixed strategy
//!
//! # Example
//!
//! ```ignore
//! use arena_core::headless::{HeadlessArena, Strategy};
//!
//! let mut fight = HeadlessArena::new(arena).with_strategy(Strategy::Alternate);
//! let report = fight.run().await?;
//! println!("{:?} won after {} turns", report.winner, report.turns);
//! ```

use crate::combat::{CombatError, CombatLog, Hit};
use crate::damage::{AttackKind, Side};
use crate::dice::Roller;
use crate::enemy::Level;
use crate::pacing::Arena;
use rand::rngs::StdRng;
use std::time::Instant;

/// How the player picks attacks when a fight is run automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    #[default]
    AlwaysNormal,
    AlwaysSpecial,
    /// Normal first, then special, and so on.
    Alternate,
}

impl Strategy {
    pub fn choose(self, turn: usize) -> AttackKind {
        match self {
            Strategy::AlwaysNormal => AttackKind::Normal,
            Strategy::AlwaysSpecial => AttackKind::Special,
            Strategy::Alternate if turn % 2 == 0 => AttackKind::Normal,
            Strategy::Alternate => AttackKind::Special,
        }
    }
}

/// Summary of a completed fight.
#[derive(Debug, Clone)]
pub struct FightReport {
    pub winner: Side,
    pub turns: usize,
    pub hits: Vec<Hit>,
    pub player_health: u32,
    pub enemy_health: u32,
}

/// An arena driven by a clock instead of key presses.
#[derive(Debug)]
pub struct HeadlessArena<R = StdRng> {
    arena: Arena<R>,
    strategy: Strategy,
    log_cursor: usize,
    log_generation: u64,
}

impl<R: Roller> HeadlessArena<R> {
    pub fn new(arena: Arena<R>) -> Self {
        let log_generation = arena.session().generation();
        Self {
            arena,
            strategy: Strategy::default(),
            log_cursor: 0,
            log_generation,
        }
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn arena(&self) -> &Arena<R> {
        &self.arena
    }

    pub fn level(&self) -> Level {
        self.arena.level()
    }

    pub fn start(&mut self) -> Result<(), CombatError> {
        self.arena.start()
    }

    /// Choose an attack now. Use [`advance`](Self::advance) to let it land.
    pub fn attack(&mut self, kind: AttackKind) -> Result<(), CombatError> {
        self.arena.attack(kind, Instant::now()).map(|_| ())
    }

    /// Wait for the next scheduled step and fire it. Returns `None` when
    /// nothing is scheduled.
    pub async fn advance(&mut self) -> Option<Vec<Hit>> {
        let deadline = self.arena.next_deadline()?;
        tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
        Some(self.arena.tick(deadline.max(Instant::now())))
    }

    /// Attack and wait until the exchange is over.
    pub async fn play_turn(&mut self, kind: AttackKind) -> Result<Vec<Hit>, CombatError> {
        self.attack(kind)?;
        let mut hits = Vec::new();
        while let Some(fired) = self.advance().await {
            hits.extend(fired);
        }
        Ok(hits)
    }

    /// Play the fight to the end with the configured strategy.
    pub async fn run(&mut self) -> Result<FightReport, CombatError> {
        // Let a blow already in flight land before choosing moves
        let mut hits = Vec::new();
        while let Some(fired) = self.advance().await {
            hits.extend(fired);
        }

        if !self.arena.session().is_fighting() && self.arena.session().winner().is_none() {
            self.arena.start()?;
        }

        let mut turns = 0;
        let winner = loop {
            if let Some(winner) = self.arena.session().winner() {
                break winner;
            }
            let kind = self.strategy.choose(turns);
            hits.extend(self.play_turn(kind).await?);
            turns += 1;
        };

        let session = self.arena.session();
        tracing::info!(?winner, turns, "headless fight finished");
        Ok(FightReport {
            winner,
            turns,
            hits,
            player_health: session.player().health(),
            enemy_health: session.enemy().health(),
        })
    }

    /// Log lines appended since the last call.
    pub fn new_logs(&mut self) -> Vec<CombatLog> {
        let session = self.arena.session();
        if session.generation() != self.log_generation {
            self.log_generation = session.generation();
            self.log_cursor = 0;
        }
        let logs = session.logs();
        let fresh = logs.get(self.log_cursor..).unwrap_or_default().to_vec();
        self.log_cursor = logs.len();
        fresh
    }

    pub fn restart(&mut self) {
        self.arena.restart();
    }

    pub fn next_level(&mut self) -> Result<Level, CombatError> {
        self.arena.advance_level()
    }

    pub fn into_arena(self) -> Arena<R> {
        self.arena
    }
}
