//! Paced fights.
//!
//! [`Arena`] wraps a [`CombatSession`] with a clock: the player's blow lands
//! [`STRIKE_DELAY`] after the attack is chosen and the enemy answers
//! [`COUNTER_DELAY`] after that. Time is passed in by the caller, so the
//! same code drives the terminal front-end, the headless runner and tests.

use crate::combat::{CombatError, CombatSession, Continuation, Hit, Next, Phase};
use crate::damage::{AttackKind, Side};
use crate::dice::Roller;
use crate::enemy::{generate_enemy, Level};
use crate::fighter::Fighter;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::{Duration, Instant};

/// Delay between choosing an attack and the blow landing.
pub const STRIKE_DELAY: Duration = Duration::from_millis(300);

/// Delay between the player's blow and the enemy's counter-attack.
pub const COUNTER_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub strike_delay: Duration,
    pub counter_delay: Duration,
}

impl Pacing {
    /// No delays at all. Every step resolves on the next tick.
    pub const fn instant() -> Self {
        Self {
            strike_delay: Duration::ZERO,
            counter_delay: Duration::ZERO,
        }
    }

    pub fn with_strike_delay(mut self, delay: Duration) -> Self {
        self.strike_delay = delay;
        self
    }

    pub fn with_counter_delay(mut self, delay: Duration) -> Self {
        self.counter_delay = delay;
        self
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            strike_delay: STRIKE_DELAY,
            counter_delay: COUNTER_DELAY,
        }
    }
}

#[derive(Debug)]
struct Scheduled {
    due: Instant,
    continuation: Continuation,
}

/// A fight at a given level, with its enemy generator and timeline.
///
/// At most one continuation is scheduled at any time.
#[derive(Debug)]
pub struct Arena<R = StdRng> {
    session: CombatSession,
    level: Level,
    pacing: Pacing,
    roller: R,
    pending: Option<Scheduled>,
}

impl Arena<StdRng> {
    pub fn new(player: Fighter, level: Level) -> Self {
        Self::with_roller(player, level, StdRng::from_entropy())
    }
}

impl<R: Roller> Arena<R> {
    pub fn with_roller(player: Fighter, level: Level, mut roller: R) -> Self {
        let enemy = generate_enemy(level, &mut roller);
        tracing::info!(
            level = level.get(),
            player = %player.name,
            enemy = %enemy.name,
            "arena opened"
        );
        Self {
            session: CombatSession::new(player, enemy),
            level,
            pacing: Pacing::default(),
            roller,
            pending: None,
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn session(&self) -> &CombatSession {
        &self.session
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    pub fn roller_mut(&mut self) -> &mut R {
        &mut self.roller
    }

    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    /// Whether a delayed step is waiting to fire.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// When the next delayed step fires, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|scheduled| scheduled.due)
    }

    pub fn start(&mut self) -> Result<(), CombatError> {
        self.session.start()
    }

    /// Choose an attack. Returns when the blow will land.
    pub fn attack(&mut self, kind: AttackKind, now: Instant) -> Result<Instant, CombatError> {
        let continuation = self.session.attack(kind)?;
        let due = now + self.pacing.strike_delay;
        self.pending = Some(Scheduled { due, continuation });
        Ok(due)
    }

    /// Fire every step that is due at `now`, returning the blows in order.
    ///
    /// A counter-attack is scheduled relative to when the blow before it
    /// was due, so late ticks do not stretch the timeline.
    pub fn tick(&mut self, now: Instant) -> Vec<Hit> {
        let mut hits = Vec::new();
        while let Some(scheduled) = self.pending.take() {
            if scheduled.due > now {
                self.pending = Some(scheduled);
                break;
            }
            match self.session.resume(scheduled.continuation, &mut self.roller) {
                Ok(exchange) => {
                    hits.push(exchange.hit);
                    if let Next::Counter(continuation) = exchange.next {
                        self.pending = Some(Scheduled {
                            due: scheduled.due + self.pacing.counter_delay,
                            continuation,
                        });
                    }
                }
                Err(error) => {
                    tracing::warn!(%error, "dropped scheduled step");
                }
            }
        }
        hits
    }

    /// Start over against a fresh enemy of the same level. Anything still
    /// scheduled is discarded.
    pub fn restart(&mut self) {
        self.pending = None;
        let enemy = generate_enemy(self.level, &mut self.roller);
        self.session.restart(enemy);
    }

    /// After a victory, move on to the next level with a fresh enemy.
    pub fn advance_level(&mut self) -> Result<Level, CombatError> {
        if self.session.winner() != Some(Side::Player) {
            return Err(CombatError::NotWon);
        }
        self.level = self.level.next();
        tracing::info!(level = self.level.get(), "advancing to next level");
        self.restart();
        Ok(self.level)
    }
}
