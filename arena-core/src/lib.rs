//! Turn-based fighter arena engine.
//!
//! This crate provides:
//! - Enemy generation scaled by arena level
//! - Damage resolution with critical hits, special attacks and defense
//! - An explicit turn state machine with cancellable delayed steps
//! - Paced fights, health bar animation and level progress persistence
//!
//! # Quick Start
//!
//! ```ignore
//! use arena_core::{ArenaSession, AttackKind, Level, SessionConfig};
//! use arena_api::{ArenaApi, TokenStore};
//! use std::time::Instant;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = ArenaApi::from_env()?.with_token("...");
//!     let tokens = TokenStore::new("token");
//!     let config = SessionConfig::new(Level::FIRST).with_character(4);
//!
//!     let mut session = ArenaSession::open(&api, &tokens, config).await?;
//!     session.start()?;
//!     session.attack(AttackKind::Special, Instant::now())?;
//!     Ok(())
//! }
//! ```

pub mod animation;
pub mod combat;
pub mod config;
pub mod damage;
pub mod dice;
pub mod enemy;
pub mod fighter;
pub mod headless;
pub mod levels;
pub mod pacing;
pub mod persist;
pub mod session;
pub mod testing;

// Primary public API
pub use animation::{DamageCallout, HealthBar};
pub use combat::{CombatError, CombatLog, CombatSession, Hit, Phase};
pub use config::ArenaConfig;
pub use damage::{resolve_damage, AttackKind, DamageRoll, Side};
pub use dice::Roller;
pub use enemy::{generate_enemy, Level, LevelError};
pub use fighter::{Attributes, Fighter};
pub use headless::{FightReport, HeadlessArena, Strategy};
pub use levels::{ArenaLevel, ArenaProgress, Difficulty};
pub use pacing::{Arena, Pacing};
pub use persist::PersistError;
pub use session::{ArenaSession, SessionConfig, SessionError};
pub use testing::{ScriptedRoller, TestHarness};
