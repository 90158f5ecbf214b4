//! Arena session management.
//!
//! An [`ArenaSession`] is what the arena screen owns: the player's persisted
//! character, loaded once from the API, and the paced [`Arena`] built from
//! it. Combat never writes back to the API.

use crate::combat::{CombatError, CombatSession, Hit, Phase};
use crate::damage::AttackKind;
use crate::dice::Roller;
use crate::enemy::Level;
use crate::fighter::Fighter;
use crate::pacing::{Arena, Pacing};
use arena_api::{ArenaApi, Character, TokenStore};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;
use thiserror::Error;

/// Error type for arena sessions.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No character selected")]
    NoCharacterSelected,

    #[error("Not authenticated - log in again or provide a token with --token")]
    NotAuthenticated,

    #[error("Failed to load character: {0}")]
    Load(arena_api::Error),

    #[error("Combat error: {0}")]
    Combat(#[from] CombatError),
}

impl From<arena_api::Error> for SessionError {
    fn from(error: arena_api::Error) -> Self {
        match error {
            arena_api::Error::NotAuthenticated | arena_api::Error::NoToken => {
                SessionError::NotAuthenticated
            }
            other => SessionError::Load(other),
        }
    }
}

/// Configuration for opening an arena session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Id of the selected character, if any.
    pub character_id: Option<u64>,

    /// Level to fight at.
    pub level: Level,

    pub pacing: Pacing,
}

impl SessionConfig {
    pub fn new(level: Level) -> Self {
        Self {
            character_id: None,
            level,
            pacing: Pacing::default(),
        }
    }

    pub fn with_character(mut self, id: u64) -> Self {
        self.character_id = Some(id);
        self
    }

    pub fn with_selection(mut self, id: Option<u64>) -> Self {
        self.character_id = id;
        self
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }
}

/// A loaded character and the fight it is in.
#[derive(Debug)]
pub struct ArenaSession<R = StdRng> {
    character: Character,
    arena: Arena<R>,
}

impl ArenaSession<StdRng> {
    /// Fetch the selected character and set up a fight.
    ///
    /// A 401 clears the stored token.
    pub async fn open(
        api: &ArenaApi,
        tokens: &TokenStore,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        Self::open_with_roller(api, tokens, config, StdRng::from_entropy()).await
    }
}

impl<R: Roller> ArenaSession<R> {
    pub async fn open_with_roller(
        api: &ArenaApi,
        tokens: &TokenStore,
        config: SessionConfig,
        roller: R,
    ) -> Result<Self, SessionError> {
        let id = config
            .character_id
            .ok_or(SessionError::NoCharacterSelected)?;

        let character = match api.get_character(id).await {
            Ok(character) => character,
            Err(arena_api::Error::NotAuthenticated) => {
                tracing::warn!(character = id, "character load rejected, clearing token");
                if let Err(e) = tokens.clear().await {
                    tracing::warn!(error = %e, "failed to clear stored token");
                }
                return Err(SessionError::NotAuthenticated);
            }
            Err(e) => {
                tracing::warn!(character = id, error = %e, "character load failed");
                return Err(e.into());
            }
        };

        tracing::info!(
            character = id,
            name = %character.name,
            level = config.level.get(),
            "arena session opened"
        );
        Ok(Self::from_character(character, config.level, config.pacing, roller))
    }

    /// Set up a fight for an already loaded character.
    pub fn from_character(character: Character, level: Level, pacing: Pacing, roller: R) -> Self {
        let player = Fighter::from_character(&character);
        let arena = Arena::with_roller(player, level, roller).with_pacing(pacing);
        Self { character, arena }
    }

    /// The persisted character record. Never modified by combat.
    pub fn character(&self) -> &Character {
        &self.character
    }

    /// Split into the character record and its fight.
    pub fn into_parts(self) -> (Character, Arena<R>) {
        (self.character, self.arena)
    }

    pub fn arena(&self) -> &Arena<R> {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut Arena<R> {
        &mut self.arena
    }

    pub fn combat(&self) -> &CombatSession {
        self.arena.session()
    }

    pub fn level(&self) -> Level {
        self.arena.level()
    }

    pub fn phase(&self) -> Phase {
        self.arena.phase()
    }

    pub fn start(&mut self) -> Result<(), SessionError> {
        Ok(self.arena.start()?)
    }

    pub fn attack(&mut self, kind: AttackKind, now: Instant) -> Result<Instant, SessionError> {
        Ok(self.arena.attack(kind, now)?)
    }

    pub fn tick(&mut self, now: Instant) -> Vec<Hit> {
        self.arena.tick(now)
    }

    /// Fight again at the same level against a fresh enemy.
    pub fn restart(&mut self) {
        self.arena.restart();
    }

    /// After a victory, fight at the next level.
    pub fn next_level(&mut self) -> Result<Level, SessionError> {
        Ok(self.arena.advance_level()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_character, ScriptedRoller};

    #[tokio::test]
    async fn test_open_without_selection() {
        let dir = tempfile::tempdir().unwrap();
        let tokens = TokenStore::new(dir.path().join("token"));
        let api = ArenaApi::new(arena_api::ApiConfig::new("http://127.0.0.1:9"))
            .unwrap()
            .with_token("jwt");

        let result = ArenaSession::open(&api, &tokens, SessionConfig::new(Level::FIRST)).await;
        assert!(matches!(result, Err(SessionError::NoCharacterSelected)));
    }

    #[tokio::test]
    async fn test_open_without_token_is_not_authenticated() {
        let dir = tempfile::tempdir().unwrap();
        let tokens = TokenStore::new(dir.path().join("token"));
        let api = ArenaApi::new(arena_api::ApiConfig::new("http://127.0.0.1:9")).unwrap();

        let config = SessionConfig::new(Level::FIRST).with_character(3);
        let result = ArenaSession::open(&api, &tokens, config).await;
        assert!(matches!(result, Err(SessionError::NotAuthenticated)));
    }

    #[test]
    fn test_from_character_uses_persisted_stats() {
        let character = sample_character("Vex");
        let session = ArenaSession::from_character(
            character.clone(),
            Level::new(2).unwrap(),
            Pacing::instant(),
            ScriptedRoller::new(),
        );
        assert_eq!(session.character(), &character);
        assert_eq!(session.combat().player().max_health(), 200);
        assert_eq!(session.combat().enemy().max_health(), 140);
        assert_eq!(session.level().get(), 2);
        assert_eq!(session.phase(), Phase::NotStarted);
    }

    #[test]
    fn test_next_level_only_after_victory() {
        let mut session = ArenaSession::from_character(
            sample_character("Vex"),
            Level::FIRST,
            Pacing::instant(),
            ScriptedRoller::new(),
        );
        assert!(matches!(
            session.next_level(),
            Err(SessionError::Combat(CombatError::NotWon))
        ));
    }

    #[test]
    fn test_session_error_mapping() {
        assert!(matches!(
            SessionError::from(arena_api::Error::NotAuthenticated),
            SessionError::NotAuthenticated
        ));
        assert!(matches!(
            SessionError::from(arena_api::Error::Network("refused".into())),
            SessionError::Load(_)
        ));
    }
}
