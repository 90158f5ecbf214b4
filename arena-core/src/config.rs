//! Runtime configuration.
//!
//! Values come from the environment, with platform directories as
//! defaults:
//! - `ARENA_TOKEN_PATH`: bearer token file
//! - `ARENA_PROGRESS_PATH`: progress save file
//! - `ARENA_LOG_DIR`: log directory
//! - `ARENA_FAST=1`: resolve strikes without pacing delays
//!
//! The API itself is configured through [`ApiConfig::from_env`].

use crate::pacing::Pacing;
use arena_api::{parse_flag, ApiConfig};
use std::env;
use std::path::PathBuf;

const APP_NAME: &str = "arena";

#[derive(Debug, Clone)]
pub struct ArenaConfig {
    pub api: ApiConfig,
    pub token_path: PathBuf,
    pub progress_path: PathBuf,
    pub log_dir: PathBuf,
    pub pacing: Pacing,
}

impl ArenaConfig {
    /// Platform defaults, ignoring the environment.
    pub fn new(api: ApiConfig) -> Self {
        let data = data_dir();
        Self {
            api,
            token_path: data.join("token"),
            progress_path: data.join("progress.json"),
            log_dir: log_dir(),
            pacing: Pacing::default(),
        }
    }

    pub fn from_env() -> Self {
        let mut config = Self::new(ApiConfig::from_env());
        if let Some(path) = env_path("ARENA_TOKEN_PATH") {
            config.token_path = path;
        }
        if let Some(path) = env_path("ARENA_PROGRESS_PATH") {
            config.progress_path = path;
        }
        if let Some(path) = env_path("ARENA_LOG_DIR") {
            config.log_dir = path;
        }
        if env::var("ARENA_FAST").map(|v| parse_flag(&v)).unwrap_or(false) {
            config.pacing = Pacing::instant();
        }
        config
    }

    pub fn with_token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = path.into();
        self
    }

    pub fn with_progress_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.progress_path = path.into();
        self
    }

    pub fn with_log_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_dir = path.into();
        self
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(ApiConfig::default())
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Platform data directory, e.g. `~/.local/share/arena` on Linux.
fn data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./arena_data"))
}

/// Platform cache directory for logs, e.g. `~/.cache/arena/logs`.
fn log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp/arena"))
        .join("logs")
}
