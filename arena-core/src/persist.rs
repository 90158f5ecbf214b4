//! Saving and loading arena progress.
//!
//! Progress is stored as pretty-printed JSON with a format version.

use crate::levels::ArenaProgress;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::Path;
use thiserror::Error;
use tokio::fs;

/// Current progress file format version.
pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// A saved progress file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedProgress {
    pub version: u32,

    /// Seconds since the Unix epoch.
    pub saved_at: String,

    pub progress: ArenaProgress,
}

impl SavedProgress {
    pub fn new(progress: ArenaProgress) -> Self {
        Self {
            version: SAVE_VERSION,
            saved_at: timestamp_now(),
            progress,
        }
    }

    /// Save to a JSON file, creating parent directories.
    pub async fn save_json(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).await?;
        tracing::debug!(path = %path.display(), "progress saved");
        Ok(())
    }

    /// Load from a JSON file.
    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let content = fs::read_to_string(path).await?;
        let saved: Self = serde_json::from_str(&content)?;

        if saved.version != SAVE_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: SAVE_VERSION,
                found: saved.version,
            });
        }

        Ok(saved)
    }
}

/// Save progress to `path`.
pub async fn save_progress(
    path: impl AsRef<Path>,
    progress: &ArenaProgress,
) -> Result<(), PersistError> {
    SavedProgress::new(progress.clone()).save_json(path).await
}

/// Load progress from `path`. A missing file is fresh progress.
pub async fn load_progress(path: impl AsRef<Path>) -> Result<ArenaProgress, PersistError> {
    match SavedProgress::load_json(path).await {
        Ok(saved) => Ok(saved.progress),
        Err(PersistError::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(ArenaProgress::new()),
        Err(e) => Err(e),
    }
}

fn timestamp_now() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    now.as_secs().to_string()
}
