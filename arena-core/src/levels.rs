//! The arena level catalog and the player's progress through it.

use crate::enemy::Level;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        };
        f.write_str(label)
    }
}

/// A level as shown on the level select screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaLevel {
    pub level: Level,
    pub name: String,
    pub difficulty: Difficulty,
    pub environment: String,
}

const CATALOG: [(&str, Difficulty, &str); 5] = [
    ("Mysterious Forest", Difficulty::Easy, "Forest"),
    ("Dark Caves", Difficulty::Easy, "Cave"),
    ("Burning Desert", Difficulty::Medium, "Desert"),
    ("Frozen Peaks", Difficulty::Medium, "Mountain"),
    ("Volcano", Difficulty::Hard, "Volcano"),
];

/// The named levels.
pub fn catalog() -> Vec<ArenaLevel> {
    (1..=CATALOG.len() as u32)
        .filter_map(|n| Level::new(n).ok())
        .map(describe)
        .collect()
}

/// Describe any level. Levels past the catalog are generic hard arenas.
pub fn describe(level: Level) -> ArenaLevel {
    let index = level.get() as usize - 1;
    match CATALOG.get(index) {
        Some((name, difficulty, environment)) => ArenaLevel {
            level,
            name: (*name).to_string(),
            difficulty: *difficulty,
            environment: (*environment).to_string(),
        },
        None => ArenaLevel {
            level,
            name: format!("Uncharted Arena {level}"),
            difficulty: Difficulty::Hard,
            environment: "Unknown".to_string(),
        },
    }
}

/// Which levels have been beaten and how far the player may go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaProgress {
    completed: BTreeSet<Level>,
    highest_unlocked: Level,
}

impl Default for ArenaProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ArenaProgress {
    /// Fresh progress: only level 1 is open.
    pub fn new() -> Self {
        Self {
            completed: BTreeSet::new(),
            highest_unlocked: Level::FIRST,
        }
    }

    pub fn highest_unlocked(&self) -> Level {
        self.highest_unlocked
    }

    pub fn is_unlocked(&self, level: Level) -> bool {
        level <= self.highest_unlocked
    }

    pub fn is_completed(&self, level: Level) -> bool {
        self.completed.contains(&level)
    }

    pub fn completed(&self) -> impl Iterator<Item = Level> + '_ {
        self.completed.iter().copied()
    }

    /// Record a win. Returns `true` if this unlocked a new level.
    pub fn record_victory(&mut self, level: Level) -> bool {
        self.completed.insert(level);
        let next = level.next();
        if next > self.highest_unlocked {
            self.highest_unlocked = next;
            tracing::info!(level = next.get(), "level unlocked");
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(n: u32) -> Level {
        Level::new(n).unwrap()
    }

    #[test]
    fn test_catalog() {
        let levels = catalog();
        assert_eq!(levels.len(), 5);
        assert_eq!(levels[0].name, "Mysterious Forest");
        assert_eq!(levels[0].level, Level::FIRST);
        assert_eq!(levels[2].difficulty, Difficulty::Medium);
        assert_eq!(levels[4].environment, "Volcano");
        assert_eq!(levels[4].difficulty.to_string(), "Hard");
    }

    #[test]
    fn test_describe_beyond_catalog() {
        let info = describe(level(9));
        assert_eq!(info.name, "Uncharted Arena 9");
        assert_eq!(info.difficulty, Difficulty::Hard);
    }

    #[test]
    fn test_progress_unlocks() {
        let mut progress = ArenaProgress::new();
        assert!(progress.is_unlocked(level(1)));
        assert!(!progress.is_unlocked(level(2)));

        assert!(progress.record_victory(level(1)));
        assert!(progress.is_completed(level(1)));
        assert!(progress.is_unlocked(level(2)));
        assert_eq!(progress.highest_unlocked(), level(2));

        // replaying an earlier level does not unlock anything new
        assert!(!progress.record_victory(level(1)));
        assert_eq!(progress.completed().count(), 1);
    }

    #[test]
    fn test_progress_serializes_levels_as_numbers() {
        let mut progress = ArenaProgress::new();
        progress.record_victory(level(1));
        progress.record_victory(level(2));
        let json = serde_json::to_value(&progress).unwrap();
        assert_eq!(json["completed"], serde_json::json!([1, 2]));
        assert_eq!(json["highest_unlocked"], 3);
    }
}
