use std::io;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::GameSnapshot;

/// Storage for saved games, addressed by name.
///
/// Implementations must leave their stored data unchanged when an operation
/// fails, and must never hand out a snapshot that does not pass
/// [`GameSnapshot::validate`]; such data is reported as
/// [`StoreError::CorruptData`].
pub trait GameStore {
    /// Reads the game saved under `name`.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if nothing is saved under `name`,
    /// [`StoreError::CorruptData`] if the saved data cannot be read back, or
    /// [`StoreError::BackendUnavailable`] if the storage cannot be reached.
    fn load(&self, name: &str) -> Result<GameSnapshot, StoreError>;

    /// Saves `snapshot` under `name`, replacing any game saved under that name.
    ///
    /// # Errors
    ///
    /// [`StoreError::WriteError`] if the game could not be stored.
    fn save(&mut self, name: &str, snapshot: &GameSnapshot) -> Result<(), StoreError>;

    /// Lists every saved game, most recently saved first.
    ///
    /// # Errors
    ///
    /// [`StoreError::BackendUnavailable`] if the storage cannot be read.
    fn list(&self) -> Result<Vec<SaveEntry>, StoreError>;
}

/// A saved game as reported by [`GameStore::list`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SaveEntry {
    pub name: String,
    pub saved_at: DateTime<Utc>,
}

impl SaveEntry {
    /// Sorts entries most recent first, breaking ties by name.
    pub fn sort_recent_first(entries: &mut [Self]) {
        entries.sort_by(|a, b| {
            b.saved_at
                .cmp(&a.saved_at)
                .then_with(|| a.name.cmp(&b.name))
        });
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum StoreError {
    #[display("no saved game named {name:?}")]
    NotFound { name: String },
    #[display("saved game {name:?} is corrupt: {reason}")]
    CorruptData { name: String, reason: String },
    #[display("failed to write saved game {name:?}")]
    WriteError { name: String, source: io::Error },
    #[display("saved games are unavailable")]
    BackendUnavailable { source: io::Error },
}

impl StoreError {
    #[must_use]
    pub fn corrupt(name: &str, reason: impl ToString) -> Self {
        Self::CorruptData {
            name: name.to_owned(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;

    use super::*;

    fn entry(name: &str, secs: i64) -> SaveEntry {
        SaveEntry {
            name: name.to_owned(),
            saved_at: Utc.timestamp_opt(secs, 0).unwrap(),
        }
    }

    #[test]
    fn test_sort_recent_first() {
        let mut entries = vec![
            entry("first", 100),
            entry("third", 300),
            entry("second", 200),
            entry("also-third", 300),
        ];
        SaveEntry::sort_recent_first(&mut entries);
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["also-third", "third", "second", "first"]);
    }

    #[test]
    fn test_error_messages() {
        let err = StoreError::NotFound {
            name: "slot".to_owned(),
        };
        assert_eq!(err.to_string(), "no saved game named \"slot\"");
        let err = StoreError::corrupt("slot", "bad header");
        assert_eq!(
            err.to_string(),
            "saved game \"slot\" is corrupt: bad header"
        );
    }
}
