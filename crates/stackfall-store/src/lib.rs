//! Persistence backends for saved stackfall games.
//!
//! Both backends implement [`GameStore`](stackfall_engine::GameStore) and can be
//! swapped freely:
//!
//! - [`TextStore`]: one line-oriented text file per game (see [`text_format`])
//! - [`RecordStore`]: relational `games` and `fields` tables kept in a single
//!   JSON database file, or only in memory
//!
//! # Example
//!
//! ```
//! use stackfall_engine::{BoardSize, GameModel};
//! use stackfall_store::RecordStore;
//!
//! let mut model = GameModel::new(BoardSize::Small, None).with_store(Box::new(RecordStore::in_memory()));
//! model.advance_tick();
//! model.save_game("quicksave").unwrap();
//!
//! let saved = model.list_games().unwrap();
//! assert_eq!(saved[0].name, "quicksave");
//! ```

pub use self::{record_store::RecordStore, text_store::TextStore};

mod record_store;
pub mod text_format;
mod text_store;

#[cfg(test)]
mod test_util {
    use std::{fs, path::PathBuf, process};

    /// Returns an empty directory unique to this test process.
    pub(crate) fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("stackfall-{name}-{}", process::id()));
        if dir.exists() {
            fs::remove_dir_all(&dir).unwrap();
        }
        fs::create_dir_all(&dir).unwrap();
        dir
    }
}
