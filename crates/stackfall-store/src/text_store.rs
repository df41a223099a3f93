use std::{
    fs::{self, File},
    io::{self, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use stackfall_engine::{GameSnapshot, GameStore, SaveEntry, StoreError};

use crate::text_format;

/// Saved games as `<name>.tt` text files in one directory.
///
/// The directory is created on the first save. Listing reports the files'
/// modification times as save times.
#[derive(Debug, Clone)]
pub struct TextStore {
    dir: PathBuf,
}

impl TextStore {
    /// File extension of saved games.
    pub const EXTENSION: &'static str = "tt";

    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file the game `name` is saved to, or `None` if `name` cannot
    /// be used as a file name.
    #[must_use]
    pub fn path_for(&self, name: &str) -> Option<PathBuf> {
        is_valid_name(name).then(|| self.dir.join(format!("{name}.{}", Self::EXTENSION)))
    }

    fn write_file(path: &Path, snapshot: &GameSnapshot) -> io::Result<()> {
        let tmp_path = path.with_extension("tt.tmp");
        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        text_format::write_snapshot(&mut writer, snapshot)?;
        writer.flush()?;
        drop(writer);
        fs::rename(&tmp_path, path)
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

impl GameStore for TextStore {
    fn load(&self, name: &str) -> Result<GameSnapshot, StoreError> {
        let not_found = || StoreError::NotFound {
            name: name.to_owned(),
        };
        let path = self.path_for(name).ok_or_else(not_found)?;
        let text = fs::read_to_string(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => not_found(),
            io::ErrorKind::InvalidData => StoreError::corrupt(name, "file is not valid UTF-8"),
            _ => StoreError::BackendUnavailable { source },
        })?;

        let snapshot =
            text_format::parse_snapshot(&text).map_err(|err| StoreError::corrupt(name, err))?;
        snapshot
            .validate()
            .map_err(|err| StoreError::corrupt(name, err))?;
        log::debug!("read {}", path.display());
        Ok(snapshot)
    }

    fn save(&mut self, name: &str, snapshot: &GameSnapshot) -> Result<(), StoreError> {
        let write_error = |source: io::Error| StoreError::WriteError {
            name: name.to_owned(),
            source,
        };
        let path = self.path_for(name).ok_or_else(|| {
            write_error(io::Error::new(
                io::ErrorKind::InvalidInput,
                "name must not be empty or contain path separators",
            ))
        })?;
        fs::create_dir_all(&self.dir).map_err(write_error)?;
        Self::write_file(&path, snapshot).map_err(write_error)?;
        log::debug!("wrote {}", path.display());
        Ok(())
    }

    fn list(&self) -> Result<Vec<SaveEntry>, StoreError> {
        let read_dir = match fs::read_dir(&self.dir) {
            Ok(read_dir) => read_dir,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(vec![]),
            Err(source) => return Err(StoreError::BackendUnavailable { source }),
        };

        let mut entries = vec![];
        for dir_entry in read_dir {
            let dir_entry = dir_entry.map_err(|source| StoreError::BackendUnavailable { source })?;
            let path = dir_entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(Self::EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                log::warn!("skipping save file with non UTF-8 name: {}", path.display());
                continue;
            };
            let modified = match dir_entry.metadata().and_then(|meta| meta.modified()) {
                Ok(modified) => modified,
                Err(err) => {
                    log::warn!("skipping {}: {err}", path.display());
                    continue;
                }
            };
            entries.push(SaveEntry {
                name: name.to_owned(),
                saved_at: DateTime::<Utc>::from(modified),
            });
        }
        SaveEntry::sort_recent_first(&mut entries);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use stackfall_engine::{Game, ShapeGenerator, ShapeKind};

    use super::*;
    use crate::test_util::scratch_dir;

    fn snapshot(kinds: &[ShapeKind], ticks: usize) -> GameSnapshot {
        let mut game = Game::new(8, ShapeGenerator::cycle(kinds.iter().copied()));
        for _ in 0..ticks {
            game.advance_tick();
        }
        game.snapshot()
    }

    fn set_mtime(store: &TextStore, name: &str, secs: u64) {
        let path = store.path_for(name).unwrap();
        let file = File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
            .unwrap();
    }

    #[test]
    fn test_save_then_load() {
        let mut store = TextStore::new(scratch_dir("text-round-trip"));
        let saved = snapshot(&[ShapeKind::L, ShapeKind::Z], 15);
        store.save("slot", &saved).unwrap();
        assert_eq!(store.load("slot").unwrap(), saved);
    }

    #[test]
    fn test_save_creates_directory_and_overwrites() {
        let dir = scratch_dir("text-overwrite").join("nested");
        let mut store = TextStore::new(&dir);
        store.save("slot", &snapshot(&[ShapeKind::I], 3)).unwrap();
        let second = snapshot(&[ShapeKind::O], 5);
        store.save("slot", &second).unwrap();
        assert_eq!(store.load("slot").unwrap(), second);
        assert_eq!(store.list().unwrap().len(), 1);
        assert!(!dir.join("slot.tt.tmp").exists());
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let store = TextStore::new(scratch_dir("text-missing"));
        assert!(matches!(
            store.load("nothing"),
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.load("../escape"),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = scratch_dir("text-corrupt");
        let store = TextStore::new(&dir);
        fs::write(dir.join("garbage.tt"), "not a saved game\n").unwrap();
        assert!(matches!(
            store.load("garbage"),
            Err(StoreError::CorruptData { .. })
        ));

        // Well formed, but the falling cells do not match the shape line.
        let mut text = Vec::new();
        let mut bad = snapshot(&[ShapeKind::T], 0);
        bad.anchor_x = 5;
        text_format::write_snapshot(&mut text, &bad).unwrap();
        fs::write(dir.join("mismatch.tt"), text).unwrap();
        let err = store.load("mismatch").unwrap_err();
        assert!(err.to_string().contains("falling cells"), "{err}");
    }

    #[test]
    fn test_load_rejects_anchor_far_outside_board() {
        let dir = scratch_dir("text-far-anchor");
        let store = TextStore::new(&dir);
        let mut bad = Game::new(4, ShapeGenerator::cycle([ShapeKind::T])).snapshot();
        bad.anchor_x = i32::MAX;
        let mut text = Vec::new();
        text_format::write_snapshot(&mut text, &bad).unwrap();
        fs::write(dir.join("far.tt"), text).unwrap();

        let err = store.load("far").unwrap_err();
        assert!(matches!(err, StoreError::CorruptData { .. }), "{err}");
    }

    #[test]
    fn test_reads_files_with_trailing_spaces() {
        let dir = scratch_dir("text-trailing");
        let store = TextStore::new(&dir);
        let saved = snapshot(&[ShapeKind::S], 2);
        let mut text = Vec::new();
        text_format::write_snapshot(&mut text, &saved).unwrap();
        let padded: String = String::from_utf8(text)
            .unwrap()
            .lines()
            .map(|line| format!("{line} \n"))
            .collect();
        fs::write(dir.join("legacy.tt"), padded).unwrap();
        assert_eq!(store.load("legacy").unwrap(), saved);
    }

    #[test]
    fn test_invalid_name_is_write_error() {
        let mut store = TextStore::new(scratch_dir("text-invalid"));
        for name in ["", "a/b", "..", "a\\b"] {
            assert!(
                matches!(
                    store.save(name, &snapshot(&[ShapeKind::J], 0)),
                    Err(StoreError::WriteError { .. })
                ),
                "{name:?}"
            );
        }
    }

    #[test]
    fn test_list_orders_by_modification_time() {
        let dir = scratch_dir("text-list");
        let mut store = TextStore::new(&dir);
        for (name, secs) in [("first", 1_000), ("second", 2_000), ("third", 3_000)] {
            store.save(name, &snapshot(&[ShapeKind::T], 1)).unwrap();
            set_mtime(&store, name, secs);
        }
        fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let entries = store.list().unwrap();
        let names: Vec<_> = entries.iter().map(|entry| entry.name.as_str()).collect();
        assert_eq!(names, ["third", "second", "first"]);
        assert!(entries[0].saved_at > entries[1].saved_at);
        assert!(entries[1].saved_at > entries[2].saved_at);
        assert_eq!(entries[2].saved_at.timestamp(), 1_000);
    }

    #[test]
    fn test_list_without_directory_is_empty() {
        let store = TextStore::new(scratch_dir("text-no-dir").join("absent"));
        assert!(store.list().unwrap().is_empty());
    }
}
