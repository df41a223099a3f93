use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stackfall_engine::{Board, GameSnapshot, GameStore, SaveEntry, StoreError};

/// One saved game. `name` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
struct GameRecord {
    name: String,
    table_size: usize,
    saved_at: DateTime<Utc>,
    shape_kind: u8,
    shape_x: i32,
    shape_y: i32,
    shape_rotation: u8,
    elapsed_ticks: u64,
}

/// One board cell of a saved game; `x` is the row and `y` the column.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
struct FieldRecord {
    id: u64,
    game: String,
    x: usize,
    y: usize,
    value: u8,
    #[serde(rename = "type")]
    kind: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
struct Tables {
    games: Vec<GameRecord>,
    fields: Vec<FieldRecord>,
    next_field_id: u64,
}

impl Tables {
    fn game(&self, name: &str) -> Option<&GameRecord> {
        self.games.iter().find(|game| game.name == name)
    }

    fn remove(&mut self, name: &str) {
        self.games.retain(|game| game.name != name);
        self.fields.retain(|field| field.game != name);
    }

    fn insert(&mut self, name: &str, snapshot: &GameSnapshot, saved_at: DateTime<Utc>) {
        self.games.push(GameRecord {
            name: name.to_owned(),
            table_size: snapshot.board_size,
            saved_at,
            shape_kind: snapshot.active_shape_kind,
            shape_x: snapshot.anchor_x,
            shape_y: snapshot.anchor_y,
            shape_rotation: snapshot.rotation_state,
            elapsed_ticks: snapshot.elapsed_ticks,
        });

        let cells = snapshot.cells.iter().zip(&snapshot.cell_types).enumerate();
        for (x, (values, kinds)) in cells {
            for (y, (&value, &kind)) in values.iter().zip(kinds).enumerate() {
                self.fields.push(FieldRecord {
                    id: self.next_field_id,
                    game: name.to_owned(),
                    x,
                    y,
                    value,
                    kind,
                });
                self.next_field_id += 1;
            }
        }
    }

    fn snapshot(&self, game: &GameRecord) -> Result<GameSnapshot, String> {
        let size = game.table_size;
        if !(1..=Board::MAX_SIZE).contains(&size) {
            return Err(format!(
                "table size {size} is outside 1..={}",
                Board::MAX_SIZE
            ));
        }

        let mut cells = vec![[0; Board::WIDTH]; size + 1];
        let mut cell_types = vec![[0; Board::WIDTH]; size + 1];
        for field in self.fields.iter().filter(|field| field.game == game.name) {
            if field.x > size || field.y >= Board::WIDTH {
                return Err(format!(
                    "field {} at ({}, {}) is outside the board",
                    field.id, field.x, field.y
                ));
            }
            cells[field.x][field.y] = field.value;
            cell_types[field.x][field.y] = field.kind;
        }

        Ok(GameSnapshot {
            board_size: size,
            elapsed_ticks: game.elapsed_ticks,
            active_shape_kind: game.shape_kind,
            anchor_x: game.shape_x,
            anchor_y: game.shape_y,
            rotation_state: game.shape_rotation,
            cells,
            cell_types,
        })
    }
}

/// Saved games as relational records: a `games` table with one row per game and
/// a `fields` table with one row per board cell.
///
/// The tables live in memory and, for a store opened on a file, are written
/// back as a whole JSON document after every save. A save that cannot be
/// written leaves the tables as they were.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: Option<PathBuf>,
    tables: Tables,
}

impl RecordStore {
    /// Creates an empty store that is never written to disk.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            path: None,
            tables: Tables::default(),
        }
    }

    /// Opens the database file at `path`. A missing file is an empty database;
    /// it is created on the first save.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::BackendUnavailable`] if the file exists but cannot
    /// be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let tables = match File::open(&path) {
            Ok(file) => serde_json::from_reader(BufReader::new(file))
                .map_err(|err| StoreError::BackendUnavailable { source: err.into() })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => Tables::default(),
            Err(source) => return Err(StoreError::BackendUnavailable { source }),
        };
        log::debug!("opened game database {}", path.display());
        Ok(Self {
            path: Some(path),
            tables,
        })
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Like [`GameStore::save`], with an explicit save time.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::WriteError`] if the database file cannot be written.
    pub fn save_with_timestamp(
        &mut self,
        name: &str,
        snapshot: &GameSnapshot,
        saved_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let previous = self.tables.clone();
        self.tables.remove(name);
        self.tables.insert(name, snapshot, saved_at);

        if let Err(source) = self.persist() {
            self.tables = previous;
            return Err(StoreError::WriteError {
                name: name.to_owned(),
                source,
            });
        }
        Ok(())
    }

    fn persist(&self) -> io::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut tmp_path = path.clone().into_os_string();
        tmp_path.push(".tmp");
        let tmp_path = PathBuf::from(tmp_path);

        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.tables)?;
        writer.flush()?;
        drop(writer);
        fs::rename(&tmp_path, path)
    }
}

impl GameStore for RecordStore {
    fn load(&self, name: &str) -> Result<GameSnapshot, StoreError> {
        let game = self.tables.game(name).ok_or_else(|| StoreError::NotFound {
            name: name.to_owned(),
        })?;
        let snapshot = self
            .tables
            .snapshot(game)
            .map_err(|reason| StoreError::corrupt(name, reason))?;
        snapshot
            .validate()
            .map_err(|err| StoreError::corrupt(name, err))?;
        Ok(snapshot)
    }

    fn save(&mut self, name: &str, snapshot: &GameSnapshot) -> Result<(), StoreError> {
        self.save_with_timestamp(name, snapshot, Utc::now())
    }

    fn list(&self) -> Result<Vec<SaveEntry>, StoreError> {
        let mut entries: Vec<_> = self
            .tables
            .games
            .iter()
            .map(|game| SaveEntry {
                name: game.name.clone(),
                saved_at: game.saved_at,
            })
            .collect();
        SaveEntry::sort_recent_first(&mut entries);
        Ok(entries)
    }
}
