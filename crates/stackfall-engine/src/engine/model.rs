use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{
    core::board::BoardSize,
    persistence::{GameStore, SaveEntry, StoreError},
};

use super::{
    game::{Direction, Game, MoveOutcome, TickOutcome},
    shape_generator::{ShapeGenerator, ShapeSeed},
};

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum ModelError {
    /// Load or save was requested without a store.
    #[display("no game store is configured")]
    #[from(ignore)]
    NoStore,
    /// Saving a lost game is refused.
    #[display("a lost game cannot be saved")]
    #[from(ignore)]
    GameLost,
    #[display("{_0}")]
    Store(#[error(not(source))] StoreError),
}

/// The host-facing game session.
///
/// Wraps the current [`Game`] together with the board size used for the next new
/// game and an optional [`GameStore`]. Load and save replace or read the whole
/// session; a failed load or save leaves it untouched.
///
/// Each new or loaded game gets its own shape generator, seeded from a master
/// generator. Passing a seed to [`GameModel::new`] makes the whole session
/// reproducible.
pub struct GameModel {
    game: Game,
    board_size: BoardSize,
    store: Option<Box<dyn GameStore>>,
    seeder: Pcg32,
}

impl GameModel {
    /// Starts a new game of the given size.
    #[must_use]
    pub fn new(board_size: BoardSize, seed: Option<ShapeSeed>) -> Self {
        let seed = seed.unwrap_or_else(|| rand::rng().random());
        let mut seeder = Pcg32::from_seed(seed.to_bytes());
        let game = Game::new(
            board_size.rows(),
            ShapeGenerator::with_seed(seeder.random()),
        );
        Self {
            game,
            board_size,
            store: None,
            seeder,
        }
    }

    /// Attaches the store used by load, save and list.
    #[must_use]
    pub fn with_store(mut self, store: Box<dyn GameStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    #[must_use]
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Board size the next new game is created with.
    #[must_use]
    pub fn board_size(&self) -> BoardSize {
        self.board_size
    }

    /// Changes the size used by the next [`Self::new_game`]. The current game is
    /// not affected.
    pub fn set_board_size(&mut self, board_size: BoardSize) {
        self.board_size = board_size;
    }

    /// Discards the current game and starts a fresh one.
    pub fn new_game(&mut self) {
        self.game = Game::new(self.board_size.rows(), self.next_generator());
        log::debug!("new game with {} rows", self.board_size.rows());
    }

    pub fn advance_tick(&mut self) -> TickOutcome {
        self.game.advance_tick()
    }

    pub fn soft_drop(&mut self) -> TickOutcome {
        self.game.soft_drop()
    }

    pub fn move_left(&mut self) -> MoveOutcome {
        self.game.try_move(Direction::Left)
    }

    pub fn move_right(&mut self) -> MoveOutcome {
        self.game.try_move(Direction::Right)
    }

    pub fn rotate(&mut self) -> MoveOutcome {
        self.game.try_rotate()
    }

    /// Replaces the current game with the one saved under `name`.
    ///
    /// When the loaded board has one of the named sizes, that size also becomes
    /// the size for the next new game.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NoStore`] without a store, or the store's error.
    pub fn load_game(&mut self, name: &str) -> Result<(), ModelError> {
        let store = self.store.as_ref().ok_or(ModelError::NoStore)?;
        let snapshot = store.load(name)?;
        snapshot
            .validate()
            .map_err(|err| StoreError::corrupt(name, err))?;
        let game = Game::from_snapshot(&snapshot, self.next_generator())
            .map_err(|err| StoreError::corrupt(name, err))?;

        if let Some(size) = BoardSize::from_rows(snapshot.board_size) {
            self.board_size = size;
        }
        self.game = game;
        log::info!("loaded game {name:?}");
        Ok(())
    }

    /// Saves the current game under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NoStore`] without a store, [`ModelError::GameLost`]
    /// for a lost game, or the store's error.
    pub fn save_game(&mut self, name: &str) -> Result<(), ModelError> {
        let store = self.store.as_mut().ok_or(ModelError::NoStore)?;
        if self.game.is_lost() {
            return Err(ModelError::GameLost);
        }
        store.save(name, &self.game.snapshot())?;
        log::info!("saved game {name:?}");
        Ok(())
    }

    /// Lists saved games, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NoStore`] without a store, or the store's error.
    pub fn list_games(&self) -> Result<Vec<SaveEntry>, ModelError> {
        let store = self.store.as_ref().ok_or(ModelError::NoStore)?;
        Ok(store.list()?)
    }

    fn next_generator(&mut self) -> ShapeGenerator {
        ShapeGenerator::with_seed(self.seeder.random())
    }
}
