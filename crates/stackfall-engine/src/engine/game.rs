use crate::core::{
    board::{Board, Cell, CellState},
    shape::{Position, Shape, ShapeKind},
};

use super::shape_generator::ShapeGenerator;

/// Lifecycle state of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum GameState {
    /// A shape is falling and the game accepts input.
    Active,
    /// A new shape could not be spawned. Terminal.
    Lost,
}

/// Direction of a single-step move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Down,
}

/// Result of a move or rotation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum MoveOutcome {
    /// The shape moved (or rotated).
    Moved,
    /// The target cells were blocked or off the board; nothing changed.
    Blocked,
    /// A downward move was blocked, so the shape locked in place.
    Landed,
}

/// Result of advancing the game by one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum TickOutcome {
    /// The active shape fell one row.
    Advanced,
    /// The shape settled, completed rows were cleared and a new shape spawned.
    Locked { cleared_rows: usize },
    /// No new shape could be spawned; the game is lost.
    GameOver,
}

/// The game-state engine: board, active shape, tick counter and lost flag.
///
/// All operations are plain in-memory mutations. Invalid moves are reported
/// through [`MoveOutcome::Blocked`], never as errors, and the only way to reach
/// [`GameState::Lost`] is a blocked spawn.
///
/// Cells covered by the active shape are marked [`CellState::Falling`]; locked
/// blocks are [`CellState::Locked`]. Moves treat falling cells as free so that a
/// shape can move through the cells it currently occupies.
///
/// # Example
///
/// ```
/// use stackfall_engine::{Direction, Game, ShapeGenerator, ShapeKind, TickOutcome};
///
/// let mut game = Game::new(8, ShapeGenerator::cycle([ShapeKind::O]));
/// game.try_move(Direction::Left);
/// game.try_rotate();
///
/// // Let the shape fall until it settles.
/// while game.advance_tick().is_advanced() {}
/// assert!(game.state().is_active());
/// assert_eq!(game.board().count(stackfall_engine::CellState::Locked), 4);
/// ```
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    active_shape: Option<Shape>,
    elapsed_ticks: u64,
    state: GameState,
    generator: ShapeGenerator,
}

impl Game {
    /// Starts a new game on an empty board with `size` playable rows and spawns
    /// the first shape.
    ///
    /// # Panics
    ///
    /// Panics if `size` is outside `1..=Board::MAX_SIZE`.
    #[must_use]
    pub fn new(size: usize, generator: ShapeGenerator) -> Self {
        let mut game = Self::from_parts(Board::new(size), None, 0, generator);
        game.spawn_shape();
        game
    }

    pub(crate) fn from_parts(
        board: Board,
        active_shape: Option<Shape>,
        elapsed_ticks: u64,
        generator: ShapeGenerator,
    ) -> Self {
        Self {
            board,
            active_shape,
            elapsed_ticks,
            state: GameState::Active,
            generator,
        }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn active_shape(&self) -> Option<&Shape> {
        self.active_shape.as_ref()
    }

    /// Kind of the active shape, if one is falling.
    #[must_use]
    pub fn active_shape_kind(&self) -> Option<ShapeKind> {
        self.active_shape.map(|shape| shape.kind())
    }

    #[must_use]
    pub fn elapsed_ticks(&self) -> u64 {
        self.elapsed_ticks
    }

    #[must_use]
    pub fn state(&self) -> GameState {
        self.state
    }

    #[must_use]
    pub fn is_lost(&self) -> bool {
        self.state.is_lost()
    }

    /// Spawns a shape of a uniformly chosen kind.
    ///
    /// Returns `false`, and moves the game to [`GameState::Lost`], if the shape's
    /// spawn cells are not all on the board and empty.
    pub fn spawn_shape(&mut self) -> bool {
        let kind = self.generator.next_kind();
        self.spawn(kind)
    }

    /// Spawns a shape of the given kind. See [`Self::spawn_shape`].
    pub fn spawn(&mut self, kind: ShapeKind) -> bool {
        if self.state.is_lost() {
            return false;
        }

        let shape = Shape::new(kind);
        let fits = shape
            .cells()
            .into_iter()
            .all(|pos| self.board.contains(pos) && self.board.get(pos).state.is_empty());
        if !fits {
            log::debug!("spawn of {kind:?} blocked, game lost");
            self.active_shape = None;
            self.state = GameState::Lost;
            return false;
        }

        self.mark(&shape);
        self.active_shape = Some(shape);
        log::debug!("spawned {kind:?} at {:?}", shape.position());
        true
    }

    /// Moves the active shape one step.
    ///
    /// A blocked downward move locks the shape where it is and reports
    /// [`MoveOutcome::Landed`]; the shape is then no longer active. Other blocked
    /// moves change nothing.
    pub fn try_move(&mut self, direction: Direction) -> MoveOutcome {
        let Some(shape) = self.live_shape() else {
            return MoveOutcome::Blocked;
        };

        let mut candidate = shape;
        match direction {
            Direction::Left => candidate.move_left(),
            Direction::Right => candidate.move_right(),
            Direction::Down => candidate.move_down(),
        }

        if self.is_free(candidate.cells()) {
            self.relocate(&shape, candidate);
            return MoveOutcome::Moved;
        }

        if direction == Direction::Down {
            self.settle(&shape);
            return MoveOutcome::Landed;
        }
        MoveOutcome::Blocked
    }

    /// Rotates the active shape clockwise in place, without wall kicks.
    pub fn try_rotate(&mut self) -> MoveOutcome {
        let Some(shape) = self.live_shape() else {
            return MoveOutcome::Blocked;
        };
        if !self.is_free(shape.next_rotation_cells()) {
            return MoveOutcome::Blocked;
        }
        let mut rotated = shape;
        rotated.rotate();
        self.relocate(&shape, rotated);
        MoveOutcome::Moved
    }

    /// Removes every fully locked row by shifting the rows above it down.
    ///
    /// Rows are visited once each, top to bottom. A shift only rewrites rows at or
    /// above the current index, so rows below it are still checked against their
    /// original contents and several complete rows clear in a single call.
    ///
    /// Returns the number of rows cleared.
    pub fn clear_completed_rows(&mut self) -> usize {
        let mut cleared = 0;
        for row in 0..self.board.height() {
            if self.board.is_row_locked(row) {
                self.board.shift_rows_down(row);
                cleared += 1;
            }
        }
        if cleared > 0 {
            log::debug!("cleared {cleared} row(s)");
        }
        cleared
    }

    /// Advances the game clock by one tick and lets the active shape fall.
    ///
    /// When the shape cannot fall it settles, completed rows are cleared and a new
    /// shape spawns. A lost game does not advance.
    pub fn advance_tick(&mut self) -> TickOutcome {
        if self.state.is_lost() {
            return TickOutcome::GameOver;
        }
        self.elapsed_ticks += 1;
        self.fall_or_settle()
    }

    /// Same step as [`Self::advance_tick`] without advancing the clock.
    pub fn soft_drop(&mut self) -> TickOutcome {
        if self.state.is_lost() {
            return TickOutcome::GameOver;
        }
        self.fall_or_settle()
    }

    fn fall_or_settle(&mut self) -> TickOutcome {
        if self.try_move(Direction::Down).is_moved() {
            return TickOutcome::Advanced;
        }

        let cleared_rows = self.clear_completed_rows();
        if self.spawn_shape() {
            TickOutcome::Locked { cleared_rows }
        } else {
            TickOutcome::GameOver
        }
    }

    fn live_shape(&self) -> Option<Shape> {
        if self.state.is_lost() {
            return None;
        }
        self.active_shape
    }

    fn is_free(&self, cells: [Position; 4]) -> bool {
        cells.into_iter().all(|pos| {
            self.board.contains(pos)
                && matches!(
                    self.board.get(pos).state,
                    CellState::Empty | CellState::Falling
                )
        })
    }

    fn relocate(&mut self, from: &Shape, to: Shape) {
        for pos in from.cells() {
            self.board.set(pos, Cell::EMPTY);
        }
        self.mark(&to);
        self.active_shape = Some(to);
    }

    fn mark(&mut self, shape: &Shape) {
        for pos in shape.cells() {
            self.board.set(pos, Cell::falling(shape.kind()));
        }
    }

    fn settle(&mut self, shape: &Shape) {
        for pos in shape.cells() {
            self.board.lock(pos);
        }
        self.active_shape = None;
        log::debug!("{:?} locked at {:?}", shape.kind(), shape.position());
    }
}
