use std::fmt;

use serde::{Deserialize, Serialize};

use super::shape::{Position, ShapeKind};

/// Occupancy of a single board cell.
///
/// The discriminants are the byte values used by saved games.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant)]
#[repr(u8)]
pub enum CellState {
    /// Nothing here.
    #[default]
    Empty = 0,
    /// Permanently settled block.
    Locked = 1,
    /// Covered by the active (falling) shape.
    Falling = 2,
}

impl CellState {
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn from_byte(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Empty),
            1 => Some(Self::Locked),
            2 => Some(Self::Falling),
            _ => None,
        }
    }
}

/// A single cell: occupancy plus the kind of shape that put a block there.
///
/// The kind is kept when a falling cell locks, so that settled blocks keep their
/// colour. It is `None` for empty cells.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub state: CellState,
    pub kind: Option<ShapeKind>,
}

impl Cell {
    pub const EMPTY: Self = Self {
        state: CellState::Empty,
        kind: None,
    };

    #[must_use]
    pub const fn falling(kind: ShapeKind) -> Self {
        Self {
            state: CellState::Falling,
            kind: Some(kind),
        }
    }

    #[must_use]
    pub const fn locked(kind: ShapeKind) -> Self {
        Self {
            state: CellState::Locked,
            kind: Some(kind),
        }
    }

    /// Returns the cell-type tag (`0` when no kind is recorded).
    #[must_use]
    pub const fn kind_tag(self) -> u8 {
        match self.kind {
            Some(kind) => kind.tag(),
            None => 0,
        }
    }

    fn as_char(self) -> char {
        match (self.state, self.kind) {
            (CellState::Empty, _) => '.',
            (CellState::Locked, Some(kind)) => kind.as_char().to_ascii_lowercase(),
            (CellState::Falling, Some(kind)) => kind.as_char(),
            (CellState::Locked, None) => '#',
            (CellState::Falling, None) => '?',
        }
    }
}

/// One row of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardRow {
    cells: [Cell; Board::WIDTH],
}

impl BoardRow {
    pub const EMPTY: Self = Self {
        cells: [Cell::EMPTY; Board::WIDTH],
    };

    #[must_use]
    pub fn cells(&self) -> &[Cell; Board::WIDTH] {
        &self.cells
    }

    /// Returns `true` when every cell of the row is locked, with no gaps.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.cells.iter().all(|cell| cell.state.is_locked())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|cell| cell.state.is_empty())
    }
}

/// Named board configurations.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum BoardSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl BoardSize {
    pub const ALL: [Self; 3] = [Self::Small, Self::Medium, Self::Large];

    /// Number of playable rows.
    #[must_use]
    pub const fn rows(self) -> usize {
        match self {
            Self::Small => 4,
            Self::Medium => 8,
            Self::Large => 12,
        }
    }

    /// Returns the named size with exactly `rows` playable rows, if any.
    #[must_use]
    pub fn from_rows(rows: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|size| size.rows() == rows)
    }
}

/// The playing grid: `size + 1` rows of 16 cells.
///
/// Row 0 is the buffer row shapes spawn into; rows `1..=size` are the playable
/// rows. The board knows nothing about the active shape. Keeping the cells marked
/// [`CellState::Falling`] consistent with it is the engine's job.
///
/// Cell accessors take positions that must be inside the board (see
/// [`Board::contains`]); an out-of-range position is a programming error and
/// panics.
///
/// # Example
///
/// ```
/// use stackfall_engine::{Board, Cell, Position, ShapeKind};
///
/// let mut board = Board::new(8);
/// assert_eq!(board.height(), 9);
///
/// let pos = Position::new(8, 0);
/// board.set(pos, Cell::locked(ShapeKind::O));
/// assert!(board.get(pos).state.is_locked());
/// assert!(!board.contains(Position::new(9, 0)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    size: usize,
    rows: Vec<BoardRow>,
}

impl Board {
    /// Number of columns.
    pub const WIDTH: usize = 16;
    /// Largest supported number of playable rows.
    pub const MAX_SIZE: usize = 64;

    /// Creates an empty board with `size` playable rows plus the buffer row.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero or larger than [`Board::MAX_SIZE`].
    #[must_use]
    pub fn new(size: usize) -> Self {
        assert!(
            (1..=Self::MAX_SIZE).contains(&size),
            "board size must be within 1..={}, got {size}",
            Self::MAX_SIZE
        );
        Self {
            size,
            rows: vec![BoardRow::EMPTY; size + 1],
        }
    }

    /// Number of playable rows (the board has one more row than this).
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Total number of rows including the buffer row.
    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> impl ExactSizeIterator<Item = &BoardRow> {
        self.rows.iter()
    }

    #[must_use]
    pub fn row(&self, row: usize) -> &BoardRow {
        &self.rows[row]
    }

    /// Whether `pos` lies on the board (`0 <= row <= size`, `0 <= col < 16`).
    #[must_use]
    pub fn contains(&self, pos: Position) -> bool {
        usize::try_from(pos.row).is_ok_and(|row| row <= self.size)
            && usize::try_from(pos.col).is_ok_and(|col| col < Self::WIDTH)
    }

    #[must_use]
    pub fn get(&self, pos: Position) -> Cell {
        let (row, col) = self.index(pos);
        self.rows[row].cells[col]
    }

    pub fn set(&mut self, pos: Position, cell: Cell) {
        let (row, col) = self.index(pos);
        self.rows[row].cells[col] = cell;
    }

    /// Marks the cell as locked, keeping its kind.
    pub fn lock(&mut self, pos: Position) {
        let (row, col) = self.index(pos);
        self.rows[row].cells[col].state = CellState::Locked;
    }

    #[must_use]
    pub fn is_row_locked(&self, row: usize) -> bool {
        self.rows[row].is_locked()
    }

    /// Copies every row above `from_row` one row down, overwriting `from_row`.
    ///
    /// Row `j` receives row `j - 1` for `j` from `from_row` down to 1. Row 0 has no
    /// row above it and keeps its content, so afterwards rows 0 and 1 are equal.
    pub fn shift_rows_down(&mut self, from_row: usize) {
        for row in (1..=from_row).rev() {
            self.rows[row] = self.rows[row - 1];
        }
    }

    /// Iterates over every cell position of the board in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let height = self.height();
        (0..height).flat_map(|row| (0..Self::WIDTH).map(move |col| to_position(row, col)))
    }

    /// Counts cells in the given state.
    #[must_use]
    pub fn count(&self, state: CellState) -> usize {
        self.rows
            .iter()
            .flat_map(|row| row.cells.iter())
            .filter(|cell| cell.state == state)
            .count()
    }

    fn index(&self, pos: Position) -> (usize, usize) {
        assert!(self.contains(pos), "position {pos:?} is outside the board");
        // `contains` guarantees both coordinates are non-negative and in range.
        (pos.row.unsigned_abs() as usize, pos.col.unsigned_abs() as usize)
    }
}

#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn to_position(row: usize, col: usize) -> Position {
    Position::new(row as i32, col as i32)
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            let line: String = row.cells.iter().map(|cell| cell.as_char()).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
