use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

/// Spawn anchor shared by every shape kind: top (buffer) row, middle of the 16 columns.
const SPAWN_POSITION: Position = Position::new(0, 7);

/// A cell coordinate on the board.
///
/// `row` grows downward (row 0 is the spawn buffer row), `col` grows to the right.
/// Coordinates are signed so that candidate positions computed next to a wall can
/// be represented and rejected by the bounds check instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    #[must_use]
    pub const fn offset_by(self, offset: Offset) -> Self {
        Self::new(self.row + offset.row as i32, self.col + offset.col as i32)
    }
}

/// A cell offset relative to a shape's anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Offset {
    pub row: i8,
    pub col: i8,
}

impl Offset {
    #[must_use]
    pub const fn new(row: i8, col: i8) -> Self {
        Self { row, col }
    }

    /// Rotates the offset a quarter turn clockwise around the anchor.
    ///
    /// With rows growing downward, "right of the anchor" becomes "below the anchor".
    const fn rotated_clockwise(self) -> Self {
        Self::new(self.col, -self.row)
    }
}

/// The four occupied-cell offsets of one rotation state.
pub type ShapeOffsets = [Offset; 4];

/// Kind of a falling shape (tetromino).
///
/// The discriminants are the cell-type tags stored in the board and in saved games.
/// Tag `0` is reserved for "no shape".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum ShapeKind {
    T = 1,
    J = 2,
    Z = 3,
    O = 4,
    S = 5,
    L = 6,
    I = 7,
}

impl Distribution<ShapeKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ShapeKind {
        ShapeKind::ALL[rng.random_range(0..ShapeKind::LEN)]
    }
}

impl ShapeKind {
    /// Number of shape kinds (7).
    pub const LEN: usize = 7;

    /// All kinds in tag order.
    pub const ALL: [Self; Self::LEN] = [
        Self::T,
        Self::J,
        Self::Z,
        Self::O,
        Self::S,
        Self::L,
        Self::I,
    ];

    /// Returns the cell-type tag of this kind (1-7).
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Looks up a kind by its cell-type tag. Returns `None` for `0` and unknown tags.
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::T),
            2 => Some(Self::J),
            3 => Some(Self::Z),
            4 => Some(Self::O),
            5 => Some(Self::S),
            6 => Some(Self::L),
            7 => Some(Self::I),
            _ => None,
        }
    }

    const fn index(self) -> usize {
        self as usize - 1
    }

    /// Number of distinct rotation states: 1 for O, 2 for I/S/Z, 4 for T/J/L.
    #[must_use]
    pub const fn rotation_count(self) -> u8 {
        match self {
            Self::O => 1,
            Self::I | Self::S | Self::Z => 2,
            Self::T | Self::J | Self::L => 4,
        }
    }

    /// Anchor position a freshly spawned shape of this kind starts at.
    #[must_use]
    pub const fn spawn_position(self) -> Position {
        SPAWN_POSITION
    }

    /// Offsets occupied by this kind in the given rotation state.
    ///
    /// The state is taken modulo [`Self::rotation_count`].
    #[must_use]
    pub const fn offsets(self, rotation: u8) -> ShapeOffsets {
        SHAPE_ROTATIONS[self.index()][(rotation % self.rotation_count()) as usize]
    }

    /// Returns the single character representation of this kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use stackfall_engine::ShapeKind;
    ///
    /// assert_eq!(ShapeKind::I.as_char(), 'I');
    /// assert_eq!(ShapeKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::T => 'T',
            Self::J => 'J',
            Self::Z => 'Z',
            Self::O => 'O',
            Self::S => 'S',
            Self::L => 'L',
            Self::I => 'I',
        }
    }

    /// Parses a kind from its character, ignoring case.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'T' => Some(Self::T),
            'J' => Some(Self::J),
            'Z' => Some(Self::Z),
            'O' => Some(Self::O),
            'S' => Some(Self::S),
            'L' => Some(Self::L),
            'I' => Some(Self::I),
            _ => None,
        }
    }
}

/// Generates the four clockwise rotation states of a spawn orientation.
///
/// Kinds with fewer distinct states only ever index the leading entries.
const fn rotations(spawn: ShapeOffsets) -> [ShapeOffsets; 4] {
    let mut states = [spawn; 4];
    let mut i = 1;
    while i < 4 {
        let mut j = 0;
        while j < 4 {
            states[i][j] = states[i - 1][j].rotated_clockwise();
            j += 1;
        }
        i += 1;
    }
    states
}

const SHAPE_ROTATIONS: [[ShapeOffsets; 4]; ShapeKind::LEN] = {
    const fn o(row: i8, col: i8) -> Offset {
        Offset::new(row, col)
    }

    [
        // T: flat bar, stem below the anchor
        rotations([o(0, -1), o(0, 0), o(0, 1), o(1, 0)]),
        // J
        rotations([o(0, -1), o(0, 0), o(0, 1), o(1, 1)]),
        // Z
        rotations([o(0, -1), o(0, 0), o(1, 0), o(1, 1)]),
        // O
        rotations([o(0, 0), o(0, 1), o(1, 0), o(1, 1)]),
        // S
        rotations([o(0, 1), o(0, 0), o(1, 0), o(1, -1)]),
        // L
        rotations([o(0, -1), o(0, 0), o(0, 1), o(1, -1)]),
        // I
        rotations([o(0, -1), o(0, 0), o(0, 1), o(0, 2)]),
    ]
};

/// A shape on the board: kind, anchor position and rotation state.
///
/// Movement and rotation mutate the shape unconditionally. Whether the result fits
/// on the board is the engine's concern, which checks a copy before committing.
///
/// # Example
///
/// ```
/// use stackfall_engine::{Shape, ShapeKind};
///
/// let mut shape = Shape::new(ShapeKind::T);
/// let spawn = shape.position();
/// shape.move_down();
/// shape.rotate();
/// assert_eq!(shape.position().row, spawn.row + 1);
/// assert_eq!(shape.rotation(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    kind: ShapeKind,
    position: Position,
    rotation: u8,
}

impl Shape {
    /// Creates a shape at its kind's spawn position and rotation state.
    #[must_use]
    pub const fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            position: kind.spawn_position(),
            rotation: 0,
        }
    }

    /// Rebuilds a shape from persisted fields.
    ///
    /// Returns `None` if `rotation` is not one of the kind's rotation states.
    #[must_use]
    pub const fn restore(kind: ShapeKind, position: Position, rotation: u8) -> Option<Self> {
        if rotation >= kind.rotation_count() {
            return None;
        }
        Some(Self {
            kind,
            position,
            rotation,
        })
    }

    #[must_use]
    pub const fn kind(&self) -> ShapeKind {
        self.kind
    }

    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    #[must_use]
    pub const fn rotation(&self) -> u8 {
        self.rotation
    }

    #[must_use]
    pub const fn current_offsets(&self) -> ShapeOffsets {
        self.kind.offsets(self.rotation)
    }

    /// Offsets the shape would occupy after one clockwise rotation, without rotating.
    #[must_use]
    pub const fn next_rotation_offsets(&self) -> ShapeOffsets {
        self.kind.offsets(self.next_rotation())
    }

    /// Board cells covered by the shape in its current state.
    #[must_use]
    pub fn cells(&self) -> [Position; 4] {
        self.current_offsets()
            .map(|offset| self.position.offset_by(offset))
    }

    /// Board cells the shape would cover after one clockwise rotation in place.
    #[must_use]
    pub fn next_rotation_cells(&self) -> [Position; 4] {
        self.next_rotation_offsets()
            .map(|offset| self.position.offset_by(offset))
    }

    pub const fn move_left(&mut self) {
        self.position.col -= 1;
    }

    pub const fn move_right(&mut self) {
        self.position.col += 1;
    }

    pub const fn move_down(&mut self) {
        self.position.row += 1;
    }

    pub const fn rotate(&mut self) {
        self.rotation = self.next_rotation();
    }

    const fn next_rotation(&self) -> u8 {
        (self.rotation + 1) % self.kind.rotation_count()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn cell_set(cells: [Position; 4]) -> HashSet<Position> {
        cells.into_iter().collect()
    }

    #[test]
    fn test_tags_round_trip() {
        for kind in ShapeKind::ALL {
            assert_eq!(ShapeKind::from_tag(kind.tag()), Some(kind));
            assert_eq!(ShapeKind::from_char(kind.as_char()), Some(kind));
        }
        assert_eq!(ShapeKind::from_tag(0), None);
        assert_eq!(ShapeKind::from_tag(8), None);
        assert_eq!(ShapeKind::I.tag(), 7);
        assert_eq!(ShapeKind::T.tag(), 1);
        assert_eq!(ShapeKind::from_char('x'), None);
    }

    #[test]
    fn test_every_state_has_four_distinct_cells() {
        for kind in ShapeKind::ALL {
            for rotation in 0..kind.rotation_count() {
                let cells: HashSet<_> = kind.offsets(rotation).into_iter().collect();
                assert_eq!(cells.len(), 4, "{kind:?} state {rotation}");
            }
        }
    }

    #[test]
    fn test_spawn_orientation_fits_below_the_top_row() {
        for kind in ShapeKind::ALL {
            let shape = Shape::new(kind);
            for cell in shape.cells() {
                assert!(cell.row >= 0 && cell.row <= 1, "{kind:?} {cell:?}");
                assert!((0..16).contains(&cell.col), "{kind:?} {cell:?}");
            }
        }
    }

    #[test]
    fn test_rotation_wraps_after_rotation_count_steps() {
        for kind in ShapeKind::ALL {
            let mut shape = Shape::new(kind);
            let spawn_cells = cell_set(shape.cells());
            for _ in 0..kind.rotation_count() {
                shape.rotate();
            }
            assert_eq!(shape.rotation(), 0);
            assert_eq!(cell_set(shape.cells()), spawn_cells);
        }
    }

    #[test]
    fn test_next_rotation_offsets_do_not_commit() {
        let mut shape = Shape::new(ShapeKind::L);
        let preview = shape.next_rotation_offsets();
        assert_eq!(shape.rotation(), 0);
        shape.rotate();
        assert_eq!(shape.current_offsets(), preview);
    }

    #[test]
    fn test_o_shape_rotation_keeps_cells() {
        let mut shape = Shape::new(ShapeKind::O);
        let before = cell_set(shape.cells());
        assert_eq!(cell_set(shape.next_rotation_cells()), before);
        shape.rotate();
        assert_eq!(cell_set(shape.cells()), before);
    }

    #[test]
    fn test_two_state_kinds_alternate() {
        for kind in [ShapeKind::I, ShapeKind::S, ShapeKind::Z] {
            let mut shape = Shape::new(kind);
            let spawn = cell_set(shape.cells());
            shape.rotate();
            assert_ne!(cell_set(shape.cells()), spawn, "{kind:?}");
            shape.rotate();
            assert_eq!(cell_set(shape.cells()), spawn, "{kind:?}");
        }
    }

    #[test]
    fn test_i_shape_rotates_to_vertical() {
        let mut shape = Shape::new(ShapeKind::I);
        shape.move_down();
        shape.rotate();
        let cols: HashSet<_> = shape.cells().iter().map(|c| c.col).collect();
        let rows: HashSet<_> = shape.cells().iter().map(|c| c.row).collect();
        assert_eq!(cols.len(), 1);
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn test_moves_shift_anchor() {
        let mut shape = Shape::new(ShapeKind::S);
        let start = shape.position();
        shape.move_left();
        assert_eq!(shape.position(), Position::new(start.row, start.col - 1));
        shape.move_right();
        shape.move_right();
        assert_eq!(shape.position(), Position::new(start.row, start.col + 1));
        shape.move_down();
        assert_eq!(shape.position(), Position::new(start.row + 1, start.col + 1));
    }

    #[test]
    fn test_restore_rejects_unknown_rotation() {
        let position = Position::new(3, 4);
        assert!(Shape::restore(ShapeKind::O, position, 1).is_none());
        assert!(Shape::restore(ShapeKind::I, position, 2).is_none());
        let shape = Shape::restore(ShapeKind::T, position, 3).unwrap();
        assert_eq!(shape.rotation(), 3);
        assert_eq!(shape.position(), position);
    }
}
