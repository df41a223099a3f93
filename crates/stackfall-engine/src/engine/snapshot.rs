use serde::{Deserialize, Serialize};

use crate::core::{
    board::{Board, Cell, CellState},
    shape::{Position, Shape, ShapeKind},
};

use super::{game::Game, shape_generator::ShapeGenerator};

/// Wholesale copy of a game session, as exchanged with persistence backends.
///
/// The grids hold `board_size + 1` rows of 16 columns each. `cells` stores
/// [`CellState`] bytes and `cell_types` the [`ShapeKind`] tags (`0` for none).
/// The active shape is described by its kind tag, anchor and rotation state;
/// `active_shape_kind == 0` means no shape is falling. `anchor_x` is the anchor
/// row and `anchor_y` its column.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GameSnapshot {
    pub board_size: usize,
    pub elapsed_ticks: u64,
    pub active_shape_kind: u8,
    pub anchor_x: i32,
    pub anchor_y: i32,
    pub rotation_state: u8,
    pub cells: Vec<[u8; Board::WIDTH]>,
    pub cell_types: Vec<[u8; Board::WIDTH]>,
}

/// Reasons a [`GameSnapshot`] cannot be turned back into a game.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SnapshotError {
    #[display("board size {size} is outside 1..={}", Board::MAX_SIZE)]
    BoardSize { size: usize },
    #[display("{grid} grid has {found} rows, expected {expected}")]
    RowCount {
        grid: &'static str,
        expected: usize,
        found: usize,
    },
    #[display("cell ({row}, {col}) has invalid value {value}")]
    CellValue { row: usize, col: usize, value: u8 },
    #[display("cell ({row}, {col}) has invalid type {tag}")]
    CellType { row: usize, col: usize, tag: u8 },
    #[display("unknown shape kind {tag}")]
    ShapeKind { tag: u8 },
    #[display("shape {kind:?} has no rotation state {rotation}")]
    Rotation { kind: ShapeKind, rotation: u8 },
    #[display("active shape covers cells outside the board")]
    ShapeOutOfBounds,
    #[display("falling cells do not match the active shape")]
    FallingCells,
}

impl GameSnapshot {
    /// Checks that the snapshot describes a consistent game.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        self.restore_parts().map(|_| ())
    }

    fn restore_parts(&self) -> Result<(Board, Option<Shape>), SnapshotError> {
        let size = self.board_size;
        if !(1..=Board::MAX_SIZE).contains(&size) {
            return Err(SnapshotError::BoardSize { size });
        }
        check_rows("cell", size + 1, self.cells.len())?;
        check_rows("type", size + 1, self.cell_types.len())?;

        let mut board = Board::new(size);
        for (row, (values, types)) in self.cells.iter().zip(&self.cell_types).enumerate() {
            for (col, (&value, &tag)) in values.iter().zip(types).enumerate() {
                let state =
                    CellState::from_byte(value).ok_or(SnapshotError::CellValue { row, col, value })?;
                let kind = match tag {
                    0 => None,
                    _ => Some(
                        ShapeKind::from_tag(tag).ok_or(SnapshotError::CellType { row, col, tag })?,
                    ),
                };
                board.set(to_position(row, col), Cell { state, kind });
            }
        }

        let shape = self.restore_shape()?;
        let falling = board.count(CellState::Falling);
        match shape {
            Some(shape) => {
                // The anchor is always one of the shape's cells.
                if !board.contains(shape.position()) {
                    return Err(SnapshotError::ShapeOutOfBounds);
                }
                let cells = shape.cells();
                if !cells.iter().all(|pos| board.contains(*pos)) {
                    return Err(SnapshotError::ShapeOutOfBounds);
                }
                let covered = cells
                    .iter()
                    .all(|pos| board.get(*pos).state.is_falling());
                if !covered || falling != cells.len() {
                    return Err(SnapshotError::FallingCells);
                }
            }
            None if falling != 0 => return Err(SnapshotError::FallingCells),
            None => {}
        }

        Ok((board, shape))
    }

    fn restore_shape(&self) -> Result<Option<Shape>, SnapshotError> {
        if self.active_shape_kind == 0 {
            return Ok(None);
        }
        let kind = ShapeKind::from_tag(self.active_shape_kind).ok_or(SnapshotError::ShapeKind {
            tag: self.active_shape_kind,
        })?;
        let position = Position::new(self.anchor_x, self.anchor_y);
        Shape::restore(kind, position, self.rotation_state)
            .map(Some)
            .ok_or(SnapshotError::Rotation {
                kind,
                rotation: self.rotation_state,
            })
    }
}

fn check_rows(grid: &'static str, expected: usize, found: usize) -> Result<(), SnapshotError> {
    if expected == found {
        Ok(())
    } else {
        Err(SnapshotError::RowCount {
            grid,
            expected,
            found,
        })
    }
}

#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn to_position(row: usize, col: usize) -> Position {
    Position::new(row as i32, col as i32)
}

impl Game {
    /// Captures the whole session.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        let board = self.board();
        let (active_shape_kind, anchor, rotation_state) = match self.active_shape() {
            Some(shape) => (shape.kind().tag(), shape.position(), shape.rotation()),
            None => (0, Position::new(0, 0), 0),
        };
        GameSnapshot {
            board_size: board.size(),
            elapsed_ticks: self.elapsed_ticks(),
            active_shape_kind,
            anchor_x: anchor.row,
            anchor_y: anchor.col,
            rotation_state,
            cells: board
                .rows()
                .map(|row| row.cells().map(|cell| cell.state.as_byte()))
                .collect(),
            cell_types: board
                .rows()
                .map(|row| row.cells().map(Cell::kind_tag))
                .collect(),
        }
    }

    /// Rebuilds a game from a snapshot. The restored game is always
    /// [`Active`](super::game::GameState::Active); if no shape was falling, the
    /// next tick spawns one.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot is inconsistent (see
    /// [`GameSnapshot::validate`]).
    pub fn from_snapshot(
        snapshot: &GameSnapshot,
        generator: ShapeGenerator,
    ) -> Result<Self, SnapshotError> {
        let (board, shape) = snapshot.restore_parts()?;
        Ok(Self::from_parts(
            board,
            shape,
            snapshot.elapsed_ticks,
            generator,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::game::{Direction, TickOutcome};

    fn played_game() -> Game {
        let mut game = Game::new(
            8,
            ShapeGenerator::cycle([ShapeKind::T, ShapeKind::I, ShapeKind::S]),
        );
        for step in 0..40 {
            match step % 4 {
                0 => {
                    game.try_move(Direction::Left);
                }
                1 => {
                    game.try_rotate();
                }
                _ => {
                    game.advance_tick();
                }
            }
        }
        assert!(game.state().is_active());
        game
    }

    #[test]
    fn test_snapshot_round_trip() {
        let game = played_game();
        let snapshot = game.snapshot();
        assert_eq!(snapshot.cells.len(), 9);
        assert_eq!(snapshot.cell_types.len(), 9);
        assert!(snapshot.validate().is_ok());

        let restored =
            Game::from_snapshot(&snapshot, ShapeGenerator::cycle([ShapeKind::O])).unwrap();
        assert_eq!(restored.board(), game.board());
        assert_eq!(restored.active_shape(), game.active_shape());
        assert_eq!(restored.elapsed_ticks(), game.elapsed_ticks());
        assert_eq!(restored.snapshot(), snapshot);
    }

    #[test]
    fn test_snapshot_records_i_shape_fields() {
        let game = Game::new(8, ShapeGenerator::cycle([ShapeKind::I]));
        let snapshot = game.snapshot();
        assert_eq!(snapshot.board_size, 8);
        assert_eq!(snapshot.active_shape_kind, 7);
        assert_eq!((snapshot.anchor_x, snapshot.anchor_y), (0, 7));
        assert_eq!(snapshot.rotation_state, 0);
        assert_eq!(&snapshot.cells[0][6..10], &[2, 2, 2, 2]);
        assert_eq!(&snapshot.cell_types[0][6..10], &[7, 7, 7, 7]);
    }

    #[test]
    fn test_snapshot_without_active_shape() {
        let mut game = Game::new(4, ShapeGenerator::cycle([ShapeKind::O]));
        while game.try_move(Direction::Down).is_moved() {}
        assert!(game.active_shape().is_none());

        let snapshot = game.snapshot();
        assert_eq!(snapshot.active_shape_kind, 0);
        let mut restored =
            Game::from_snapshot(&snapshot, ShapeGenerator::cycle([ShapeKind::L])).unwrap();
        assert!(restored.active_shape().is_none());
        assert_eq!(
            restored.advance_tick(),
            TickOutcome::Locked { cleared_rows: 0 }
        );
        assert_eq!(restored.active_shape_kind(), Some(ShapeKind::L));
    }

    #[test]
    fn test_serde_json_round_trip() {
        let snapshot = played_game().snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let decoded: GameSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn test_validate_rejects_bad_size_and_rows() {
        let mut snapshot = played_game().snapshot();
        snapshot.board_size = 0;
        assert_eq!(
            snapshot.validate(),
            Err(SnapshotError::BoardSize { size: 0 })
        );

        let mut snapshot = played_game().snapshot();
        snapshot.cell_types.pop();
        assert_eq!(
            snapshot.validate(),
            Err(SnapshotError::RowCount {
                grid: "type",
                expected: 9,
                found: 8
            })
        );
    }

    #[test]
    fn test_validate_rejects_bad_cells() {
        let mut snapshot = played_game().snapshot();
        snapshot.cells[8][3] = 3;
        assert_eq!(
            snapshot.validate(),
            Err(SnapshotError::CellValue {
                row: 8,
                col: 3,
                value: 3
            })
        );

        let mut snapshot = played_game().snapshot();
        snapshot.cell_types[5][0] = 8;
        assert_eq!(
            snapshot.validate(),
            Err(SnapshotError::CellType {
                row: 5,
                col: 0,
                tag: 8
            })
        );
    }

    #[test]
    fn test_validate_rejects_bad_shape() {
        let base = Game::new(8, ShapeGenerator::cycle([ShapeKind::I])).snapshot();

        let mut snapshot = base.clone();
        snapshot.active_shape_kind = 9;
        assert_eq!(
            snapshot.validate(),
            Err(SnapshotError::ShapeKind { tag: 9 })
        );

        let mut snapshot = base.clone();
        snapshot.rotation_state = 2;
        assert_eq!(
            snapshot.validate(),
            Err(SnapshotError::Rotation {
                kind: ShapeKind::I,
                rotation: 2
            })
        );

        let mut snapshot = base.clone();
        snapshot.anchor_y = 14;
        assert_eq!(snapshot.validate(), Err(SnapshotError::ShapeOutOfBounds));

        let far_anchors = [
            (i32::MAX, 7),
            (i32::MIN, 7),
            (0, i32::MAX),
            (-1, 7),
            (9, 7),
        ];
        for (anchor_x, anchor_y) in far_anchors {
            let mut snapshot = base.clone();
            snapshot.anchor_x = anchor_x;
            snapshot.anchor_y = anchor_y;
            assert_eq!(
                snapshot.validate(),
                Err(SnapshotError::ShapeOutOfBounds),
                "({anchor_x}, {anchor_y})"
            );
        }

        let mut snapshot = base.clone();
        snapshot.anchor_x = 3;
        assert_eq!(snapshot.validate(), Err(SnapshotError::FallingCells));

        let mut snapshot = base;
        snapshot.active_shape_kind = 0;
        assert_eq!(snapshot.validate(), Err(SnapshotError::FallingCells));
    }
}
