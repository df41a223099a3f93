//! Game engine logic and state management.
//!
//! This module builds the game rules on top of the core data structures:
//!
//! - [`Game`] - Board, falling shape, tick counter and lost flag
//! - [`ShapeGenerator`] - Uniform (seeded) or scripted choice of shape kinds
//! - [`GameSnapshot`] - Wholesale copy of a session for persistence
//! - [`GameModel`] - Host-facing session with board-size setting and an optional store
//!
//! # Game Flow
//!
//! 1. A new [`Game`] spawns its first shape at the top of an empty board
//! 2. The host moves and rotates the shape, and advances ticks on a timer
//! 3. A tick that cannot move the shape down locks it, clears completed rows
//!    and spawns the next shape
//! 4. The game is lost as soon as a shape cannot spawn
//!
//! Nothing in the engine fails with an error: blocked moves are reported through
//! [`MoveOutcome`] and the end of the game through [`TickOutcome::GameOver`].
//!
//! # Example
//!
//! ```
//! use stackfall_engine::{BoardSize, GameModel, TickOutcome};
//!
//! let mut model = GameModel::new(BoardSize::Small, None);
//! model.move_left();
//! model.rotate();
//!
//! loop {
//!     match model.advance_tick() {
//!         TickOutcome::Advanced => {}
//!         TickOutcome::Locked { cleared_rows } => println!("cleared {cleared_rows} rows"),
//!         TickOutcome::GameOver => break,
//!     }
//! }
//! assert!(model.game().is_lost());
//! ```

pub use self::{game::*, model::*, shape_generator::*, snapshot::*};

pub(crate) mod game;
mod model;
pub(crate) mod shape_generator;
pub(crate) mod snapshot;
