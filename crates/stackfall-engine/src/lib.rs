//! Game-state engine for a falling-block puzzle on a 16-column board.
//!
//! [`core`] holds the board and shape data structures, [`engine`] the game
//! rules and host-facing session, and [`persistence`] the contract saved-game
//! backends implement.

pub use self::{core::*, engine::*, persistence::*};

pub mod core;
pub mod engine;
pub mod persistence;
