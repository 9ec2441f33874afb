//! Core game logic - pure, deterministic, and testable
//!
//! Everything needed to play one game of gridfall without a clock, a socket
//! or a terminal. The async engine drives [`GameState`] from outside.
//!
//! # Module Structure
//!
//! - [`pieces`]: the fixed catalog of 15 square masks and quarter-turn rotation
//! - [`grid`]: the `cols x rows` board, center-anchored placement, line clearing
//! - [`scoring`]: score, multiplier, level and turn-delay rules
//! - [`game_state`]: the turn state machine and its spawn slots
//! - [`events`]: what the state machine reports to collaborators
//! - [`rng`]: seeded piece draws for single-player games
//! - [`snapshot`]: owned copies of the state for other tasks
//!
//! # Rules
//!
//! - A piece fits when every filled mask cell lands inside the grid on an
//!   empty cell. Placement either commits fully or changes nothing.
//! - After a placement every full row and every full column is cleared at
//!   once; a cell on a full row and a full column is counted once.
//! - A clear scores `lines * cells * 10 * multiplier` and bumps the
//!   multiplier. A turn without a clear resets it to 1.
//! - Missing the turn deadline costs a life. The game ends below zero lives.
//!
//! # Example
//!
//! ```
//! use gridfall_core::{GameState, SupplyOutcome};
//!
//! let mut game = GameState::default();
//! game.start();
//! for index in [3, 4] {
//!     game.note_spawn_requested();
//!     assert_eq!(game.supply_piece(index), Ok(SupplyOutcome::Accepted));
//! }
//!
//! // The dot fits anywhere on an empty board.
//! assert!(game.place(2, 2).is_placed());
//! assert_eq!(game.grid().get(2, 2), 4);
//! ```

pub mod events;
pub mod game_state;
pub mod grid;
pub mod pieces;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use gridfall_types as types;

// Re-export commonly used types for convenience
pub use events::GameEvent;
pub use game_state::{GameState, Phase, PlaceError, PlaceOutcome, PlacedTurn, SupplyOutcome};
pub use grid::{Grid, LineClear};
pub use pieces::{CatalogError, Mask, Piece, PieceCatalog};
pub use rng::SimpleRng;
pub use scoring::ScoreResult;
pub use snapshot::GameSnapshot;
