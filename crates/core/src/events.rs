//! Events emitted by the turn state machine
//!
//! Presentation, audio and multiplayer collaborators consume these; none of
//! them feed back into the turn logic.

use serde::Serialize;

use crate::game_state::PlaceError;
use crate::pieces::Piece;
use crate::types::{Coord, RotateDir};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// Either piece slot changed. `None` means the slot awaits a spawn.
    PieceChanged {
        current: Option<Piece>,
        next: Option<Piece>,
    },
    PiecePlaced {
        x: i32,
        y: i32,
        piece: Piece,
    },
    /// Expected outcome of an illegal placement; nothing changed.
    PlacementRejected {
        x: i32,
        y: i32,
        reason: PlaceError,
    },
    LinesCleared {
        lines: u32,
        cells: Vec<Coord>,
    },
    ScoreChanged {
        score: u32,
    },
    MultiplierChanged {
        multiplier: u32,
    },
    LevelChanged {
        level: u32,
    },
    LivesChanged {
        lives: i32,
    },
    /// The turn countdown (re)starts with this duration.
    TurnReset {
        delay_ms: u32,
    },
    PiecesSwapped,
    PieceRotated {
        dir: RotateDir,
    },
    /// Terminal. Emitted exactly once per game.
    GameOver {
        score: u32,
    },
}

impl GameEvent {
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::PieceChanged { .. } => "piece_changed",
            GameEvent::PiecePlaced { .. } => "piece_placed",
            GameEvent::PlacementRejected { .. } => "placement_rejected",
            GameEvent::LinesCleared { .. } => "lines_cleared",
            GameEvent::ScoreChanged { .. } => "score_changed",
            GameEvent::MultiplierChanged { .. } => "multiplier_changed",
            GameEvent::LevelChanged { .. } => "level_changed",
            GameEvent::LivesChanged { .. } => "lives_changed",
            GameEvent::TurnReset { .. } => "turn_reset",
            GameEvent::PiecesSwapped => "pieces_swapped",
            GameEvent::PieceRotated { .. } => "piece_rotated",
            GameEvent::GameOver { .. } => "game_over",
        }
    }
}
