//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! Everything here is plain data, usable from the turn logic, the engine actor,
//! the multiplayer adapter and the runner alike.
//!
//! # Grid Dimensions
//!
//! The classic board is a 5x5 grid. Dimensions are configurable per game; the
//! constants below are only defaults.
//!
//! - **Columns**: x in `0..cols` (left to right)
//! - **Rows**: y in `0..rows` (top to bottom)
//!
//! # Turn Timing
//!
//! Each turn has a deadline. Its length shrinks with the level:
//!
//! | Level | Delay |
//! |-------|-------|
//! | 0 | 12000ms |
//! | 1 | 11500ms |
//! | 10 | 7000ms |
//! | 19+ | 2500ms (floor) |
//!
//! # Examples
//!
//! ```
//! use gridfall_types::{GameCommand, RotateDir, DEFAULT_COLS, DEFAULT_ROWS};
//!
//! assert_eq!(GameCommand::parse("place 2 3"), Some(GameCommand::Place { x: 2, y: 3 }));
//! assert_eq!(GameCommand::parse("rotate ccw"), Some(GameCommand::Rotate(RotateDir::CounterClockwise)));
//! assert_eq!(RotateDir::parse("cw"), Some(RotateDir::Clockwise));
//!
//! assert_eq!(DEFAULT_COLS, 5);
//! assert_eq!(DEFAULT_ROWS, 5);
//! ```

use serde::Serialize;

/// Default board width in cells
pub const DEFAULT_COLS: u8 = 5;

/// Default board height in cells
pub const DEFAULT_ROWS: u8 = 5;

/// Lives at the start of a game
pub const DEFAULT_LIVES: i32 = 3;

/// Number of entries in the piece catalog.
///
/// Local and remote sides must agree on this for the shared piece sequence.
pub const PIECE_COUNT: u8 = 15;

/// Largest supported (odd) mask edge length
pub const MAX_MASK_SIZE: u8 = 5;

/// Value returned for any cell query outside the grid.
///
/// Never 0 and never a valid piece value, so placement checks fail closed.
pub const OUT_OF_BOUNDS: u8 = u8::MAX;

/// Points per cleared cell, per cleared line, per multiplier step
pub const POINTS_PER_CELL: u32 = 10;

/// Score needed per level
pub const POINTS_PER_LEVEL: u32 = 1000;

/// Turn deadline at level 0
pub const BASE_TURN_DELAY_MS: u32 = 12_000;

/// Turn deadline reduction per level
pub const TURN_DELAY_STEP_MS: u32 = 500;

/// Shortest turn deadline
pub const MIN_TURN_DELAY_MS: u32 = 2_500;

/// A cell coordinate: `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Quarter-turn direction for rotating the current piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RotateDir {
    Clockwise,
    CounterClockwise,
}

impl RotateDir {
    /// Parse direction from string (case-insensitive)
    ///
    /// Accepts "cw" | "right" | "clockwise" and "ccw" | "left" | "counterclockwise".
    ///
    /// # Examples
    ///
    /// ```
    /// use gridfall_types::RotateDir;
    ///
    /// assert_eq!(RotateDir::parse("Right"), Some(RotateDir::Clockwise));
    /// assert_eq!(RotateDir::parse("left"), Some(RotateDir::CounterClockwise));
    /// assert_eq!(RotateDir::parse("up"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cw" | "right" | "clockwise" => Some(RotateDir::Clockwise),
            "ccw" | "left" | "counterclockwise" => Some(RotateDir::CounterClockwise),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RotateDir::Clockwise => "cw",
            RotateDir::CounterClockwise => "ccw",
        }
    }
}

/// Commands accepted by the game engine
///
/// These come from whatever input collaborator drives the game: a keyboard
/// mapper, a test, or the line-driven runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameCommand {
    /// Place the current piece centered on the given cell
    Place { x: i32, y: i32 },
    /// Exchange current and next piece
    Swap,
    /// Rotate the current piece a quarter turn
    Rotate(RotateDir),
    /// Begin the game (deals the first pieces and arms the timer)
    Start,
    /// End the game instance; cancels the timer
    Stop,
}

impl GameCommand {
    /// Parse a whitespace separated command line
    ///
    /// Grammar: `place <x> <y>`, `swap`, `rotate [cw|ccw]`, `start`, `stop`.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let verb = parts.next()?.to_lowercase();
        let command = match verb.as_str() {
            "place" => {
                let x = parts.next()?.parse().ok()?;
                let y = parts.next()?.parse().ok()?;
                GameCommand::Place { x, y }
            }
            "swap" => GameCommand::Swap,
            "rotate" => match parts.next() {
                Some(dir) => GameCommand::Rotate(RotateDir::parse(dir)?),
                None => GameCommand::Rotate(RotateDir::Clockwise),
            },
            "start" => GameCommand::Start,
            "stop" => GameCommand::Stop,
            _ => return None,
        };

        if parts.next().is_some() {
            return None;
        }
        Some(command)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameCommand::Place { .. } => "place",
            GameCommand::Swap => "swap",
            GameCommand::Rotate(_) => "rotate",
            GameCommand::Start => "start",
            GameCommand::Stop => "stop",
        }
    }
}
