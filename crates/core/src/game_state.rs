//! Game state module - the turn state machine
//!
//! This module ties the grid, catalog and scoring together. It owns no clock
//! and no randomness: the engine tells it when a deadline elapsed and feeds it
//! catalog indices from whatever piece source is in use. Every transition
//! pushes [`GameEvent`]s into a buffer drained with [`GameState::take_events`].
//!
//! Piece slots may be empty while a spawn is in flight. The state counts
//! outstanding spawn requests so the engine knows how many more to issue
//! ([`GameState::spawns_needed`]).

use serde::Serialize;
use tracing::{debug, info};

use crate::events::GameEvent;
use crate::grid::Grid;
use crate::pieces::{CatalogError, Piece, PieceCatalog};
use crate::scoring::{apply_clear, level_for_score, turn_delay_ms};
use crate::snapshot::GameSnapshot;
use crate::types::{RotateDir, DEFAULT_COLS, DEFAULT_LIVES, DEFAULT_ROWS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Created, or started but still waiting for the first two pieces
    Initializing,
    /// A turn is running; placements and the deadline race here
    AwaitingPlacement,
    /// Lives fell below zero. Terminal.
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceError {
    /// Not in a running turn (not started, or game over)
    NotPlayable,
    /// The current piece has not arrived from the piece source yet
    NoPiece,
    /// A mask cell overlaps a filled cell or leaves the grid
    Blocked,
}

impl PlaceError {
    pub fn code(self) -> &'static str {
        match self {
            PlaceError::NotPlayable => "not_playable",
            PlaceError::NoPiece | PlaceError::Blocked => "invalid_place",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            PlaceError::NotPlayable => "game is not playable",
            PlaceError::NoPiece => "no current piece",
            PlaceError::Blocked => "piece does not fit at target",
        }
    }
}

/// Summary of a committed placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlacedTurn {
    pub lines: u32,
    pub cells_cleared: u32,
    pub score_delta: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceOutcome {
    Placed(PlacedTurn),
    Rejected(PlaceError),
}

impl PlaceOutcome {
    pub fn is_placed(&self) -> bool {
        matches!(self, PlaceOutcome::Placed(_))
    }
}

/// What happened to a catalog index handed to [`GameState::supply_piece`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupplyOutcome {
    /// Filled an empty slot
    Accepted,
    /// Would repeat the current piece as next; a fresh draw is needed
    RejectedRepeat,
    /// Nothing was waiting for a piece (late or duplicate answer); ignored
    Unexpected,
}

/// Complete turn state of one game
#[derive(Debug, Clone)]
pub struct GameState {
    grid: Grid,
    current: Option<Piece>,
    next: Option<Piece>,
    score: u32,
    level: u32,
    lives: i32,
    multiplier: u32,
    phase: Phase,
    started: bool,
    /// Spawn requests issued but not yet answered
    pending_spawns: u8,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game on an empty `cols x rows` grid
    pub fn new(cols: u8, rows: u8, lives: i32) -> Self {
        Self {
            grid: Grid::new(cols, rows),
            current: None,
            next: None,
            score: 0,
            level: 0,
            lives,
            multiplier: 1,
            phase: Phase::Initializing,
            started: false,
            pending_spawns: 0,
            events: Vec::new(),
        }
    }

    /// Begin dealing pieces. Returns false if already started.
    pub fn start(&mut self) -> bool {
        if self.started {
            return false;
        }
        info!(
            cols = self.grid.cols(),
            rows = self.grid.rows(),
            lives = self.lives,
            "starting game"
        );
        self.started = true;
        true
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Direct grid access for scenario setup
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn current(&self) -> Option<Piece> {
        self.current
    }

    pub fn next(&self) -> Option<Piece> {
        self.next
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lives(&self) -> i32 {
        self.lives
    }

    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }

    pub fn pending_spawns(&self) -> u8 {
        self.pending_spawns
    }

    /// Deadline for the current level
    pub fn turn_delay_ms(&self) -> u32 {
        turn_delay_ms(self.level)
    }

    /// Drain buffered events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    fn emit_pieces(&mut self) {
        self.emit(GameEvent::PieceChanged {
            current: self.current,
            next: self.next,
        });
    }

    fn emit_turn_reset(&mut self) {
        let delay_ms = self.turn_delay_ms();
        self.emit(GameEvent::TurnReset { delay_ms });
    }

    /// Spawn requests the engine should issue now
    pub fn spawns_needed(&self) -> usize {
        if !self.started || self.phase == Phase::GameOver {
            return 0;
        }
        let empty = self.current.is_none() as usize + self.next.is_none() as usize;
        empty.saturating_sub(self.pending_spawns as usize)
    }

    /// Record that a spawn request went out
    pub fn note_spawn_requested(&mut self) {
        self.pending_spawns = self.pending_spawns.saturating_add(1);
    }

    /// Forget all outstanding requests (their answers will never come)
    pub fn reset_pending_spawns(&mut self) {
        self.pending_spawns = 0;
    }

    /// Fill the first empty slot with a catalog index.
    ///
    /// `current` fills before `next`. A piece bound for `next` must differ from
    /// `current` (anti-repeat); a repeat consumes the request and asks for a
    /// fresh draw. The index is validated against the catalog before any state
    /// changes.
    pub fn supply_piece(&mut self, index: u8) -> Result<SupplyOutcome, CatalogError> {
        let piece = Piece::new(index)?;

        if self.phase == Phase::GameOver || self.pending_spawns == 0 {
            debug!(index, "ignoring unsolicited piece");
            return Ok(SupplyOutcome::Unexpected);
        }
        self.pending_spawns -= 1;

        match (self.current, self.next) {
            (None, _) => self.current = Some(piece),
            (Some(current), None) => {
                if PieceCatalog::len() > 1 && current.index() == index {
                    debug!(index, "redrawing repeated piece");
                    return Ok(SupplyOutcome::RejectedRepeat);
                }
                self.next = Some(piece);
            }
            (Some(_), Some(_)) => return Ok(SupplyOutcome::Unexpected),
        }

        self.emit_pieces();

        if self.phase == Phase::Initializing && self.current.is_some() && self.next.is_some() {
            self.phase = Phase::AwaitingPlacement;
            self.emit_turn_reset();
        }
        Ok(SupplyOutcome::Accepted)
    }

    /// Try to place the current piece centered on (x, y).
    ///
    /// A rejection leaves every field untouched (the deadline too).
    pub fn place(&mut self, x: i32, y: i32) -> PlaceOutcome {
        if self.phase != Phase::AwaitingPlacement {
            return PlaceOutcome::Rejected(PlaceError::NotPlayable);
        }
        let Some(piece) = self.current else {
            self.emit(GameEvent::PlacementRejected {
                x,
                y,
                reason: PlaceError::NoPiece,
            });
            return PlaceOutcome::Rejected(PlaceError::NoPiece);
        };
        if !self.grid.can_place(&piece, x, y) {
            debug!(%piece, x, y, "unable to place piece");
            self.emit(GameEvent::PlacementRejected {
                x,
                y,
                reason: PlaceError::Blocked,
            });
            return PlaceOutcome::Rejected(PlaceError::Blocked);
        }

        self.grid.place(&piece, x, y);
        self.emit(GameEvent::PiecePlaced { x, y, piece });

        let clear = self.grid.clear_lines();
        let lines = clear.lines;
        let cells_cleared = clear.cell_count();
        if !clear.is_empty() {
            self.emit(GameEvent::LinesCleared {
                lines,
                cells: clear.cells,
            });
        }

        let result = apply_clear(lines, cells_cleared, self.multiplier);
        if result.score_delta > 0 {
            self.score = self.score.saturating_add(result.score_delta);
            self.emit(GameEvent::ScoreChanged { score: self.score });
        }
        if result.multiplier != self.multiplier {
            self.multiplier = result.multiplier;
            self.emit(GameEvent::MultiplierChanged {
                multiplier: self.multiplier,
            });
        }
        let level = level_for_score(self.score);
        if level > self.level {
            info!(level, "level up");
            self.level = level;
            self.emit(GameEvent::LevelChanged { level });
        }

        // Promote next; the emptied next slot is refilled by the engine.
        self.current = self.next.take();
        self.emit_pieces();
        self.emit_turn_reset();

        PlaceOutcome::Placed(PlacedTurn {
            lines,
            cells_cleared,
            score_delta: result.score_delta,
        })
    }

    /// Exchange current and next. No score, multiplier or timer change.
    pub fn swap(&mut self) -> bool {
        if self.phase != Phase::AwaitingPlacement {
            return false;
        }
        let (Some(current), Some(next)) = (self.current, self.next) else {
            return false;
        };
        self.current = Some(next);
        self.next = Some(current);
        self.emit(GameEvent::PiecesSwapped);
        self.emit_pieces();
        true
    }

    /// Turn the current piece a quarter in `dir`
    pub fn rotate(&mut self, dir: RotateDir) -> bool {
        if self.phase != Phase::AwaitingPlacement {
            return false;
        }
        let Some(current) = self.current else {
            return false;
        };
        self.current = Some(current.rotated(dir));
        self.emit(GameEvent::PieceRotated { dir });
        self.emit_pieces();
        true
    }

    /// The turn deadline passed without a placement.
    ///
    /// Costs a life. Below zero lives the game ends; otherwise the current
    /// piece is discarded (next is kept), the multiplier resets and a new turn
    /// begins.
    pub fn expire_deadline(&mut self) -> bool {
        if self.phase != Phase::AwaitingPlacement {
            return false;
        }

        self.lives -= 1;
        info!(lives = self.lives, "could not place a piece in time");
        self.emit(GameEvent::LivesChanged { lives: self.lives });

        if self.lives < 0 {
            self.phase = Phase::GameOver;
            info!(score = self.score, "game over");
            self.emit(GameEvent::GameOver { score: self.score });
            return true;
        }

        if self.current.take().is_some() {
            self.emit_pieces();
        }
        if self.multiplier != 1 {
            self.multiplier = 1;
            self.emit(GameEvent::MultiplierChanged { multiplier: 1 });
        }
        self.emit_turn_reset();
        true
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            cols: self.grid.cols(),
            rows: self.grid.rows(),
            cells: self.grid.values().to_vec(),
            board_hash: self.grid.checksum(),
            current: self.current,
            next: self.next,
            score: self.score,
            level: self.level,
            lives: self.lives,
            multiplier: self.multiplier,
            phase: self.phase,
            pending_spawns: self.pending_spawns,
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(DEFAULT_COLS, DEFAULT_ROWS, DEFAULT_LIVES)
    }
}
