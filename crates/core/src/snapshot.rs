use serde::Serialize;

use crate::game_state::Phase;
use crate::pieces::Piece;

/// Point-in-time copy of a game, safe to hand to other tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    pub cols: u8,
    pub rows: u8,
    /// Row-major cell values
    pub cells: Vec<u8>,
    pub board_hash: u64,
    pub current: Option<Piece>,
    pub next: Option<Piece>,
    pub score: u32,
    pub level: u32,
    pub lives: i32,
    pub multiplier: u32,
    pub phase: Phase,
    pub pending_spawns: u8,
}

impl GameSnapshot {
    /// Cell value at (x, y), `None` outside the board
    pub fn cell(&self, x: i32, y: i32) -> Option<u8> {
        if x < 0 || y < 0 || x >= self.cols as i32 || y >= self.rows as i32 {
            return None;
        }
        self.cells
            .get(y as usize * self.cols as usize + x as usize)
            .copied()
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }
}
