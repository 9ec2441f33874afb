//! Engine configuration from environment variables

use std::env;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::{DEFAULT_COLS, DEFAULT_LIVES, DEFAULT_ROWS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub cols: u8,
    pub rows: u8,
    pub lives: i32,
    /// Seed for local piece draws
    pub seed: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cols: DEFAULT_COLS,
            rows: DEFAULT_ROWS,
            lives: DEFAULT_LIVES,
            seed: 1,
        }
    }
}

impl EngineConfig {
    /// Read `GRIDFALL_COLS`, `GRIDFALL_ROWS`, `GRIDFALL_LIVES` and `GRIDFALL_SEED`.
    ///
    /// Missing or unparsable values fall back to the classic 5x5 board with 3
    /// lives. Without a seed, one is derived from the clock.
    pub fn from_env() -> Self {
        let cols = env::var("GRIDFALL_COLS")
            .ok()
            .and_then(|s| s.trim().parse::<u8>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_COLS);
        let rows = env::var("GRIDFALL_ROWS")
            .ok()
            .and_then(|s| s.trim().parse::<u8>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_ROWS);
        let lives = env::var("GRIDFALL_LIVES")
            .ok()
            .and_then(|s| s.trim().parse::<i32>().ok())
            .filter(|&n| n >= 0)
            .unwrap_or(DEFAULT_LIVES);
        let seed = env::var("GRIDFALL_SEED")
            .ok()
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or_else(clock_seed);

        Self {
            cols,
            rows,
            lives,
            seed,
        }
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }
}

/// Seed derived from the wall clock
pub fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(1)
}
