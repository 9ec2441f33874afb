//! Grid module - the game board
//!
//! A `cols x rows` matrix of cell values stored as a flat row-major vector.
//! 0 is empty, `1..=K` is the value of the piece that filled the cell.
//! Coordinates: (x, y) where x is the column and y the row.
//!
//! Pieces are placed center-anchored: the middle cell of the mask lands on the
//! target coordinate.

use std::hash::Hasher;

use crate::pieces::Piece;
use crate::types::{Coord, OUT_OF_BOUNDS};

/// Stable 64-bit FNV-1a hasher for grid checksums.
///
/// `DefaultHasher` output is not guaranteed stable across Rust versions.
#[derive(Debug, Clone)]
pub(crate) struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    pub(crate) fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

/// Result of a line-clear scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineClear {
    /// Complete rows plus complete columns
    pub lines: u32,
    /// Distinct cleared cells, sorted by (x, y)
    pub cells: Vec<Coord>,
}

impl LineClear {
    pub fn cell_count(&self) -> u32 {
        self.cells.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.lines == 0
    }
}

/// The game board
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    cols: u8,
    rows: u8,
    /// Flat array of cells, row-major order (y * cols + x)
    cells: Vec<u8>,
}

impl Grid {
    /// Create a new empty grid
    pub fn new(cols: u8, rows: u8) -> Self {
        Self {
            cols,
            rows,
            cells: vec![0; cols as usize * rows as usize],
        }
    }

    #[inline(always)]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.cols as i32 || y >= self.rows as i32 {
            return None;
        }
        Some(y as usize * self.cols as usize + x as usize)
    }

    pub fn cols(&self) -> u8 {
        self.cols
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    /// Cell value at (x, y); `OUT_OF_BOUNDS` outside the grid
    pub fn get(&self, x: i32, y: i32) -> u8 {
        match self.index(x, y) {
            Some(idx) => self.cells[idx],
            None => OUT_OF_BOUNDS,
        }
    }

    /// Overwrite one cell. No legality checks.
    /// Returns false (and writes nothing) when out of bounds.
    pub fn set(&mut self, x: i32, y: i32, value: u8) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.cells[idx] = value;
                true
            }
            None => false,
        }
    }

    pub fn is_empty_at(&self, x: i32, y: i32) -> bool {
        self.get(x, y) == 0
    }

    /// Whether every filled mask cell lands on an empty in-bounds cell
    pub fn can_place(&self, piece: &Piece, x: i32, y: i32) -> bool {
        let mask = piece.mask();
        let offset = mask.center();
        mask.filled()
            .iter()
            .all(|&(bx, by)| self.get(x + bx - offset, y + by - offset) == 0)
    }

    /// Write the piece value into every filled mask cell.
    ///
    /// Callers check `can_place` first; this does not re-validate.
    pub fn place(&mut self, piece: &Piece, x: i32, y: i32) {
        let mask = piece.mask();
        let offset = mask.center();
        let value = piece.value();
        for &(bx, by) in mask.filled().iter() {
            self.set(x + bx - offset, y + by - offset, value);
        }
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: i32) -> bool {
        if y < 0 || y >= self.rows as i32 {
            return false;
        }
        let start = y as usize * self.cols as usize;
        self.cells[start..start + self.cols as usize]
            .iter()
            .all(|&cell| cell != 0)
    }

    /// Check if a column is completely filled
    pub fn is_col_full(&self, x: i32) -> bool {
        if x < 0 || x >= self.cols as i32 {
            return false;
        }
        (0..self.rows as i32).all(|y| self.get(x, y) != 0)
    }

    /// Find every complete row and column, zero their cells and report them.
    ///
    /// Both scans run against the grid as it was before any clearing, so a
    /// cell on a full row and a full column counts once.
    pub fn clear_lines(&mut self) -> LineClear {
        let cols = self.cols as i32;
        let rows = self.rows as i32;
        let mut marked = vec![false; self.cells.len()];
        let mut lines = 0u32;

        for y in 0..rows {
            if self.is_row_full(y) {
                lines += 1;
                for x in 0..cols {
                    marked[y as usize * cols as usize + x as usize] = true;
                }
            }
        }
        for x in 0..cols {
            if self.is_col_full(x) {
                lines += 1;
                for y in 0..rows {
                    marked[y as usize * cols as usize + x as usize] = true;
                }
            }
        }

        let mut cells = Vec::new();
        for x in 0..cols {
            for y in 0..rows {
                let idx = y as usize * cols as usize + x as usize;
                if marked[idx] {
                    self.cells[idx] = 0;
                    cells.push(Coord::new(x, y));
                }
            }
        }

        LineClear { lines, cells }
    }

    /// Flat row-major copy of the cells (x varies fastest)
    pub fn values(&self) -> &[u8] {
        &self.cells
    }

    /// Stable checksum over dimensions and contents
    pub fn checksum(&self) -> u64 {
        let mut hasher = Fnv1aHasher::new();
        hasher.write(&[self.cols, self.rows]);
        hasher.write(&self.cells);
        hasher.finish()
    }

    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell != 0).count()
    }

    /// Empty every cell
    pub fn clear(&mut self) {
        self.cells.fill(0);
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(crate::types::DEFAULT_COLS, crate::types::DEFAULT_ROWS)
    }
}
