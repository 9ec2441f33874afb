//! Pieces module - piece catalog and mask rotation
//!
//! Every piece is an odd-sized square occupancy mask. The catalog holds the
//! canonical (unrotated) masks; rotation always produces a new mask and never
//! touches the catalog.

use std::fmt;

use arrayvec::ArrayVec;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::types::{RotateDir, MAX_MASK_SIZE, PIECE_COUNT};

/// Upper bound on filled cells of any mask
pub const MAX_MASK_CELLS: usize = (MAX_MASK_SIZE as usize) * (MAX_MASK_SIZE as usize);

/// Offset of a filled cell from the mask's top-left corner, as `(bx, by)`
pub type MaskOffset = (i32, i32);

/// Filled cells of a mask, stack-only
pub type MaskCells = ArrayVec<MaskOffset, MAX_MASK_CELLS>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("piece index {index} is outside the catalog (0..{count})")]
    OutOfRange { index: u8, count: u8 },
}

/// N x N occupancy mask (N odd, at most 5), stored as a row-major bitset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mask {
    size: u8,
    bits: u32,
}

impl Mask {
    /// Build a mask from visual rows (top row first, 1 = filled)
    pub const fn from_rows<const N: usize>(rows: [[u8; N]; N]) -> Self {
        assert!(N % 2 == 1 && N <= MAX_MASK_SIZE as usize);
        let mut bits = 0u32;
        let mut y = 0;
        while y < N {
            let mut x = 0;
            while x < N {
                if rows[y][x] != 0 {
                    bits |= 1 << (y * N + x);
                }
                x += 1;
            }
            y += 1;
        }
        Self {
            size: N as u8,
            bits,
        }
    }

    /// Edge length
    pub fn size(&self) -> u8 {
        self.size
    }

    /// Offset that anchors the mask's center cell on a placement point
    pub fn center(&self) -> i32 {
        (self.size / 2) as i32
    }

    #[inline(always)]
    fn bit(&self, bx: i32, by: i32) -> Option<u32> {
        let n = self.size as i32;
        if bx < 0 || by < 0 || bx >= n || by >= n {
            return None;
        }
        Some(1 << (by * n + bx))
    }

    /// Whether the mask cell at column `bx`, row `by` is filled
    pub fn get(&self, bx: i32, by: i32) -> bool {
        self.bit(bx, by).is_some_and(|bit| self.bits & bit != 0)
    }

    /// Filled cells in row-major order
    pub fn filled(&self) -> MaskCells {
        let n = self.size as i32;
        let mut cells = MaskCells::new();
        for by in 0..n {
            for bx in 0..n {
                if self.get(bx, by) {
                    cells.push((bx, by));
                }
            }
        }
        cells
    }

    pub fn count(&self) -> u32 {
        self.bits.count_ones()
    }

    /// Quarter turn clockwise (screen coordinates, y grows downward)
    pub fn rotate_cw(&self) -> Self {
        let n = self.size as i32;
        let mut bits = 0u32;
        for y in 0..n {
            for x in 0..n {
                if self.get(y, n - 1 - x) {
                    bits |= 1 << (y * n + x);
                }
            }
        }
        Self {
            size: self.size,
            bits,
        }
    }

    /// Quarter turn counter-clockwise
    pub fn rotate_ccw(&self) -> Self {
        self.rotate_cw().rotate_cw().rotate_cw()
    }

    pub fn rotate(&self, dir: RotateDir) -> Self {
        match dir {
            RotateDir::Clockwise => self.rotate_cw(),
            RotateDir::CounterClockwise => self.rotate_ccw(),
        }
    }

    /// Visual rows, top row first
    pub fn rows(&self) -> Vec<Vec<u8>> {
        let n = self.size as i32;
        (0..n)
            .map(|by| (0..n).map(|bx| self.get(bx, by) as u8).collect())
            .collect()
    }
}

/// One catalog entry
struct Shape {
    name: &'static str,
    mask: Mask,
}

const SHAPES: [Shape; PIECE_COUNT as usize] = [
    Shape {
        name: "line",
        mask: Mask::from_rows([[0, 0, 0], [1, 1, 1], [0, 0, 0]]),
    },
    Shape {
        name: "c",
        mask: Mask::from_rows([[0, 0, 0], [1, 1, 1], [1, 0, 1]]),
    },
    Shape {
        name: "plus",
        mask: Mask::from_rows([[0, 1, 0], [1, 1, 1], [0, 1, 0]]),
    },
    Shape {
        name: "dot",
        mask: Mask::from_rows([[0, 0, 0], [0, 1, 0], [0, 0, 0]]),
    },
    Shape {
        name: "square",
        mask: Mask::from_rows([[1, 1, 0], [1, 1, 0], [0, 0, 0]]),
    },
    Shape {
        name: "l",
        mask: Mask::from_rows([[0, 0, 0], [1, 1, 1], [0, 0, 1]]),
    },
    Shape {
        name: "j",
        mask: Mask::from_rows([[0, 0, 1], [1, 1, 1], [0, 0, 0]]),
    },
    Shape {
        name: "s",
        mask: Mask::from_rows([[0, 0, 0], [1, 1, 0], [0, 1, 1]]),
    },
    Shape {
        name: "z",
        mask: Mask::from_rows([[0, 1, 1], [1, 1, 0], [0, 0, 0]]),
    },
    Shape {
        name: "t",
        mask: Mask::from_rows([[1, 0, 0], [1, 1, 0], [1, 0, 0]]),
    },
    Shape {
        name: "x",
        mask: Mask::from_rows([[1, 0, 1], [0, 1, 0], [1, 0, 1]]),
    },
    Shape {
        name: "corner",
        mask: Mask::from_rows([[0, 0, 0], [1, 1, 0], [1, 0, 0]]),
    },
    Shape {
        name: "inverse corner",
        mask: Mask::from_rows([[1, 0, 0], [1, 1, 0], [0, 0, 0]]),
    },
    Shape {
        name: "double",
        mask: Mask::from_rows([[0, 1, 0], [0, 1, 0], [0, 0, 0]]),
    },
    Shape {
        name: "triple",
        mask: Mask::from_rows([[0, 1, 0], [0, 1, 0], [0, 1, 0]]),
    },
];

/// The fixed piece catalog
#[derive(Debug, Clone, Copy, Default)]
pub struct PieceCatalog;

impl PieceCatalog {
    /// Number of catalog entries (`K`)
    pub const fn len() -> u8 {
        PIECE_COUNT
    }

    fn entry(index: u8) -> Result<&'static Shape, CatalogError> {
        SHAPES.get(index as usize).ok_or(CatalogError::OutOfRange {
            index,
            count: PIECE_COUNT,
        })
    }

    /// Canonical mask for a catalog index
    pub fn shape_of(index: u8) -> Result<Mask, CatalogError> {
        Self::entry(index).map(|shape| shape.mask)
    }

    pub fn name_of(index: u8) -> Result<&'static str, CatalogError> {
        Self::entry(index).map(|shape| shape.name)
    }

    /// Quarter turn clockwise; pure
    pub fn rotate(mask: Mask) -> Mask {
        mask.rotate_cw()
    }
}

/// A piece: catalog index plus its (possibly rotated) mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    index: u8,
    mask: Mask,
}

impl Piece {
    /// Create a piece in its canonical orientation
    pub fn new(index: u8) -> Result<Self, CatalogError> {
        Ok(Self {
            index,
            mask: PieceCatalog::shape_of(index)?,
        })
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    /// Cell value written to the grid (`index + 1`)
    pub fn value(&self) -> u8 {
        self.index + 1
    }

    pub fn name(&self) -> &'static str {
        SHAPES[self.index as usize].name
    }

    pub fn mask(&self) -> Mask {
        self.mask
    }

    /// Same piece, mask turned a quarter in `dir`
    pub fn rotated(&self, dir: RotateDir) -> Self {
        Self {
            index: self.index,
            mask: self.mask.rotate(dir),
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.index)
    }
}

impl Serialize for Piece {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Piece", 4)?;
        s.serialize_field("index", &self.index)?;
        s.serialize_field("name", self.name())?;
        s.serialize_field("value", &self.value())?;
        s.serialize_field("mask", &self.mask.rows())?;
        s.end()
    }
}
