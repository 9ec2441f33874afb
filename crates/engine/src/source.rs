//! Piece sources
//!
//! The engine asks a [`PieceSource`] for every catalog index it deals. A local
//! source answers on the spot; a remote one forwards the request and the answer
//! comes back later on the engine's input queue as
//! [`EngineInput::PieceAssigned`](crate::EngineInput::PieceAssigned).

use gridfall_core::{Grid, SimpleRng};
use tracing::trace;

pub trait PieceSource: Send {
    /// Ask for one piece. `Some(index)` is an immediate answer; `None` means
    /// the answer will arrive asynchronously.
    fn request(&mut self, grid: &Grid) -> Option<u8>;
}

impl<S: PieceSource + ?Sized> PieceSource for Box<S> {
    fn request(&mut self, grid: &Grid) -> Option<u8> {
        (**self).request(grid)
    }
}

/// Seeded uniform draws over the catalog
#[derive(Debug, Clone)]
pub struct LocalPieceSource {
    rng: SimpleRng,
}

impl LocalPieceSource {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: SimpleRng::new(seed),
        }
    }

    /// Draw without going through the trait (used by fallbacks)
    pub fn draw(&mut self) -> u8 {
        let index = self.rng.next_piece_index();
        trace!(index, "local draw");
        index
    }
}

impl PieceSource for LocalPieceSource {
    fn request(&mut self, _grid: &Grid) -> Option<u8> {
        Some(self.draw())
    }
}

/// Fixed sequence of indices, then silence. Useful for scripted games.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPieceSource {
    indices: std::collections::VecDeque<u8>,
}

impl ScriptedPieceSource {
    pub fn new(indices: impl IntoIterator<Item = u8>) -> Self {
        Self {
            indices: indices.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.indices.len()
    }
}

impl PieceSource for ScriptedPieceSource {
    fn request(&mut self, _grid: &Grid) -> Option<u8> {
        self.indices.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_source_is_seeded() {
        let grid = Grid::default();
        let mut a = LocalPieceSource::new(9);
        let mut b = LocalPieceSource::new(9);
        for _ in 0..50 {
            assert_eq!(a.request(&grid), b.request(&grid));
        }
    }

    #[test]
    fn test_scripted_source_runs_dry() {
        let grid = Grid::default();
        let mut source = ScriptedPieceSource::new([1, 2]);
        assert_eq!(source.request(&grid), Some(1));
        assert_eq!(source.request(&grid), Some(2));
        assert_eq!(source.request(&grid), None);
        assert_eq!(source.remaining(), 0);
    }
}
