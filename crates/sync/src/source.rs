//! Remote piece source with a local fallback

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{trace, warn};

use gridfall_core::Grid;
use gridfall_engine::{LocalPieceSource, PieceSource};

/// One spawn request handed to the link task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnRequest {
    /// Grid values at request time, row-major
    pub board: Vec<u8>,
}

/// Whether the authority is still dealing pieces. Shared between the source
/// (engine side) and the link task.
#[derive(Debug, Clone)]
pub struct SyncFlag(Arc<AtomicBool>);

impl SyncFlag {
    pub fn new(synced: bool) -> Self {
        Self(Arc::new(AtomicBool::new(synced)))
    }

    pub fn is_synced(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Drop to local draws. Returns true if this call made the switch.
    pub fn desync(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

/// Asks the authority for every piece while synchronized. Once the link is
/// lost it draws locally for the rest of the game.
#[derive(Debug)]
pub struct RemotePieceSource {
    requests: mpsc::UnboundedSender<SpawnRequest>,
    flag: SyncFlag,
    fallback: LocalPieceSource,
}

impl RemotePieceSource {
    pub fn new(
        requests: mpsc::UnboundedSender<SpawnRequest>,
        flag: SyncFlag,
        fallback_seed: u32,
    ) -> Self {
        Self {
            requests,
            flag,
            fallback: LocalPieceSource::new(fallback_seed),
        }
    }

    pub fn is_synced(&self) -> bool {
        self.flag.is_synced()
    }
}

impl PieceSource for RemotePieceSource {
    fn request(&mut self, grid: &Grid) -> Option<u8> {
        if self.flag.is_synced() {
            let request = SpawnRequest {
                board: grid.values().to_vec(),
            };
            if self.requests.send(request).is_ok() {
                trace!("spawn request forwarded to authority");
                return None;
            }
            if self.flag.desync() {
                warn!("sync link gone, drawing pieces locally");
            }
        }
        Some(self.fallback.draw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synced_source_forwards_board() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut source = RemotePieceSource::new(tx, SyncFlag::new(true), 1);
        let mut grid = Grid::new(2, 2);
        grid.set(1, 0, 3);

        assert_eq!(source.request(&grid), None);
        assert_eq!(
            rx.try_recv().unwrap(),
            SpawnRequest {
                board: vec![0, 3, 0, 0]
            }
        );
    }

    #[test]
    fn test_desynced_source_draws_locally() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let flag = SyncFlag::new(true);
        let mut source = RemotePieceSource::new(tx, flag.clone(), 1);

        assert!(flag.desync());
        assert!(!flag.desync());
        assert!(source.request(&Grid::default()).is_some());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_closed_link_falls_back() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let mut source = RemotePieceSource::new(tx, SyncFlag::new(true), 1);
        assert!(source.request(&Grid::default()).is_some());
        assert!(!source.is_synced());
    }
}
