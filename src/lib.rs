//! gridfall (workspace facade crate).
//!
//! Re-exports the member crates under `crates/` as
//! `gridfall::{types, core, engine, sync, scores}` and holds the logging setup
//! shared by the binaries.

pub use gridfall_core as core;
pub use gridfall_engine as engine;
pub use gridfall_scores as scores;
pub use gridfall_sync as sync;
pub use gridfall_types as types;

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Log to stderr, filtered by `RUST_LOG` (default `info`). Stdout stays free
/// for the event stream.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .try_init();
}
