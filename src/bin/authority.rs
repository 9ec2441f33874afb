//! Development piece authority.
//!
//! Listens on `GRIDFALL_AUTHORITY_HOST:GRIDFALL_AUTHORITY_PORT` and deals
//! seeded pieces to every connected game.

use anyhow::Result;

use gridfall::sync::{run_authority, AuthorityConfig};

#[tokio::main]
async fn main() -> Result<()> {
    gridfall::init_tracing();
    run_authority(AuthorityConfig::from_env(), None).await
}
