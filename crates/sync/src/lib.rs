//! Multiplayer synchronization
//!
//! In a multiplayer game an authority deals every piece. This crate holds the
//! text line [`protocol`], the engine-side [`RemotePieceSource`], the
//! [`client`] link task and a development [`authority`].

pub mod authority;
pub mod client;
pub mod protocol;
pub mod source;

pub use authority::{run_authority, AuthorityConfig};
pub use client::{connect, SyncConfig, SyncLink};
pub use protocol::{ClientMessage, ProtocolError, ServerMessage};
pub use source::{RemotePieceSource, SpawnRequest, SyncFlag};
