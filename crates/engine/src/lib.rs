//! Async game engine
//!
//! Wraps the pure [`gridfall_core::GameState`] in a tokio actor that owns the
//! turn countdown and talks to a [`PieceSource`].
//!
//! ```no_run
//! use gridfall_engine::{spawn_engine, EngineConfig, LocalPieceSource};
//!
//! # async fn demo() {
//! let config = EngineConfig::from_env();
//! let engine = spawn_engine(&config, LocalPieceSource::new(config.seed));
//! engine.handle.start();
//! engine.handle.place(2, 2);
//! let snapshot = engine.handle.snapshot().await;
//! engine.handle.stop();
//! # let _ = snapshot;
//! # }
//! ```

pub mod config;
pub mod cues;
pub mod engine;
pub mod source;

pub use gridfall_core as core;
pub use gridfall_types as types;

pub use config::EngineConfig;
pub use cues::{cue_for, run_cues, AudioSink, Cue, LogSink};
pub use engine::{spawn_engine, EngineHandle, EngineInput, RunningEngine, EVENT_CAPACITY};
pub use source::{LocalPieceSource, PieceSource, ScriptedPieceSource};
