//! Sound cues
//!
//! The engine knows nothing about audio. A front end that wants sound plugs an
//! [`AudioSink`] into [`run_cues`], which maps events to [`Cue`]s.

use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use gridfall_core::GameEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    Place,
    Fail,
    Clear,
    LevelUp,
    LifeLost,
    Swap,
    Rotate,
    GameOver,
}

pub trait AudioSink: Send {
    fn play(&mut self, cue: Cue);
}

/// Logs cues instead of playing them
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl AudioSink for LogSink {
    fn play(&mut self, cue: Cue) {
        debug!(?cue, "cue");
    }
}

impl AudioSink for Vec<Cue> {
    fn play(&mut self, cue: Cue) {
        self.push(cue);
    }
}

pub fn cue_for(event: &GameEvent) -> Option<Cue> {
    match event {
        GameEvent::PiecePlaced { .. } => Some(Cue::Place),
        GameEvent::PlacementRejected { .. } => Some(Cue::Fail),
        GameEvent::LinesCleared { .. } => Some(Cue::Clear),
        GameEvent::LevelChanged { .. } => Some(Cue::LevelUp),
        GameEvent::LivesChanged { .. } => Some(Cue::LifeLost),
        GameEvent::PiecesSwapped => Some(Cue::Swap),
        GameEvent::PieceRotated { .. } => Some(Cue::Rotate),
        GameEvent::GameOver { .. } => Some(Cue::GameOver),
        GameEvent::PieceChanged { .. }
        | GameEvent::ScoreChanged { .. }
        | GameEvent::MultiplierChanged { .. }
        | GameEvent::TurnReset { .. } => None,
    }
}

/// Play cues until the engine's event channel closes, then hand the sink back
pub async fn run_cues<A: AudioSink>(mut events: broadcast::Receiver<GameEvent>, mut sink: A) -> A {
    loop {
        match events.recv().await {
            Ok(event) => {
                if let Some(cue) = cue_for(&event) {
                    sink.play(cue);
                }
            }
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "cue player fell behind"),
            Err(RecvError::Closed) => break,
        }
    }
    sink
}
