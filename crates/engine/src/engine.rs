//! The engine actor
//!
//! One tokio task owns the [`GameState`]. Commands, authority answers and the
//! turn deadline all reach it through a single `select!` loop, so a deadline
//! firing and a placement can never interleave. Restarting the turn replaces
//! the deadline before the next loop iteration; a stale firing cannot happen.

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Duration, Instant};
use tracing::{debug, error, info, warn};

use gridfall_core::{GameEvent, GameSnapshot, GameState, PlaceOutcome, SupplyOutcome};

use crate::config::EngineConfig;
use crate::source::PieceSource;
use crate::types::{GameCommand, RotateDir};

/// Events buffered per subscriber before it starts lagging
pub const EVENT_CAPACITY: usize = 1024;

/// Everything the engine task consumes
#[derive(Debug)]
pub enum EngineInput {
    Command(GameCommand),
    /// An asynchronously answered spawn request
    PieceAssigned(u8),
    /// Outstanding spawn requests will never be answered; ask again
    SourceLost,
    Snapshot(oneshot::Sender<GameSnapshot>),
}

/// Cloneable handle to a running engine. Sends never block.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    input_tx: mpsc::UnboundedSender<EngineInput>,
    events_tx: broadcast::Sender<GameEvent>,
}

impl EngineHandle {
    /// Queue a command. Returns false once the engine has stopped.
    pub fn send(&self, command: GameCommand) -> bool {
        self.input_tx.send(EngineInput::Command(command)).is_ok()
    }

    pub fn start(&self) -> bool {
        self.send(GameCommand::Start)
    }

    pub fn place(&self, x: i32, y: i32) -> bool {
        self.send(GameCommand::Place { x, y })
    }

    pub fn swap(&self) -> bool {
        self.send(GameCommand::Swap)
    }

    pub fn rotate(&self, dir: RotateDir) -> bool {
        self.send(GameCommand::Rotate(dir))
    }

    /// Ask the engine to finish. Always succeeds; stopping a stopped engine
    /// is a no-op.
    pub fn stop(&self) {
        let _ = self.send(GameCommand::Stop);
    }

    /// Current state, or `None` if the engine is gone
    pub async fn snapshot(&self) -> Option<GameSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.input_tx.send(EngineInput::Snapshot(tx)).ok()?;
        rx.await.ok()
    }

    /// Raw input queue, for collaborators that answer spawn requests
    pub fn input_sender(&self) -> mpsc::UnboundedSender<EngineInput> {
        self.input_tx.clone()
    }

    /// Receive every event emitted from now on. The stream closes once the
    /// engine has stopped and every handle is dropped.
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.events_tx.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        self.input_tx.is_closed()
    }
}

/// A spawned engine
pub struct RunningEngine {
    pub handle: EngineHandle,
    /// Subscribed before the task started, so nothing is missed
    pub events: broadcast::Receiver<GameEvent>,
    /// Resolves to the final state once the engine stops
    pub task: JoinHandle<GameSnapshot>,
}

enum Flow {
    Continue,
    Stop,
}

struct Engine<S> {
    state: GameState,
    source: S,
    events_tx: broadcast::Sender<GameEvent>,
    deadline: Option<Instant>,
}

/// Spawn an engine task on the current runtime. The game waits for `start`.
pub fn spawn_engine<S>(config: &EngineConfig, source: S) -> RunningEngine
where
    S: PieceSource + 'static,
{
    let (input_tx, input_rx) = mpsc::unbounded_channel();
    let (events_tx, events) = broadcast::channel(EVENT_CAPACITY);

    let engine = Engine {
        state: GameState::new(config.cols, config.rows, config.lives),
        source,
        events_tx: events_tx.clone(),
        deadline: None,
    };
    let task = tokio::spawn(engine.run(input_rx));

    RunningEngine {
        handle: EngineHandle {
            input_tx,
            events_tx,
        },
        events,
        task,
    }
}

impl<S: PieceSource> Engine<S> {
    async fn run(mut self, mut input_rx: mpsc::UnboundedReceiver<EngineInput>) -> GameSnapshot {
        loop {
            let input = match self.deadline {
                Some(deadline) => {
                    tokio::select! {
                        biased;
                        input = input_rx.recv() => input,
                        _ = sleep_until(deadline) => {
                            self.deadline = None;
                            self.state.expire_deadline();
                            let flow = self.pump_spawns();
                            self.flush_events();
                            if let Flow::Stop = flow {
                                break;
                            }
                            continue;
                        }
                    }
                }
                None => input_rx.recv().await,
            };

            let Some(input) = input else {
                debug!("all engine handles dropped");
                break;
            };

            let flow = self.handle_input(input);
            self.flush_events();
            if let Flow::Stop = flow {
                break;
            }
        }

        info!(
            score = self.state.score(),
            phase = ?self.state.phase(),
            "engine stopped"
        );
        self.state.snapshot()
    }

    fn handle_input(&mut self, input: EngineInput) -> Flow {
        match input {
            EngineInput::Command(command) => self.handle_command(command),
            EngineInput::PieceAssigned(index) => self.supply(index),
            EngineInput::SourceLost => {
                warn!(
                    pending = self.state.pending_spawns(),
                    "piece source lost, requesting again"
                );
                self.state.reset_pending_spawns();
                self.pump_spawns()
            }
            EngineInput::Snapshot(reply) => {
                let _ = reply.send(self.state.snapshot());
                Flow::Continue
            }
        }
    }

    fn handle_command(&mut self, command: GameCommand) -> Flow {
        debug!(command = command.as_str(), "command");
        match command {
            GameCommand::Start => {
                self.state.start();
                self.pump_spawns()
            }
            GameCommand::Place { x, y } => {
                if let PlaceOutcome::Rejected(reason) = self.state.place(x, y) {
                    debug!(x, y, code = reason.code(), "{}", reason.message());
                    return Flow::Continue;
                }
                self.pump_spawns()
            }
            GameCommand::Swap => {
                self.state.swap();
                Flow::Continue
            }
            GameCommand::Rotate(dir) => {
                self.state.rotate(dir);
                Flow::Continue
            }
            GameCommand::Stop => Flow::Stop,
        }
    }

    /// Request pieces until every empty slot has a request in flight. A
    /// refused repeat frees its slot again, so the loop asks once more.
    fn pump_spawns(&mut self) -> Flow {
        while self.state.spawns_needed() > 0 {
            self.state.note_spawn_requested();
            if let Some(index) = self.source.request(self.state.grid()) {
                if let Flow::Stop = self.accept(index) {
                    return Flow::Stop;
                }
            }
        }
        Flow::Continue
    }

    /// An answer from an asynchronous source
    fn supply(&mut self, index: u8) -> Flow {
        if let Flow::Stop = self.accept(index) {
            return Flow::Stop;
        }
        self.pump_spawns()
    }

    fn accept(&mut self, index: u8) -> Flow {
        match self.state.supply_piece(index) {
            Ok(SupplyOutcome::Accepted | SupplyOutcome::RejectedRepeat) => Flow::Continue,
            Ok(SupplyOutcome::Unexpected) => {
                debug!(index, "piece arrived with no slot waiting");
                Flow::Continue
            }
            Err(e) => {
                error!(error = %e, "piece source broke the catalog contract");
                Flow::Stop
            }
        }
    }

    /// Publish buffered events and re-arm or clear the deadline
    fn flush_events(&mut self) {
        for event in self.state.take_events() {
            match &event {
                GameEvent::TurnReset { delay_ms } => {
                    self.deadline =
                        Some(Instant::now() + Duration::from_millis(u64::from(*delay_ms)));
                }
                GameEvent::GameOver { .. } => self.deadline = None,
                _ => {}
            }
            // No subscribers is fine.
            let _ = self.events_tx.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{LocalPieceSource, ScriptedPieceSource};
    use gridfall_core::Phase;

    fn drain(rx: &mut broadcast::Receiver<GameEvent>) -> Vec<GameEvent> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            out.push(event);
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_deals_two_pieces() {
        let mut engine = spawn_engine(&EngineConfig::default(), ScriptedPieceSource::new([3, 4]));
        engine.handle.start();

        let snap = engine.handle.snapshot().await.unwrap();
        assert_eq!(snap.phase, Phase::AwaitingPlacement);
        assert_eq!(snap.current.map(|p| p.index()), Some(3));
        assert_eq!(snap.next.map(|p| p.index()), Some(4));

        let events = drain(&mut engine.events);
        assert_eq!(events.last(), Some(&GameEvent::TurnReset { delay_ms: 12_000 }));

        engine.handle.stop();
        let final_snap = engine.task.await.unwrap();
        assert_eq!(final_snap.score, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_costs_a_life() {
        let mut engine = spawn_engine(&EngineConfig::default(), LocalPieceSource::new(5));
        engine.handle.start();
        engine.handle.snapshot().await.unwrap();
        drain(&mut engine.events);

        tokio::time::sleep(Duration::from_millis(12_001)).await;
        let snap = engine.handle.snapshot().await.unwrap();
        assert_eq!(snap.lives, 2);
        assert!(snap.current.is_some());

        let events = drain(&mut engine.events);
        assert!(events.contains(&GameEvent::LivesChanged { lives: 2 }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_placement_restarts_deadline() {
        let engine = spawn_engine(&EngineConfig::default(), ScriptedPieceSource::new([3, 4, 3]));
        engine.handle.start();
        engine.handle.snapshot().await.unwrap();

        tokio::time::sleep(Duration::from_millis(11_000)).await;
        engine.handle.place(0, 0);
        tokio::time::sleep(Duration::from_millis(11_000)).await;

        let snap = engine.handle.snapshot().await.unwrap();
        assert_eq!(snap.lives, 3, "the old deadline must not fire");
    }

    #[tokio::test(start_paused = true)]
    async fn test_game_over_disarms_timer() {
        let config = EngineConfig {
            lives: 0,
            ..EngineConfig::default()
        };
        let mut engine = spawn_engine(&config, LocalPieceSource::new(11));
        engine.handle.start();
        engine.handle.snapshot().await.unwrap();

        tokio::time::sleep(Duration::from_secs(60)).await;
        let snap = engine.handle.snapshot().await.unwrap();
        assert!(snap.is_game_over());
        assert_eq!(snap.lives, -1);

        let overs = drain(&mut engine.events)
            .into_iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(overs, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unanswered_spawn_keeps_awaiting_placement() {
        // Only the current piece ever arrives.
        let engine = spawn_engine(&EngineConfig::default(), ScriptedPieceSource::new([3]));
        engine.handle.start();
        let snap = engine.handle.snapshot().await.unwrap();
        assert_eq!(snap.phase, Phase::Initializing);
        assert_eq!(snap.pending_spawns, 1);

        engine
            .handle
            .input_sender()
            .send(EngineInput::PieceAssigned(6))
            .unwrap();
        let snap = engine.handle.snapshot().await.unwrap();
        assert_eq!(snap.phase, Phase::AwaitingPlacement);
        assert_eq!(snap.next.map(|p| p.index()), Some(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeats_are_drawn_again() {
        let engine = spawn_engine(
            &EngineConfig::default(),
            ScriptedPieceSource::new([3, 3, 3, 3, 4]),
        );
        engine.handle.start();
        let snap = engine.handle.snapshot().await.unwrap();
        assert_eq!(snap.current.map(|p| p.index()), Some(3));
        assert_eq!(snap.next.map(|p| p.index()), Some(4));
        assert_eq!(snap.pending_spawns, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_index_ends_engine() {
        let engine = spawn_engine(&EngineConfig::default(), ScriptedPieceSource::new([99]));
        engine.handle.start();
        let snap = engine.task.await.unwrap();
        assert!(snap.current.is_none());
        assert!(engine.handle.is_closed());
    }

    #[tokio::test]
    async fn test_stop_is_always_accepted() {
        let engine = spawn_engine(&EngineConfig::default(), ScriptedPieceSource::default());
        engine.handle.stop();
        engine.task.await.unwrap();
        engine.handle.stop();
        assert!(!engine.handle.start());
        assert!(engine.handle.snapshot().await.is_none());
    }
}
