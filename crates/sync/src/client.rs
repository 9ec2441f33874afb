//! Multiplayer link to the piece authority
//!
//! [`connect`] opens the TCP connection and returns the engine-side
//! [`RemotePieceSource`] together with a [`SyncLink`]. Once the engine is
//! spawned, [`SyncLink::attach`] starts the link task, which:
//!
//! - writes `PIECE` + `BOARD` for every spawn request and forwards the
//!   authority's `PIECE <n>` answers onto the engine's input queue,
//! - mirrors score and lives changes as `SCORE`/`LIVES`/`DIE`,
//! - re-sends unanswered requests after the spawn timeout and, once the
//!   retries are spent or the connection drops, switches the source to local
//!   draws and tells the engine to request again.

use std::collections::VecDeque;
use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::TcpStream;
use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use gridfall_core::GameEvent;
use gridfall_engine::{EngineHandle, EngineInput};

use crate::protocol::{ClientMessage, ServerMessage};
use crate::source::{RemotePieceSource, SpawnRequest, SyncFlag};

pub const DEFAULT_SPAWN_TIMEOUT_MS: u64 = 3_000;
pub const DEFAULT_SPAWN_RETRIES: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Authority address as `host:port`
    pub server: String,
    /// How long a spawn request may go unanswered before it is re-sent
    pub spawn_timeout: Duration,
    /// Re-sends before giving up on the authority
    pub spawn_retries: u32,
}

impl SyncConfig {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            spawn_timeout: Duration::from_millis(DEFAULT_SPAWN_TIMEOUT_MS),
            spawn_retries: DEFAULT_SPAWN_RETRIES,
        }
    }

    /// Read `GRIDFALL_SERVER`, `GRIDFALL_SPAWN_TIMEOUT_MS` and
    /// `GRIDFALL_SPAWN_RETRIES`. `None` (single player) when no server is set.
    pub fn from_env() -> Option<Self> {
        let server = env::var("GRIDFALL_SERVER")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())?;

        let spawn_timeout = env::var("GRIDFALL_SPAWN_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|&ms| ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_millis(DEFAULT_SPAWN_TIMEOUT_MS));
        let spawn_retries = env::var("GRIDFALL_SPAWN_RETRIES")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_SPAWN_RETRIES);

        Some(Self {
            server,
            spawn_timeout,
            spawn_retries,
        })
    }
}

/// Connection waiting to be bound to an engine
#[derive(Debug)]
pub struct SyncLink {
    stream: TcpStream,
    requests: mpsc::UnboundedReceiver<SpawnRequest>,
    flag: SyncFlag,
    config: SyncConfig,
}

/// Connect to the authority.
///
/// `fallback_seed` seeds the local draws used after a desync.
pub async fn connect(config: SyncConfig, fallback_seed: u32) -> Result<(RemotePieceSource, SyncLink)> {
    let stream = TcpStream::connect(&config.server)
        .await
        .with_context(|| format!("connecting to piece authority at {}", config.server))?;
    stream.set_nodelay(true)?;
    info!(server = %config.server, "connected to piece authority");

    let (requests_tx, requests) = mpsc::unbounded_channel();
    let flag = SyncFlag::new(true);
    let source = RemotePieceSource::new(requests_tx, flag.clone(), fallback_seed);
    let link = SyncLink {
        stream,
        requests,
        flag,
        config,
    };
    Ok((source, link))
}

impl SyncLink {
    /// Whether the authority is still dealing pieces
    pub fn flag(&self) -> SyncFlag {
        self.flag.clone()
    }

    /// Start the link task for `engine`. It ends when the engine stops.
    pub fn attach(self, engine: &EngineHandle) -> JoinHandle<()> {
        let input_tx = engine.input_sender();
        let events = engine.subscribe();
        tokio::spawn(self.run(input_tx, events))
    }

    async fn run(
        self,
        input_tx: mpsc::UnboundedSender<EngineInput>,
        mut events: broadcast::Receiver<GameEvent>,
    ) {
        let SyncLink {
            stream,
            mut requests,
            flag,
            config,
        } = self;
        let (read_half, mut write_half) = stream.into_split();

        // Channel to the socket writer
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<ClientMessage>();
        let write_task = tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let mut line = msg.encode();
                line.push('\n');
                if write_half.write_all(line.as_bytes()).await.is_err() {
                    break;
                }
                if write_half.flush().await.is_err() {
                    break;
                }
            }
        });

        let mut link = LinkState {
            flag,
            config,
            input_tx,
            out_tx,
            outstanding: VecDeque::new(),
            owed: VecDeque::new(),
            next_id: 0,
            deadline: None,
        };
        let mut lines = Some(BufReader::new(read_half).lines());

        // Events go first so score and lives reach the socket before the
        // loop can notice the engine is gone.
        loop {
            tokio::select! {
                biased;
                event = events.recv() => match event {
                    Ok(event) => link.on_event(&event),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "sync link fell behind engine events");
                    }
                    Err(RecvError::Closed) => break,
                },
                line = next_line(&mut lines) => match line {
                    Ok(Some(line)) => {
                        if !link.on_line(&line) {
                            break;
                        }
                    }
                    Ok(None) => {
                        lines = None;
                        link.lose_sync("authority closed the connection");
                    }
                    Err(e) => {
                        warn!(error = %e, "read from authority failed");
                        lines = None;
                        link.lose_sync("connection to authority lost");
                    }
                },
                request = requests.recv() => match request {
                    Some(request) => link.on_spawn_request(request),
                    None => break,
                },
                _ = wait_deadline(link.deadline) => link.on_spawn_timeout(),
            }
        }

        // The engine has finished; whatever it published is already buffered.
        loop {
            match events.try_recv() {
                Ok(event) => link.on_event(&event),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "sync link fell behind engine events");
                }
                Err(_) => break,
            }
        }

        drop(link);
        let _ = write_task.await;
        debug!("sync link closed");
    }
}

struct Outstanding {
    id: u64,
    board: Vec<u8>,
    attempts: u32,
}

struct LinkState {
    flag: SyncFlag,
    config: SyncConfig,
    input_tx: mpsc::UnboundedSender<EngineInput>,
    out_tx: mpsc::UnboundedSender<ClientMessage>,
    /// Requests sent and not yet answered, oldest first
    outstanding: VecDeque<Outstanding>,
    /// Request id behind every `PIECE` line on the wire, in send order. A
    /// re-sent request is owed one answer per send.
    owed: VecDeque<u64>,
    next_id: u64,
    /// When the oldest outstanding request times out
    deadline: Option<Instant>,
}

impl LinkState {
    fn send(&self, msg: ClientMessage) {
        // A dead writer shows up as a read error shortly.
        let _ = self.out_tx.send(msg);
    }

    fn send_request(&mut self, id: u64, board: &[u8]) {
        self.send(ClientMessage::RequestPiece);
        self.send(ClientMessage::Board(board.to_vec()));
        self.owed.push_back(id);
    }

    fn rearm(&mut self) {
        self.deadline = if self.outstanding.is_empty() {
            None
        } else {
            Some(Instant::now() + self.config.spawn_timeout)
        };
    }

    /// Returns false once the engine is gone
    fn on_line(&mut self, line: &str) -> bool {
        if line.trim().is_empty() {
            return true;
        }
        match ServerMessage::parse(line) {
            Ok(ServerMessage::Piece(index)) => {
                if !self.flag.is_synced() {
                    debug!(index, "late piece after desync, ignoring");
                    return true;
                }
                let Some(id) = self.owed.pop_front() else {
                    warn!(index, "piece with no request owed, ignoring");
                    return true;
                };
                let Some(pos) = self.outstanding.iter().position(|o| o.id == id) else {
                    debug!(index, id, "second answer to a re-sent request, ignoring");
                    return true;
                };
                self.outstanding.remove(pos);
                self.rearm();
                self.input_tx.send(EngineInput::PieceAssigned(index)).is_ok()
            }
            Ok(ServerMessage::Other(verb)) => {
                debug!(verb = %verb, "ignoring authority message");
                true
            }
            Err(e) => {
                warn!(error = %e, line = line.trim(), "protocol desync, dropping line");
                true
            }
        }
    }

    fn on_spawn_request(&mut self, request: SpawnRequest) {
        if !self.flag.is_synced() {
            // The engine was told to re-request; this one is void.
            return;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.send_request(id, &request.board);
        self.outstanding.push_back(Outstanding {
            id,
            board: request.board,
            attempts: 0,
        });
        if self.deadline.is_none() {
            self.rearm();
        }
    }

    fn on_spawn_timeout(&mut self) {
        let retries = self.config.spawn_retries;
        let Some(front) = self.outstanding.front_mut() else {
            self.deadline = None;
            return;
        };
        if front.attempts < retries {
            front.attempts += 1;
            let attempt = front.attempts;
            let id = front.id;
            let board = front.board.clone();
            warn!(attempt, retries, "spawn request unanswered, sending again");
            self.send_request(id, &board);
            self.rearm();
        } else {
            self.lose_sync("authority stopped answering spawn requests");
        }
    }

    fn on_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::ScoreChanged { score } => self.send(ClientMessage::Score(*score)),
            GameEvent::LivesChanged { lives } => self.send(ClientMessage::Lives(*lives)),
            GameEvent::GameOver { .. } => self.send(ClientMessage::Die),
            _ => {}
        }
    }

    /// Switch to local draws and have the engine ask again
    fn lose_sync(&mut self, reason: &str) {
        self.outstanding.clear();
        self.owed.clear();
        self.deadline = None;
        if self.flag.desync() {
            warn!(reason, "falling back to local piece draws");
            let _ = self.input_tx.send(EngineInput::SourceLost);
        }
    }
}

async fn next_line(lines: &mut Option<Lines<BufReader<OwnedReadHalf>>>) -> std::io::Result<Option<String>> {
    match lines {
        Some(lines) => lines.next_line().await,
        None => std::future::pending().await,
    }
}

async fn wait_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
