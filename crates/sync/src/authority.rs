//! Development piece authority
//!
//! A minimal stand-in for the multiplayer server: answers every `PIECE` with a
//! seeded random catalog index and logs what players report. Each connection
//! gets its own sequence.

use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use gridfall_core::SimpleRng;

use crate::protocol::{ClientMessage, ServerMessage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorityConfig {
    pub host: String,
    pub port: u16,
    pub seed: u32,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            seed: 1,
        }
    }
}

impl AuthorityConfig {
    /// Read `GRIDFALL_AUTHORITY_HOST`, `GRIDFALL_AUTHORITY_PORT`, `GRIDFALL_SEED`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let host = env::var("GRIDFALL_AUTHORITY_HOST").unwrap_or(defaults.host);
        let port = env::var("GRIDFALL_AUTHORITY_PORT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);
        let seed = env::var("GRIDFALL_SEED")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.seed);

        Self { host, port, seed }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Serve until the listener fails. `ready_tx` receives the bound address.
pub async fn run_authority(
    config: AuthorityConfig,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> Result<()> {
    let listener = TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("binding piece authority to {}", config.bind_addr()))?;
    let bound = listener.local_addr()?;
    info!(addr = %bound, "piece authority listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let mut client_id_counter = 0u32;
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;
        let seed = config.seed.wrapping_add(client_id);
        info!(client_id, %addr, "player connected");

        tokio::spawn(async move {
            if let Err(e) = handle_player(socket, client_id, seed).await {
                error!(client_id, error = %e, "player connection failed");
            }
            info!(client_id, "player disconnected");
        });
    }
}

async fn handle_player(socket: TcpStream, client_id: u32, seed: u32) -> Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut reader = BufReader::new(reader);
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let write_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let mut line = msg.encode();
            line.push('\n');
            if writer.write_all(line.as_bytes()).await.is_err() {
                break;
            }
        }
    });

    let mut rng = SimpleRng::new(seed);
    let mut line = String::new();
    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        match ClientMessage::parse(&line) {
            Ok(ClientMessage::RequestPiece) => {
                let index = rng.next_piece_index();
                debug!(client_id, index, "dealing piece");
                if tx.send(ServerMessage::Piece(index)).is_err() {
                    break;
                }
            }
            Ok(ClientMessage::Board(values)) => {
                let filled = values.iter().filter(|&&v| v != 0).count();
                debug!(client_id, cells = values.len(), filled, "board");
            }
            Ok(ClientMessage::Score(score)) => info!(client_id, score, "score"),
            Ok(ClientMessage::Lives(lives)) => info!(client_id, lives, "lives"),
            Ok(ClientMessage::Die) => info!(client_id, "player died"),
            Err(e) => warn!(client_id, error = %e, "unreadable line from player"),
        }
    }

    drop(tx);
    let _ = write_task.await;
    Ok(())
}
