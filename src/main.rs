//! Headless gridfall runner (default binary).
//!
//! Reads commands from stdin, one per line (`place <x> <y>`, `swap`,
//! `rotate [cw|ccw]`, `snapshot`, `stop`), and writes every game event to
//! stdout as a JSON line. With `GRIDFALL_SERVER` set, pieces come from that
//! authority. At game over the score goes into the high-score file.

use std::env;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, oneshot};
use tracing::{info, warn};

use gridfall::core::{GameEvent, GameSnapshot};
use gridfall::engine::{
    run_cues, spawn_engine, EngineConfig, LocalPieceSource, LogSink, RunningEngine,
};
use gridfall::scores::{ScoreTable, DEFAULT_PATH};
use gridfall::sync::{connect, SyncConfig};
use gridfall::types::GameCommand;

#[tokio::main]
async fn main() -> Result<()> {
    gridfall::init_tracing();

    let config = EngineConfig::from_env();
    info!(
        cols = config.cols,
        rows = config.rows,
        lives = config.lives,
        seed = config.seed,
        "gridfall"
    );

    let (engine, link) = match SyncConfig::from_env() {
        Some(sync) => {
            let (source, link) = connect(sync, config.seed).await?;
            (spawn_engine(&config, source), Some(link))
        }
        None => (spawn_engine(&config, LocalPieceSource::new(config.seed)), None),
    };
    let RunningEngine {
        handle,
        events,
        task,
    } = engine;
    let link_task = link.map(|link| link.attach(&handle));
    let cue_task = tokio::spawn(run_cues(handle.subscribe(), LogSink));

    let (over_tx, mut over_rx) = oneshot::channel();
    let printer = tokio::spawn(print_events(events, over_tx));

    handle.start();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else {
                    break;
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match line {
                    "snapshot" => {
                        if let Some(snap) = handle.snapshot().await {
                            print_json(&snap);
                        }
                    }
                    "quit" | "exit" => break,
                    _ => match GameCommand::parse(line) {
                        Some(GameCommand::Stop) => break,
                        Some(command) => {
                            handle.send(command);
                        }
                        None => warn!(line, "unknown command"),
                    },
                }
            }
            _ = &mut over_rx => break,
        }
    }

    handle.stop();
    let final_state = task.await.context("engine task panicked")?;
    // Event streams close once the last handle is gone.
    drop(handle);
    let _ = printer.await;
    let _ = cue_task.await;
    if let Some(task) = link_task {
        let _ = task.await;
    }

    record_score(&final_state)
}

async fn print_events(mut events: broadcast::Receiver<GameEvent>, over_tx: oneshot::Sender<()>) {
    let mut over_tx = Some(over_tx);
    loop {
        match events.recv().await {
            Ok(event) => {
                print_json(&event);
                if let GameEvent::GameOver { .. } = event {
                    if let Some(tx) = over_tx.take() {
                        let _ = tx.send(());
                    }
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "event output fell behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    let mut out = std::io::stdout().lock();
    if serde_json::to_writer(&mut out, value).is_ok() {
        let _ = writeln!(out);
        let _ = out.flush();
    }
}

fn record_score(state: &GameSnapshot) -> Result<()> {
    info!(score = state.score, level = state.level, "final score");
    if state.score == 0 {
        return Ok(());
    }

    let path = env::var("GRIDFALL_SCORES_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_PATH));
    let player = env::var("GRIDFALL_PLAYER").unwrap_or_else(|_| "player".to_string());

    let mut table = ScoreTable::load(&path)?;
    if !table.is_high_score(state.score) {
        return Ok(());
    }
    if let Some(rank) = table.insert(&player, state.score) {
        info!(rank = rank + 1, player = %player, "new high score");
    }
    table.save(&path)?;
    for (i, entry) in table.top(5).iter().enumerate() {
        info!("{}. {} {}", i + 1, entry.name, entry.score);
    }
    Ok(())
}
