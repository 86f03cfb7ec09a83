mod client;
mod display;
mod engine;
mod launcher;
mod lyrics;
mod settings;
mod watcher;

use crate::client::MusicInfoClient;
use crate::display::PipeDisplay;
use crate::engine::{Command, Engine};
use crate::settings::{Settings, SettingsProvider, forward_interval_changes};
use crate::watcher::PlaybackWatcher;
use clap::Parser;
use std::error::Error;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Application configuration from CLI
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Config {
    /// Player now-playing endpoint
    #[arg(long, default_value = "http://127.0.0.1:27232/player")]
    pub player_url: String,
    /// Lyric endpoint (track id is appended as ?id=...)
    #[arg(long, default_value = "http://127.0.0.1:10754/lyric")]
    pub lyric_url: String,
    /// Poll interval in milliseconds (clamped to 100-5000)
    #[arg(long, default_value_t = 1000)]
    pub interval_ms: u64,
    /// Enable per-fetch diagnostic logging
    #[arg(long)]
    pub logging: bool,
    /// Launch this player application on startup (fire-and-forget)
    #[arg(long)]
    pub launch: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cfg = Config::parse();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cfg.logging {
            "lyricbar=debug"
        } else {
            "lyricbar=warn"
        })
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = Settings::new(cfg.interval_ms, cfg.logging);
    let client = MusicInfoClient::new(
        cfg.player_url.clone(),
        cfg.lyric_url.clone(),
        settings.logging_flag(),
    );
    let engine = Engine::new(client, PipeDisplay::new(), settings.interval());

    let (command_tx, command_rx) = mpsc::channel(8);

    // Bus-driven play/pause. A failed subscription degrades to the initial
    // start below plus interval-change restarts, it never aborts the run.
    let watcher = PlaybackWatcher::new(command_tx.clone());
    tokio::spawn(async move {
        if let Err(e) = watcher.watch().await {
            tracing::warn!("failed to subscribe to MPRIS signals: {e}");
        }
    });

    tokio::spawn(forward_interval_changes(
        settings.subscribe_interval(),
        command_tx.clone(),
    ));

    let shutdown_tx = command_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(Command::Shutdown).await;
        }
    });

    if let Some(command) = cfg.launch.as_deref() {
        launcher::launch_player(command);
    }

    // Kick off polling immediately; a fetch failure parks the engine until
    // the next PlaybackStatus signal.
    command_tx.send(Command::PlaybackChanged(true)).await?;

    engine::run(engine, command_rx).await;
    Ok(())
}
