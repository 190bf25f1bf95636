//! Backstreet console.
//!
//! Reads commands from stdin and plays the game against the on-device file
//! store, falling back to process memory when the data directory is unusable.

mod app;
mod commands;

use std::io::Write as _;
use std::sync::Arc;
use std::time::Duration;

use backstreet_core::catalog::Catalog;
use backstreet_core::config::GameConfig;
use backstreet_core::game_events::EVENT_MISSION_RESOLVED;
use backstreet_engine::{GameDeps, LocalAuth, SystemClock};
use backstreet_events::{EventBus, GameEvent};
use backstreet_store::{FallbackStore, FileStore, MemoryStore, SharedStore};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::{Console, Flow};
use crate::commands::Command;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backstreet_console=info,backstreet_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = GameConfig::from_env()?;
    tracing::info!(
        data_dir = %config.data_dir.display(),
        stamina_max = config.stamina.max,
        regen_policy = config.stamina.policy.name(),
        "Loaded configuration"
    );

    // --- Persistence ---
    let fallback: SharedStore = Arc::new(MemoryStore::new());
    let store: SharedStore = match FileStore::open(config.data_dir.clone()).await {
        Ok(files) => Arc::new(FallbackStore::new(Arc::new(files), fallback)),
        Err(e) => {
            tracing::warn!(error = %e, "Data directory unusable, progress will not survive exit");
            fallback
        }
    };

    // --- Event bus ---
    let bus = Arc::new(EventBus::default());
    let announcer_handle = tokio::spawn(announce_resolutions(bus.subscribe()));

    let deps = GameDeps {
        store: store.clone(),
        bus: bus.clone(),
        catalog: Arc::new(Catalog::builtin()?),
        clock: Arc::new(SystemClock),
        config,
    };
    let mut console = Console::new(LocalAuth::new(store), deps).await?;
    println!("{}", console.greeting());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };

        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };
        match console.execute(command).await {
            Ok(Flow::Continue(out)) if out.is_empty() => {}
            Ok(Flow::Continue(out)) => println!("{out}"),
            Ok(Flow::Quit) => break,
            Err(e) => {
                tracing::debug!(error = %e, player_id = ?console.player_id(), "Command failed");
                println!("error: {e}");
            }
        }
    }

    // --- Shutdown ---
    drop(console);
    drop(bus);
    let _ = tokio::time::timeout(Duration::from_secs(2), announcer_handle).await;
    tracing::info!("Shut down");
    Ok(())
}

/// Print a line whenever a mission resolves in the background.
async fn announce_resolutions(mut receiver: broadcast::Receiver<GameEvent>) {
    loop {
        match receiver.recv().await {
            Ok(event) if event.event_type == EVENT_MISSION_RESOLVED => {
                let outcome = event.payload_str("outcome").unwrap_or("unknown");
                println!("\n[mission resolved: {outcome}]");
            }
            Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
