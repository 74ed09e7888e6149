//! Headless arena: autoplays one match against a bot profile and prints the
//! localized battle log.
//!
//! ```bash
//! ARENA_OPPONENT=pro-james BATTLE_LOCALE=pt-br cargo run -p battle-arena
//! ```
mod autoplay;
mod config;
mod dirs;

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use battle_content::ContentBundle;
use runtime::{
    BattleCoordinator, FileRecordRepository, OracleManager, RuntimeConfig, StaticRosterProvider,
    UpdateKind,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::ArenaConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let runtime_config = RuntimeConfig::from_env();
    let arena_config = ArenaConfig::from_env();

    let _guard = setup_logging()?;

    let content = match &arena_config.data_dir {
        Some(dir) => ContentBundle::load_dir(dir)
            .with_context(|| format!("loading content from {}", dir.display()))?,
        None => ContentBundle::bundled()?,
    };
    let oracles = OracleManager::from_content(content, &runtime_config.locale);
    let roster = autoplay::player_roster(&oracles, &arena_config)?;
    let rosters = StaticRosterProvider::new().with_roster(autoplay::PLAYER, roster);
    // Battle ids restart with every process, so each run gets its own folder.
    let run_dir = arena_config.records_dir.join(format!("run_{}", run_stamp()));
    let records = FileRecordRepository::new(&run_dir)?;

    let (coordinator, updates) = BattleCoordinator::builder()
        .config(runtime_config)
        .oracles(oracles)
        .rosters(rosters)
        .records(Arc::new(records))
        .build()?;

    let last = autoplay::run(&coordinator, updates, &arena_config).await?;
    match last.kind {
        UpdateKind::Finished => {
            let winner = last.session.as_ref().and_then(|session| session.winner);
            tracing::info!(target: "arena", battle = %last.battle, ?winner, "match finished");
            println!("Record saved to {}", run_dir.display());
        }
        _ => tracing::warn!(target: "arena", battle = %last.battle, "match cancelled"),
    }
    Ok(())
}

fn run_stamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

/// Logs to a file under the platform cache directory and to stderr.
fn setup_logging() -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let log_dir = dirs::log_dir();
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "arena.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    tracing::info!(target: "arena", "Log file: {}/arena.log", log_dir.display());
    Ok(guard)
}
