//! Headless storm essence host.
//!
//! Wires in-memory stand-ins for the game server (world, storms, balance
//! ledger) into the essence runtime and plays a scripted session against it.
//! Logs go to a per-session file; a summary is printed at the end.
//!
//! ```bash
//! SIM_PLAYERS=5 SIM_STEPS=300 RUST_LOG=sim=debug cargo run -p essence-sim
//! ```
mod config;
mod dirs;
mod host;
mod scenario;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use essence_content::ContentFactory;
use essence_core::{Clock, Hazard, HazardId, Position, ZoneId};
use essence_runtime::{
    FilePlayerRepository, InMemoryBalanceStore, InMemoryPlayerRepo, ManualClock,
    PlayerRepository, Runtime, RuntimeConfig, SystemClock, Topic,
};

use config::SimConfig;
use host::{SimHazards, SimWorld};
use scenario::Scenario;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = SimConfig::from_env();
    let _guard = setup_logging(&config.session_id)?;

    let data_dir = config.data_dir.clone().unwrap_or_else(dirs::data_dir);
    let content = ContentFactory::new(data_dir);
    let essence = content
        .load_config_or_default()
        .context("Failed to load essence configuration")?;

    let repository: Arc<dyn PlayerRepository> = if config.enable_persistence {
        let repo = FilePlayerRepository::new(content.players_dir())
            .context("Failed to open player directory")?;
        tracing::info!("Persistence: {}", repo.base_dir().display());
        Arc::new(repo)
    } else {
        tracing::info!("Persistence: disabled");
        Arc::new(InMemoryPlayerRepo::new())
    };

    let world = Arc::new(SimWorld::new());
    let hazards = Arc::new(SimHazards::with_hazards(vec![
        Hazard {
            id: HazardId(1),
            zone: ZoneId(0),
            center: Position::new(0.0, 64.0, 0.0),
            radius: 60.0,
        },
        Hazard {
            id: HazardId(2),
            zone: ZoneId(0),
            center: Position::new(600.0, 64.0, 0.0),
            radius: 120.0,
        },
    ]));
    let clock = ManualClock::new(SystemClock.now());

    let runtime = Runtime::builder()
        .config(RuntimeConfig::new(essence))
        .balance_store(Arc::new(InMemoryBalanceStore::new()))
        .hazards(hazards.clone())
        .world(world.clone())
        .clock(Arc::new(clock.clone()))
        .repository(repository)
        .build()
        .await?;

    let listeners: Vec<_> = runtime
        .handle()
        .subscribe_multiple(&Topic::ALL)
        .into_iter()
        .map(|(topic, mut rx)| {
            tokio::spawn(async move {
                while let Ok(event) = rx.recv().await {
                    tracing::debug!(target: "sim::events", ?topic, ?event);
                }
            })
        })
        .collect();

    tracing::info!(
        players = config.players,
        steps = config.steps,
        "Starting scenario"
    );
    let scenario = Scenario::new(runtime.handle(), world.clone(), hazards, clock, config);
    let outcome = scenario.run().await;

    runtime.shutdown().await?;
    for listener in listeners {
        listener.abort();
    }

    let statuses = outcome?;
    println!("{:<34} {:>5} {:>12} {:>12}  passives", "player", "level", "lifetime", "balance");
    for (player, status) in scenario.players().iter().zip(&statuses) {
        println!(
            "{:<34} {:>5} {:>12.1} {:>12.1}  {:?}",
            player.to_string(),
            status.level,
            status.lifetime_total,
            status.balance,
            status.active_passives
        );
    }
    println!("{:?}", world.stats());

    tracing::info!("Scenario complete");
    Ok(())
}

/// Setup logging to a per-session file.
///
/// The returned guard must be held until exit so buffered lines are flushed.
fn setup_logging(session_id: &Option<String>) -> Result<WorkerGuard> {
    let session_id = session_id.clone().unwrap_or_else(|| {
        format!("session_{}", SystemClock.now().as_millis() / 1_000)
    });

    let session_log_dir: PathBuf = dirs::log_dir().join(&session_id);
    std::fs::create_dir_all(&session_log_dir).with_context(|| {
        format!("Failed to create log directory {}", session_log_dir.display())
    })?;

    let file_appender = tracing_appender::rolling::never(&session_log_dir, "sim.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    tracing::info!("Logging initialized: session={}", session_id);
    tracing::info!("Log file: {}/sim.log", session_log_dir.display());

    Ok(guard)
}
