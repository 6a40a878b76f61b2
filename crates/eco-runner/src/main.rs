//! Headless driver running a wrapped and a bordered world side by side.
//!
//! Usage: `eco-runner [config.json]`. While running, type `p` to pause,
//! `r` to resume, an empty line to toggle and `q` to quit.

mod reporter;
mod runner;
mod telemetry;

use anyhow::{Context, Result};
use eco_core::{MapKind, RunnerConfig};
use eco_world::WorldMap;
use reporter::Tile;
use runner::{RunnerHandle, SimulationRunner};
use std::sync::Arc;
use tokio::signal;
use tokio::time::Duration;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => RunnerConfig::from_json_file(&path)
            .with_context(|| format!("failed to load config from {}", path))?,
        None => RunnerConfig::default(),
    };

    telemetry::init_telemetry(config.json_logs)?;

    info!(
        width = config.world.width,
        height = config.world.height,
        animals = config.world.initial_animals,
        tick_interval_ms = config.tick_interval_ms,
        "Starting ecosystem runner"
    );

    let worlds = vec![
        WorldMap::new(config.world.clone(), MapKind::Wrapped)?,
        WorldMap::new(config.world.clone(), MapKind::Bordered)?,
    ];

    let (runner, handle, updates) = SimulationRunner::new(
        worlds,
        Duration::from_millis(config.tick_interval_ms),
        config.max_days,
        config.start_paused,
    );
    let handle = Arc::new(handle);

    let reporter = tokio::spawn(reporter::report(
        updates,
        config.world.width,
        config.world.height,
    ));
    let simulation = tokio::spawn(runner.run());
    spawn_controls(handle.clone());

    let signal_handle = handle.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_handle.stop();
    });

    let worlds = simulation.await?;

    let boards = reporter.await?;
    for (kind, board) in &boards {
        info!(
            kind = %kind,
            animals = board.count(|t| matches!(t, Tile::Animal { .. })),
            grass = board.count(|t| *t == Tile::Grass),
            "Final board\n{}",
            board.render()
        );
    }

    for world in &worlds {
        let stats = world.stats();
        info!(
            kind = %stats.kind,
            days = stats.day,
            living = stats.living,
            dead = stats.dead,
            average_lifespan = ?stats.average_lifespan,
            dominant_genome = ?world.most_common_genome().map(|g| g.to_string()),
            "Final population"
        );
    }

    Ok(())
}

/// Read pause/resume/quit commands from stdin on a plain thread so a
/// pending read never holds up shutdown.
fn spawn_controls(handle: Arc<RunnerHandle>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else {
                break;
            };
            match line.trim() {
                "p" => handle.pause(),
                "r" => handle.resume(),
                "" => handle.toggle(),
                "q" => {
                    handle.stop();
                    break;
                }
                other => warn!(command = other, "Unknown command (p, r, q or empty line)"),
            }
            info!(state = ?handle.state(), "Runner state");
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
