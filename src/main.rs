//! Maze Walking - Unified CLI
//!
//! Serves matches over HTTP, migrates the database or prints a maze.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use maze_walking::{
    DEFAULT_MAX_INTERIOR_FILL, GameRepository, InMemoryMatchStore, MatchEngine, MatchService,
    MatchStore, MazeGenerator, RandomSource, SeededRandom, ServerConfig, SystemRandom,
    obstacle_target, router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,maze_walking=debug")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            config,
            host,
            port,
            db_path,
        } => run_server(config, host, port, db_path).await,
        Command::Migrate { db_path } => run_migrate(db_path),
        Command::Generate {
            size,
            seed,
            fill,
            json,
        } => run_generate(size, seed, fill, json),
    }
}

/// Run the HTTP match server
#[instrument(skip_all)]
async fn run_server(
    config_path: PathBuf,
    host: Option<String>,
    port: Option<u16>,
    db_path: Option<String>,
) -> Result<()> {
    let config = ServerConfig::load(&config_path)?
        .with_address(host, port)
        .with_database_path(db_path);
    config.validate()?;

    let store: Arc<dyn MatchStore> = if config.database_path().trim().is_empty() {
        warn!("No database path configured, matches are kept in memory");
        Arc::new(InMemoryMatchStore::new())
    } else {
        Arc::new(GameRepository::open(config.database_path().clone())?)
    };

    let service = MatchService::new(store, MatchEngine::new(config.grid_limits()));
    let app = router(service, config.allowed_origins(), config.request_timeout());

    let addr = config.bind_address();
    info!(%addr, database = %config.database_path(), "Starting Maze Walking server");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server ready at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

/// Apply pending migrations
#[instrument]
fn run_migrate(db_path: String) -> Result<()> {
    let repo = GameRepository::new(db_path)?;
    let applied = repo.run_migrations()?;
    println!("Applied {} migration(s)", applied);
    Ok(())
}

/// Generate and print one maze
#[instrument]
fn run_generate(size: i64, seed: Option<u64>, fill: Option<f64>, json: bool) -> Result<()> {
    let fill = fill.unwrap_or(DEFAULT_MAX_INTERIOR_FILL);
    anyhow::ensure!(fill > 0.0 && fill < 1.0, "fill must be in (0, 1), got {}", fill);
    anyhow::ensure!(size > 0, "size must be positive, got {}", size);

    let mut rng: Box<dyn RandomSource> = match seed {
        Some(seed) => Box::new(SeededRandom::new(seed)),
        None => Box::new(SystemRandom::new()),
    };
    let side = usize::try_from(size)?;
    let grid = MazeGenerator::generate(size, obstacle_target(side, fill), rng.as_mut())?;

    if json {
        println!("{}", serde_json::to_string(&grid)?);
    } else {
        println!("{}", grid.display());
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
