//! Maze Walking library - grid maze matches served over HTTP.
//!
//! # Architecture
//!
//! - **Games**: maze generation, move rules and the match state machine
//! - **Service**: per-match locking and persistence around the engine
//! - **Store**: SQLite repository or in-memory store behind one trait
//! - **Server**: axum JSON API
//!
//! # Example
//!
//! ```no_run
//! use maze_walking::{InMemoryMatchStore, MatchEngine, MatchService, Position};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let service = MatchService::new(Arc::new(InMemoryMatchStore::new()), MatchEngine::default());
//! let created = service.init_match("alice".to_string(), 5, None).await?;
//! let _ = service
//!     .make_move(&created.match_id().to_string(), Position::new(1, 0))
//!     .await;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod db;
mod error;
mod games;
mod locks;
mod match_service;
mod server;
mod store;

// Crate-level exports - Configuration
pub use config::{ConfigError, ServerConfig};

// Crate-level exports - Persistence
pub use db::{DbError, GameRepository, MIGRATIONS, MatchRecord, MatchUpdate, NewMatchRecord, NewPlayer, Player};
pub use store::{InMemoryMatchStore, MatchStore};

// Crate-level exports - Errors
pub use error::{GameError, GameErrorKind};

// Crate-level exports - Maze game types
pub use games::maze::{
    Cell, DEFAULT_MAX_INTERIOR_FILL, Grid, GridLimits, GridShapeError, MAX_GRID_SIZE,
    MAX_PLAYER_NAME_CHARS, MIN_GRID_SIZE, MOVE_SUCCESS_MESSAGE, Match, MatchEngine, MatchId,
    MatchState, MazeGenerator, MoveApplied, MoveOutcome, NewMatch, PlayerId, Position,
    RandomSource, SeededRandom, SystemRandom, interior_cells, is_unit_step, obstacle_target,
    raw_obstacle_target, validate,
};

// Crate-level exports - Service
pub use locks::MatchLocks;
pub use match_service::{MatchService, MoveFailure, MoveReport, RandomFactory};

// Crate-level exports - HTTP server
pub use server::{
    ApiError, AppState, InitRequest, InitResponse, MoveRequest, MoveResponse, router, status_for,
};
