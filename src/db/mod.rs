//! SQLite persistence for players and matches.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only

pub use error::DbError;
pub use models::{MatchRecord, MatchUpdate, NewMatchRecord, NewPlayer, Player};
pub use repository::{GameRepository, MIGRATIONS};
