//! Command-line interface for maze_walking.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Maze Walking - grid maze match server
#[derive(Parser, Debug)]
#[command(name = "maze_walking")]
#[command(about = "Maze match server with a JSON API", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP match server
    Serve {
        /// Path to the TOML config file (defaults apply when missing)
        #[arg(short, long, default_value = "maze_walking.toml")]
        config: PathBuf,

        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// SQLite database file; an empty value keeps matches in memory
        #[arg(long)]
        db_path: Option<String>,
    },

    /// Apply pending database migrations and exit
    Migrate {
        /// Path to the database file (created if it doesn't exist)
        #[arg(long, default_value = "mazewalking.db")]
        db_path: String,
    },

    /// Generate one maze and print it
    Generate {
        /// Grid side length
        #[arg(short, long, default_value = "10")]
        size: i64,

        /// Seed for a reproducible maze
        #[arg(long)]
        seed: Option<u64>,

        /// Share of interior cells that may hold obstacles
        #[arg(long)]
        fill: Option<f64>,

        /// Print the grid as JSON cell codes instead of text
        #[arg(long)]
        json: bool,
    },
}
