//! Server configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::games::maze::{
    DEFAULT_MAX_INTERIOR_FILL, GridLimits, MAX_GRID_SIZE, MIN_GRID_SIZE,
};

/// Configuration for the HTTP match server.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    host: String,

    /// Port to bind to.
    #[serde(default = "default_port")]
    port: u16,

    /// SQLite database file. Empty means an in-memory store.
    #[serde(default = "default_database_path")]
    database_path: String,

    /// Smallest grid side accepted on init.
    #[serde(default = "default_min_grid_size")]
    min_grid_size: usize,

    /// Largest grid side accepted on init.
    #[serde(default = "default_max_grid_size")]
    max_grid_size: usize,

    /// Share of interior cells that may hold obstacles, in `(0, 1)`.
    #[serde(default = "default_max_interior_fill")]
    max_interior_fill: f64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    request_timeout_secs: u64,

    /// Origins allowed by CORS. Empty allows any origin.
    #[serde(default = "default_allowed_origins")]
    allowed_origins: Vec<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_database_path() -> String {
    "mazewalking.db".to_string()
}

fn default_min_grid_size() -> usize {
    MIN_GRID_SIZE
}

fn default_max_grid_size() -> usize {
    MAX_GRID_SIZE
}

fn default_max_interior_fill() -> f64 {
    DEFAULT_MAX_INTERIOR_FILL
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:5173".to_string()]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_path: default_database_path(),
            min_grid_size: default_min_grid_size(),
            max_grid_size: default_max_grid_size(),
            max_interior_fill: default_max_interior_fill(),
            request_timeout_secs: default_request_timeout_secs(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file and validates it.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!(host = %config.host, port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from TOML text and validates it.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file if it exists, otherwise starts from defaults, then
    /// applies environment overrides.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = if path.as_ref().exists() {
            Self::from_file(path)?
        } else {
            info!("Config file not found, using defaults");
            Self::default()
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `MAZE_HOST`, `MAZE_PORT` and `MAZE_DATABASE_PATH`.
    #[instrument(skip(self))]
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(host) = std::env::var("MAZE_HOST") {
            debug!(%host, "Host overridden by environment");
            self.host = host;
        }
        if let Ok(port) = std::env::var("MAZE_PORT") {
            self.port = port
                .parse()
                .map_err(|e| ConfigError::new(format!("Invalid MAZE_PORT '{}': {}", port, e)))?;
        }
        if let Ok(path) = std::env::var("MAZE_DATABASE_PATH") {
            debug!(%path, "Database path overridden by environment");
            self.database_path = path;
        }
        Ok(())
    }

    /// Overrides the bind address.
    pub fn with_address(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    /// Overrides the database path.
    pub fn with_database_path(mut self, path: Option<String>) -> Self {
        if let Some(path) = path {
            self.database_path = path;
        }
        self
    }

    /// Checks ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_grid_size < MIN_GRID_SIZE || self.min_grid_size > self.max_grid_size {
            return Err(ConfigError::new(format!(
                "Invalid grid size range {}..={}",
                self.min_grid_size, self.max_grid_size
            )));
        }
        if self.max_grid_size > MAX_GRID_SIZE {
            return Err(ConfigError::new(format!(
                "max_grid_size {} exceeds {}",
                self.max_grid_size, MAX_GRID_SIZE
            )));
        }
        if !(self.max_interior_fill > 0.0 && self.max_interior_fill < 1.0) {
            return Err(ConfigError::new(format!(
                "max_interior_fill must be in (0, 1), got {}",
                self.max_interior_fill
            )));
        }
        if self.request_timeout_secs == 0 {
            warn!("request_timeout_secs is 0; requests will time out immediately");
        }
        Ok(())
    }

    /// Grid limits for the engine.
    pub fn grid_limits(&self) -> GridLimits {
        GridLimits::new(self.min_grid_size, self.max_grid_size, self.max_interior_fill)
    }

    /// Request timeout as a duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// `host:port` string for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new config error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = ServerConfig::from_toml("").unwrap();
        assert_eq!(*config.port(), 5000);
        assert_eq!(*config.min_grid_size(), 3);
        assert_eq!(*config.max_grid_size(), 50);
    }

    #[test]
    fn partial_toml_overrides() {
        let config = ServerConfig::from_toml("port = 8080\nmax_grid_size = 20\n").unwrap();
        assert_eq!(*config.port(), 8080);
        assert_eq!(*config.grid_limits().max_size(), 20);
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn inverted_range_is_rejected() {
        let result = ServerConfig::from_toml("min_grid_size = 10\nmax_grid_size = 5\n");
        assert!(result.is_err());
    }

    #[test]
    fn fill_outside_unit_interval_is_rejected() {
        assert!(ServerConfig::from_toml("max_interior_fill = 1.0").is_err());
        assert!(ServerConfig::from_toml("max_interior_fill = 0.0").is_err());
        assert!(ServerConfig::from_toml("max_interior_fill = 0.33").is_ok());
    }

    #[test]
    fn undersized_minimum_is_rejected() {
        assert!(ServerConfig::from_toml("min_grid_size = 1").is_err());
        assert!(ServerConfig::from_toml("min_grid_size = 2").is_err());
        assert!(ServerConfig::from_toml("min_grid_size = 3").is_ok());
    }

    #[test]
    fn oversized_grid_is_rejected() {
        assert!(ServerConfig::from_toml("max_grid_size = 51").is_err());
    }
}
