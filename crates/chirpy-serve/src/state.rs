//! Application state and configuration.

use std::path::PathBuf;
use std::sync::Arc;

use crate::db::Database;
use crate::hits::HitCounter;

/// Platform name that unlocks the admin reset endpoint.
pub const DEV_PLATFORM: &str = "dev";

/// Application configuration loaded from environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:8080").
    pub bind_addr: String,

    /// Path to the SQLite database file.
    pub db_path: PathBuf,

    /// Deployment platform (e.g., "dev"). Admin reset only works on dev.
    pub platform: String,

    /// Directory served under `/app/`.
    pub filepath_root: PathBuf,

    /// Port for the Prometheus `/metrics` endpoint (disabled when unset).
    pub metrics_port: Option<u16>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `DB_PATH`: SQLite database path (`:memory:` for a throwaway database)
    /// - `PLATFORM`: Deployment platform, e.g. `dev`
    ///
    /// Optional environment variables:
    /// - `CHIRPY_BIND_ADDR`: Server bind address (default: "0.0.0.0:8080")
    /// - `FILEPATH_ROOT`: Static file root for `/app/` (default: ".")
    /// - `METRICS_PORT`: Prometheus metrics port
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr =
            std::env::var("CHIRPY_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let db_path: PathBuf = required_var("DB_PATH")?.into();
        let platform = required_var("PLATFORM")?;

        let filepath_root: PathBuf = std::env::var("FILEPATH_ROOT")
            .unwrap_or_else(|_| ".".to_string())
            .into();

        let metrics_port = match std::env::var("METRICS_PORT") {
            Ok(port) => Some(
                port.trim()
                    .parse::<u16>()
                    .map_err(|e| anyhow::anyhow!("METRICS_PORT is not a valid port: {e}"))?,
            ),
            Err(_) => None,
        };

        tracing::info!(
            bind_addr = %bind_addr,
            db_path = ?db_path,
            platform = %platform,
            filepath_root = ?filepath_root,
            metrics_port = ?metrics_port,
            "configuration loaded"
        );

        Ok(Self {
            bind_addr,
            db_path,
            platform,
            filepath_root,
            metrics_port,
        })
    }

    /// Whether destructive admin operations are allowed.
    pub fn is_dev(&self) -> bool {
        self.platform == DEV_PLATFORM
    }
}

fn required_var(name: &str) -> anyhow::Result<String> {
    let value = std::env::var(name)
        .map_err(|_| anyhow::anyhow!("{name} environment variable is required"))?;

    if value.trim().is_empty() {
        anyhow::bail!("{name} must not be empty");
    }

    Ok(value)
}

/// Shared application state available to all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Chirp and user storage.
    pub db: Database,

    /// Hits on the static file server.
    pub hits: HitCounter,

    /// Application configuration.
    pub config: Arc<Config>,
}

impl AppState {
    /// Open the configured database and build the application state.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let db = Database::open(&config.db_path)?;
        tracing::info!(path = ?config.db_path, "database opened");

        Ok(Self::with_database(config, db))
    }

    /// Build the application state around an already-open database.
    pub fn with_database(config: Config, db: Database) -> Self {
        Self {
            db,
            hits: HitCounter::new(),
            config: Arc::new(config),
        }
    }
}
