//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;

use broadcaster::BroadcastConfig;

/// Admin web server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Bearer token for operator routes. Unset means open.
    pub operator_token: Option<String>,
    /// Delivery and feed tunables.
    pub broadcast: BroadcastConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `ADMIN_ADDR` | Server bind address | `127.0.0.1:8788` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:outbreak.db?mode=rwc` |
    /// | `OPERATOR_TOKEN` | Bearer token for operator routes | (none) |
    ///
    /// Broadcast tunables are read by [`BroadcastConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("ADMIN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8788".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url = env::var("SQLITE_PATH")
            .unwrap_or_else(|_| "sqlite:outbreak.db?mode=rwc".to_string());

        let operator_token = env::var("OPERATOR_TOKEN")
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let broadcast = BroadcastConfig::from_env()?;

        Ok(Self {
            addr,
            database_url,
            operator_token,
            broadcast,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid ADMIN_ADDR format")]
    InvalidAddr,

    #[error(transparent)]
    Broadcast(#[from] broadcaster::ConfigError),
}
