//! # Application Configuration
//!
//! Configuration is loaded from `LEDGER_*` environment variables with
//! fallback to defaults.
//!
//! | Variable                 | Default                          |
//! |--------------------------|----------------------------------|
//! | `LEDGER_DB_PATH`         | platform data dir + `ledger.db`  |
//! | `LEDGER_MAX_CONNECTIONS` | 5                                |
//! | `LEDGER_PAGE_SIZE`       | 20                               |
//! | `LEDGER_TOKEN`           | unset                            |
//! | `LEDGER_TENANT_ID`       | `default`                        |
//! | `LEDGER_SCOPE`           | `default`                        |
//!
//! Read-only after startup.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use ledger_core::{Scope, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use ledger_db::DbConfig;

/// Tenant used when none is configured (single-tenant mode).
pub const DEFAULT_TENANT_ID: &str = "default";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// SQLite database file
    pub db_path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// Page size used by `list_orders` when the caller passes none
    pub page_size: u32,

    /// Static session token accepted by the built-in authenticator
    pub token: Option<String>,

    /// Tenant the static token resolves to
    pub tenant_id: String,

    /// Scope used by the report binary
    pub scope: Scope,
}

impl AppConfig {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = match lookup("LEDGER_DB_PATH") {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_database_path()?,
        };

        let max_connections: u32 = parse_or(&lookup, "LEDGER_MAX_CONNECTIONS", 5)?;
        if max_connections == 0 {
            return Err(ConfigError::InvalidValue("LEDGER_MAX_CONNECTIONS".to_string()));
        }

        let page_size: u32 = parse_or(&lookup, "LEDGER_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidValue("LEDGER_PAGE_SIZE".to_string()));
        }

        let scope = match lookup("LEDGER_SCOPE") {
            Some(tag) => Scope::parse(tag.trim())
                .ok_or_else(|| ConfigError::InvalidValue("LEDGER_SCOPE".to_string()))?,
            None => Scope::Default,
        };

        Ok(AppConfig {
            db_path,
            max_connections,
            page_size,
            token: lookup("LEDGER_TOKEN").filter(|t| !t.trim().is_empty()),
            tenant_id: lookup("LEDGER_TENANT_ID")
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TENANT_ID.to_string()),
            scope,
        })
    }

    /// Database pool settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.db_path).max_connections(self.max_connections)
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        None => Ok(default),
    }
}

/// Determines the database file path based on the platform.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.merch.ledger/ledger.db`
/// - **Windows**: `%APPDATA%\merch\ledger\data\ledger.db`
/// - **Linux**: `~/.local/share/ledger/ledger.db`
fn default_database_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs = ProjectDirs::from("com", "merch", "ledger").ok_or_else(|| {
        ConfigError::MissingRequired("LEDGER_DB_PATH (no platform data directory)".to_string())
    })?;

    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir).map_err(|e| ConfigError::Io(e.to_string()))?;

    Ok(data_dir.join("ledger.db"))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Could not prepare data directory: {0}")]
    Io(String),
}

// =============================================================================
// Unit Tests
// =============================================================================
