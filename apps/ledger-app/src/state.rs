//! # Application State
//!
//! Everything a boundary operation needs: the database handle, the loaded
//! configuration and the authentication seam.
//!
//! ## Thread Safety
//! `Database` wraps a `SqlitePool`, which is thread-safe; configuration is
//! read-only after startup and the authenticator is `Send + Sync`. One
//! `AppState` can be shared by every concurrent request without locking.

use std::sync::Arc;

use tracing::info;

use crate::auth::{Authenticator, Role, Session, StaticTokens};
use crate::config::AppConfig;
use crate::error::ApiResult;
use ledger_db::Database;

/// Shared state handed to every command.
#[derive(Clone)]
pub struct AppState {
    db: Database,
    config: AppConfig,
    auth: Arc<dyn Authenticator>,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig, auth: Arc<dyn Authenticator>) -> Self {
        AppState { db, config, auth }
    }

    /// Connects to the configured database and installs a static token
    /// authenticator for `LEDGER_TOKEN`, if one is set.
    pub async fn from_config(config: AppConfig) -> ApiResult<Self> {
        let db = Database::new(config.db_config()).await?;
        info!(path = %config.db_path.display(), "Database connected and migrations applied");

        let mut tokens = StaticTokens::new();
        if let Some(token) = &config.token {
            tokens = tokens.with_token(token.clone(), config.tenant_id.clone(), Role::Admin);
        }

        Ok(AppState::new(db, config, Arc::new(tokens)))
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Resolves the caller. Runs before any domain logic.
    pub fn authorize(&self, token: &str) -> ApiResult<Session> {
        Ok(self.auth.authenticate(token)?)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("db", &self.db)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
