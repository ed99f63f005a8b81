//! # Commands Module
//!
//! Boundary operations exposed to callers. Every command takes the shared
//! [`AppState`](crate::state::AppState), the caller's token and the scope,
//! and returns `Result<T, ApiError>`.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports)
//! ├── order.rs     ◄─── create, update, remove, get, list, by-product, reorder
//! ├── report.rs    ◄─── summary, obracun
//! ├── shipping.rs  ◄─── owner suggestions, shipping account upsert
//! └── customer.rs  ◄─── customer autocomplete
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  caller ──► command(state, token, scope, request)                      │
//! │                │                                                        │
//! │                ├─► state.authorize(token) ──► Session { tenant_id }    │
//! │                │         (tenant never comes from the request)         │
//! │                ├─► ledger-db repository (one transaction per write)    │
//! │                ├─► ledger-core derivations (totals, reports)           │
//! │                ▼                                                        │
//! │  Result<T, ApiError> ──► serde_json                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod customer;
pub mod order;
pub mod report;
pub mod shipping;

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use crate::auth::{Role, StaticTokens};
    use crate::config::AppConfig;
    use crate::state::AppState;
    use ledger_core::Scope;
    use ledger_db::{Database, DbConfig};

    pub(crate) const TOKEN_A: &str = "token-a";
    pub(crate) const TOKEN_B: &str = "token-b";

    /// Fresh in-memory database with two tenants.
    pub(crate) async fn test_state() -> AppState {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let config = AppConfig {
            db_path: ":memory:".into(),
            max_connections: 1,
            page_size: 20,
            token: None,
            tenant_id: "tenant-a".to_string(),
            scope: Scope::Default,
        };
        let auth = StaticTokens::new()
            .with_token(TOKEN_A, "tenant-a", Role::Admin)
            .with_token(TOKEN_B, "tenant-b", Role::Member);
        AppState::new(db, config, Arc::new(auth))
    }
}
