//! # ledger-app: Boundary Operations for the Merch Ledger
//!
//! Thin orchestration over `ledger-core` and `ledger-db`: authenticates the
//! caller, scopes every call to the session's tenant, and turns failures
//! into serializable [`ApiError`]s.
//!
//! ## Module Organization
//! ```text
//! ledger_app/
//! ├── lib.rs          ◄─── You are here (logging bootstrap, exports)
//! ├── auth.rs         ◄─── Authenticator seam, Session, StaticTokens
//! ├── config.rs       ◄─── AppConfig from LEDGER_* variables
//! ├── state.rs        ◄─── AppState (Database + config + authenticator)
//! ├── error.rs        ◄─── ApiError / ErrorCode
//! └── commands/
//!     ├── order.rs    ◄─── create, update, remove, get, list, reorder
//!     ├── report.rs   ◄─── summary, obracun
//!     ├── shipping.rs ◄─── owners, shipping accounts
//!     └── customer.rs ◄─── customer suggestions
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! ledger_app::init_tracing();
//! let state = AppState::from_config(AppConfig::from_env()?).await?;
//! let page = commands::order::list_orders_page(&state, token, Scope::Default, request).await?;
//! ```

pub mod auth;
pub mod commands;
pub mod config;
pub mod error;
pub mod state;

pub use auth::{AuthError, Authenticator, Role, Session, StaticTokens};
pub use config::{AppConfig, ConfigError};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::AppState;

use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=ledger_db=trace` - Show trace for the database crate only
/// - Default: `info,ledger=debug,sqlx=warn`
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ledger=debug,sqlx=warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
