//! # ledger-db: Database Layer for the Merch Ledger
//!
//! SQLite storage for orders, catalog snapshots, shipping accounts and
//! customer suggestions, using sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ledger-app operation (createOrder, obracun, ...)                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    ledger-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │   │   │
//! │  │   │               │    │ OrderRepo      │   │              │   │   │
//! │  │   │ SqlitePool    │◄───│ CatalogRepo    │   │ 001_initial  │   │   │
//! │  │   │               │    │ ShippingAcct   │   │              │   │   │
//! │  │   │               │    │ CustomerRepo   │   │              │   │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (platform data dir or LEDGER_DB_PATH)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ledger_core::Scope;
//! use ledger_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("ledger.db")).await?;
//! let order = db.orders().create("tenant-a", Scope::Default, &input).await?;
//! let all = db.orders().list_all("tenant-a", Scope::Default).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::catalog::CatalogRepository;
pub use repository::customer::CustomerRepository;
pub use repository::order::OrderRepository;
pub use repository::shipping_account::ShippingAccountRepository;
