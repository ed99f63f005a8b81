//! # Database Migrations
//!
//! Embedded SQL migrations for the ledger schema.
//!
//! ## How Migrations Work
//! ```text
//! Database::new(config)
//!       │
//!       ▼
//! Check _sqlx_migrations table (created if missing)
//!       │
//!       ▼
//! Compare embedded migrations vs applied
//!       │
//!       ├── 001_initial_schema.sql ✓ (already applied)
//!       └── 002_....sql            ⬜ (pending, runs now)
//!       │
//!       ▼
//! Record checksum + timestamp in _sqlx_migrations
//! ```
//!
//! ## Adding New Migrations
//!
//! 1. Create a new file in `migrations/sqlite/` with the next sequence number
//! 2. Name format: `NNN_description.sql`
//! 3. **NEVER** modify existing migrations - always add new ones

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

/// Embedded migrations from the workspace `migrations/sqlite` directory.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Runs all pending database migrations. Idempotent.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!("Checking for pending migrations");

    MIGRATOR.run(pool).await?;

    info!("All migrations applied successfully");
    Ok(())
}

/// Returns `(total_migrations, applied_migrations)` for diagnostics.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    // The bookkeeping table is missing until the first run
    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    Ok((total, applied as usize))
}
