//! # Database Migrations
//!
//! Embedded SQL migrations for the desk database.
//!
//! ```text
//!   startup ──► _sqlx_migrations present? ──► compare with embedded set
//!                                                  │
//!               001_initial_schema.sql  ✓ applied  │
//!               002_...                 ⬜ pending ─┴─► run in order, record
//! ```
//!
//! New migrations go in `migrations/sqlite/` as `NNN_description.sql`.
//! Existing files are never edited.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

/// Migrations embedded from `migrations/sqlite` at compile time.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Runs all pending database migrations. Safe to call repeatedly.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!("Checking for pending migrations");

    MIGRATOR.run(pool).await?;

    info!("All migrations applied successfully");
    Ok(())
}

/// Returns `(total_migrations, applied_migrations)` for diagnostics.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await?;

    Ok((total, applied as usize))
}
