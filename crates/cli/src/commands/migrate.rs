//! Database migration command.
//!
//! Migrations live in `crates/api/migrations/` and are embedded in the
//! `proshop-api` library.

use tracing::info;

use super::{CommandError, connect};

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    info!("Running migrations...");
    proshop_api::db::migrate(&pool).await?;

    info!("Migrations complete!");
    Ok(())
}
