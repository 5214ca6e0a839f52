//! Embedded schema migrations.
//!
//! Migrations are compiled into the binary with `embed_migrations!` and can
//! be applied at startup when `database.auto_migrate` is enabled.

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

use crate::error::AppError;

/// All migrations from the `migrations/` directory, embedded at build time.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Run all pending migrations against the database.
///
/// Migration execution in diesel is synchronous, so the work is moved onto a
/// blocking thread to avoid stalling the async runtime.
///
/// # Errors
///
/// Returns `AppError::Database` if the migration connection cannot be
/// established or a migration fails to apply.
pub async fn run_pending_migrations(database_url: &str) -> Result<(), AppError> {
    let database_url = database_url.to_string();

    let applied = tokio::task::spawn_blocking(move || {
        let mut conn = PgConnection::establish(&database_url).map_err(|e| AppError::Database {
            operation: "establish migration connection".to_string(),
            source: anyhow::Error::from(e),
        })?;

        conn.run_pending_migrations(MIGRATIONS)
            .map(|versions| {
                versions
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<String>>()
            })
            .map_err(|e| AppError::Database {
                operation: "run pending migrations".to_string(),
                source: anyhow::anyhow!(e),
            })
    })
    .await
    .map_err(|e| AppError::Internal {
        source: anyhow::Error::from(e),
    })??;

    if applied.is_empty() {
        info!("Database schema is up to date");
    } else {
        info!(count = applied.len(), versions = ?applied, "Applied pending migrations");
    }

    Ok(())
}
