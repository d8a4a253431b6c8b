//! SQLite pool factory and startup schema sync.

use std::str::FromStr;

use anyhow::Context;
use bookshelf_kernel::settings::DatabaseSettings;
use bookshelf_kernel::SchemaStatement;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

/// Open the process-wide connection pool.
///
/// In-memory databases are pinned to a single connection that never
/// expires, otherwise every new connection would see an empty database.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&settings.url)
        .with_context(|| format!("invalid database url '{}'", settings.url))?
        .create_if_missing(true);

    let pool_options = if settings.is_in_memory() {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(settings.max_connections)
    };

    let pool = pool_options
        .connect_with(options)
        .await
        .with_context(|| format!("failed to connect to '{}'", settings.url))?;

    tracing::info!(target: "bookshelf-db", url = %settings.url, "database connected");

    Ok(pool)
}

/// Apply every module's schema statements.
pub async fn sync_schema(
    pool: &SqlitePool,
    statements: &[(String, SchemaStatement)],
) -> anyhow::Result<()> {
    for (module, statement) in statements {
        tracing::info!(target: "bookshelf-db", %module, id = statement.id, "applying schema");

        sqlx::query(statement.up)
            .execute(pool)
            .await
            .with_context(|| format!("failed to apply schema '{}/{}'", module, statement.id))?;
    }

    tracing::info!(target: "bookshelf-db", count = statements.len(), "database synchronized");
    Ok(())
}

/// Close the pool, waiting for checked-out connections to be returned.
pub async fn close(pool: &SqlitePool) {
    pool.close().await;
    tracing::info!(target: "bookshelf-db", "database connection closed");
}
