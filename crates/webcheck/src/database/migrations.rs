use libsql::Connection;
use tracing::info;

use super::error::StoreError;
use super::models::unix_now;

/// Schema version - increment when making schema changes
const SCHEMA_VERSION: i64 = 1;

/// Run database migrations
///
/// Each applied version is recorded in `schema_migrations`, so running this
/// against an up to date database is a no-op.
pub async fn run_migrations(conn: &Connection) -> Result<(), StoreError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL,
            description TEXT
        )",
        (),
    )
    .await?;

    let current_version = get_current_version(conn).await?;

    if current_version >= SCHEMA_VERSION {
        info!("Database schema is up to date (version {})", current_version);
        return Ok(());
    }

    info!("Running migrations from version {} to {}", current_version, SCHEMA_VERSION);

    if current_version < 1 {
        run_migration_v1(conn).await?;
        record_migration(conn, 1, "Check tables").await?;
    }

    info!("Database migrations completed successfully (now at version {})", SCHEMA_VERSION);
    Ok(())
}

/// Get current schema version from database
async fn get_current_version(conn: &Connection) -> Result<i64, StoreError> {
    let mut rows = conn.query("SELECT MAX(version) FROM schema_migrations", ()).await?;

    if let Some(row) = rows.next().await? {
        let version: Option<i64> = row.get(0)?;
        Ok(version.unwrap_or(0))
    } else {
        Ok(0)
    }
}

/// Record that a migration was applied
async fn record_migration(conn: &Connection, version: i64, description: &str) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO schema_migrations (version, applied_at, description) VALUES (?, ?, ?)",
        libsql::params![version, unix_now(), description],
    )
    .await?;

    info!("Applied migration v{}: {}", version, description);
    Ok(())
}

/// Migration v1: one table per check kind, unique by url
async fn run_migration_v1(conn: &Connection) -> Result<(), StoreError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS hash_checks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            url TEXT NOT NULL UNIQUE,
            current_hash TEXT NOT NULL,
            previous_hash TEXT,
            failed_since INTEGER,
            max_down_time INTEGER NOT NULL,
            run_after INTEGER NOT NULL DEFAULT 0,
            check_frequency INTEGER NOT NULL,
            check_timeout INTEGER NOT NULL
        )",
        (),
    )
    .await?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS string_checks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            url TEXT NOT NULL UNIQUE,
            match_target TEXT NOT NULL,
            present INTEGER NOT NULL,
            failed_since INTEGER,
            max_down_time INTEGER NOT NULL,
            run_after INTEGER NOT NULL DEFAULT 0,
            check_frequency INTEGER NOT NULL,
            check_timeout INTEGER NOT NULL
        )",
        (),
    )
    .await?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS diff_checks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            url TEXT NOT NULL UNIQUE,
            current_content TEXT NOT NULL,
            failed_since INTEGER,
            max_down_time INTEGER NOT NULL,
            run_after INTEGER NOT NULL DEFAULT 0,
            check_frequency INTEGER NOT NULL,
            check_timeout INTEGER NOT NULL
        )",
        (),
    )
    .await?;

    conn.execute("CREATE INDEX IF NOT EXISTS idx_hash_checks_run_after ON hash_checks(run_after)", ()).await?;
    conn.execute("CREATE INDEX IF NOT EXISTS idx_string_checks_run_after ON string_checks(run_after)", ()).await?;
    conn.execute("CREATE INDEX IF NOT EXISTS idx_diff_checks_run_after ON diff_checks(run_after)", ()).await?;

    Ok(())
}
