use async_trait::async_trait;
use libsql::{Row, Rows, params};
use std::path::Path;
use tracing::debug;

use super::error::StoreError;
use super::models::{CheckKind, CheckRecord, Snapshot};
use super::pool::{self, ConnectionPool, PooledConnection};
use super::{CheckStore, initialize_database};
use crate::detection::{DiffState, HashState, PresenceState};

/// Columns shared by every check table, in row order
const COMMON_COLUMNS: &str =
    "id, url, failed_since, max_down_time, run_after, check_frequency, check_timeout";

/// LibSQL database implementation
pub struct LibsqlStore {
    pool: ConnectionPool,
}

impl LibsqlStore {
    /// Open (or create) the database file at `path` and bring its schema up
    /// to date.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Opening check database");

        let database = libsql::Builder::new_local(path).build().await?;
        let store = Self { pool: pool::build(database)? };
        let conn = store.get_conn().await?;
        initialize_database(&conn).await?;
        Ok(store)
    }

    /// Get a connection from the pool
    async fn get_conn(&self) -> Result<PooledConnection, StoreError> {
        pool::checkout(&self.pool).await
    }
}

fn select_sql(kind: CheckKind, filter: &str) -> String {
    format!(
        "SELECT {COMMON_COLUMNS}, {} FROM {} {filter} ORDER BY id",
        snapshot_columns(kind),
        kind.table()
    )
}

fn snapshot_columns(kind: CheckKind) -> &'static str {
    match kind {
        CheckKind::Hash => "current_hash, previous_hash",
        CheckKind::Presence => "match_target, present",
        CheckKind::Diff => "current_content",
    }
}

fn row_to_record(kind: CheckKind, row: &Row) -> Result<CheckRecord, StoreError> {
    let snapshot = match kind {
        CheckKind::Hash => {
            Snapshot::Hash(HashState { current: row.get(7)?, previous: row.get(8)? })
        }
        CheckKind::Presence => Snapshot::Presence(PresenceState {
            target: row.get(7)?,
            present: row.get::<i64>(8)? != 0,
        }),
        CheckKind::Diff => Snapshot::Diff(DiffState { content: row.get(7)? }),
    };

    Ok(CheckRecord {
        id: Some(row.get(0)?),
        url: row.get(1)?,
        snapshot,
        failed_since: row.get(2)?,
        max_down_time: row.get(3)?,
        run_after: row.get(4)?,
        check_frequency: row.get(5)?,
        check_timeout: row.get(6)?,
    })
}

async fn collect_records(kind: CheckKind, mut rows: Rows) -> Result<Vec<CheckRecord>, StoreError> {
    let mut records = Vec::new();
    while let Some(row) = rows.next().await? {
        records.push(row_to_record(kind, &row)?);
    }
    Ok(records)
}

#[async_trait]
impl CheckStore for LibsqlStore {
    async fn insert(&self, record: &CheckRecord) -> Result<i64, StoreError> {
        let kind = record.kind();
        let conn = self.get_conn().await?;

        let mut existing = conn
            .query(&format!("SELECT id FROM {} WHERE url = ?", kind.table()), params![record.url.clone()])
            .await?;
        if existing.next().await?.is_some() {
            return Err(StoreError::Duplicate { kind, url: record.url.clone() });
        }

        let inserted = match &record.snapshot {
            Snapshot::Hash(state) => {
                conn.execute(
                    "INSERT INTO hash_checks (url, current_hash, previous_hash, failed_since, max_down_time, run_after, check_frequency, check_timeout) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                    params![
                        record.url.clone(),
                        state.current.clone(),
                        state.previous.clone(),
                        record.failed_since,
                        record.max_down_time,
                        record.run_after,
                        record.check_frequency,
                        record.check_timeout
                    ],
                )
                .await
            }
            Snapshot::Presence(state) => {
                conn.execute(
                    "INSERT INTO string_checks (url, match_target, present, failed_since, max_down_time, run_after, check_frequency, check_timeout) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                    params![
                        record.url.clone(),
                        state.target.clone(),
                        i64::from(state.present),
                        record.failed_since,
                        record.max_down_time,
                        record.run_after,
                        record.check_frequency,
                        record.check_timeout
                    ],
                )
                .await
            }
            Snapshot::Diff(state) => {
                conn.execute(
                    "INSERT INTO diff_checks (url, current_content, failed_since, max_down_time, run_after, check_frequency, check_timeout) VALUES (?, ?, ?, ?, ?, ?, ?)",
                    params![
                        record.url.clone(),
                        state.content.clone(),
                        record.failed_since,
                        record.max_down_time,
                        record.run_after,
                        record.check_frequency,
                        record.check_timeout
                    ],
                )
                .await
            }
        };

        match inserted {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(err) if StoreError::is_unique_violation(&err) => {
                Err(StoreError::Duplicate { kind, url: record.url.clone() })
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn find_due(&self, kind: CheckKind, now: i64) -> Result<Vec<CheckRecord>, StoreError> {
        let conn = self.get_conn().await?;
        let rows = conn.query(&select_sql(kind, "WHERE run_after < ?"), params![now]).await?;
        collect_records(kind, rows).await
    }

    async fn update(&self, record: &CheckRecord) -> Result<(), StoreError> {
        let kind = record.kind();
        let Some(id) = record.id else {
            return Err(StoreError::NotPersistent { kind, url: record.url.clone() });
        };
        let conn = self.get_conn().await?;

        let affected = match &record.snapshot {
            Snapshot::Hash(state) => {
                conn.execute(
                    "UPDATE hash_checks SET current_hash = ?, previous_hash = ?, failed_since = ?, max_down_time = ?, run_after = ?, check_frequency = ?, check_timeout = ? WHERE id = ?",
                    params![
                        state.current.clone(),
                        state.previous.clone(),
                        record.failed_since,
                        record.max_down_time,
                        record.run_after,
                        record.check_frequency,
                        record.check_timeout,
                        id
                    ],
                )
                .await?
            }
            Snapshot::Presence(state) => {
                conn.execute(
                    "UPDATE string_checks SET match_target = ?, present = ?, failed_since = ?, max_down_time = ?, run_after = ?, check_frequency = ?, check_timeout = ? WHERE id = ?",
                    params![
                        state.target.clone(),
                        i64::from(state.present),
                        record.failed_since,
                        record.max_down_time,
                        record.run_after,
                        record.check_frequency,
                        record.check_timeout,
                        id
                    ],
                )
                .await?
            }
            Snapshot::Diff(state) => {
                conn.execute(
                    "UPDATE diff_checks SET current_content = ?, failed_since = ?, max_down_time = ?, run_after = ?, check_frequency = ?, check_timeout = ? WHERE id = ?",
                    params![
                        state.content.clone(),
                        record.failed_since,
                        record.max_down_time,
                        record.run_after,
                        record.check_frequency,
                        record.check_timeout,
                        id
                    ],
                )
                .await?
            }
        };

        if affected == 0 {
            return Err(StoreError::NotFound { kind, id });
        }
        Ok(())
    }

    async fn delete(&self, kind: CheckKind, url: &str) -> Result<bool, StoreError> {
        let conn = self.get_conn().await?;
        let affected = conn
            .execute(&format!("DELETE FROM {} WHERE url = ?", kind.table()), params![url])
            .await?;
        Ok(affected > 0)
    }

    async fn list_all(&self, kind: CheckKind) -> Result<Vec<CheckRecord>, StoreError> {
        let conn = self.get_conn().await?;
        let rows = conn.query(&select_sql(kind, ""), ()).await?;
        collect_records(kind, rows).await
    }
}
