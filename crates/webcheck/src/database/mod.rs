/// Check storage
///
/// [`CheckStore`] is the single source of truth for check state. Two
/// backends share the contract:
/// - [`LibsqlStore`]: durable SQLite file, one table per check kind
/// - [`MemoryStore`]: in-process map for tests and dry runs
pub mod error;
pub mod memory;
pub mod migrations;
pub mod models;
pub mod pool;
pub mod repository;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use models::{CheckKind, CheckRecord, CheckSettings, CheckSpec, ParseKindError, Snapshot, unix_now};
pub use repository::LibsqlStore;

use async_trait::async_trait;

/// Storage operations used by the engine.
///
/// Every write covers a single record and lands as one unit.
#[async_trait]
pub trait CheckStore: Send + Sync {
    /// Insert a new record and return its id.
    ///
    /// Fails with [`StoreError::Duplicate`] when the kind already has a check
    /// for the url; the existing row is left untouched.
    async fn insert(&self, record: &CheckRecord) -> Result<i64, StoreError>;

    /// Records of `kind` with `run_after < now`, ascending by id
    async fn find_due(&self, kind: CheckKind, now: i64) -> Result<Vec<CheckRecord>, StoreError>;

    /// Persist the full state of an existing record
    async fn update(&self, record: &CheckRecord) -> Result<(), StoreError>;

    /// Remove the check for `url`; false when there was none
    async fn delete(&self, kind: CheckKind, url: &str) -> Result<bool, StoreError>;

    /// All records of `kind`, ascending by id
    async fn list_all(&self, kind: CheckKind) -> Result<Vec<CheckRecord>, StoreError>;
}

/// Initialize database with schema
pub async fn initialize_database(conn: &libsql::Connection) -> Result<(), StoreError> {
    migrations::run_migrations(conn).await
}
