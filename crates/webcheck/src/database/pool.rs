//! Pooled connections to a local libsql database

use deadpool::managed::{self, Object, Pool, RecycleError, RecycleResult};
use libsql::{Connection, Database};

use super::error::StoreError;

/// Passes run one record at a time, so a handful of connections is plenty
const MAX_CONNECTIONS: usize = 4;

pub type ConnectionPool = Pool<ConnectionManager>;
pub type PooledConnection = Object<ConnectionManager>;

pub struct ConnectionManager {
    database: Database,
}

impl managed::Manager for ConnectionManager {
    type Type = Connection;
    type Error = libsql::Error;

    async fn create(&self) -> Result<Connection, libsql::Error> {
        self.database.connect()
    }

    /// A returned connection is reused only while it still answers `SELECT 1`
    async fn recycle(
        &self,
        conn: &mut Connection,
        _: &managed::Metrics,
    ) -> RecycleResult<libsql::Error> {
        let mut rows = conn.query("SELECT 1", ()).await?;
        match rows.next().await? {
            Some(row) if row.get::<i64>(0)? == 1 => Ok(()),
            _ => Err(RecycleError::message("health check returned no row")),
        }
    }
}

pub fn build(database: Database) -> Result<ConnectionPool, StoreError> {
    Pool::builder(ConnectionManager { database })
        .max_size(MAX_CONNECTIONS)
        .build()
        .map_err(|e| StoreError::Pool(e.to_string()))
}

pub async fn checkout(pool: &ConnectionPool) -> Result<PooledConnection, StoreError> {
    pool.get().await.map_err(|e| StoreError::Pool(e.to_string()))
}
