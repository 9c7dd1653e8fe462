use thiserror::Error;

use super::models::CheckKind;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database query failed: {0}")]
    QueryFailure(#[from] libsql::Error),

    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("An entry for {url} already exists in the {kind} checks")]
    Duplicate { kind: CheckKind, url: String },

    #[error("No {kind} check with id {id}")]
    NotFound { kind: CheckKind, id: i64 },

    #[error("The {kind} check for {url} has not been persisted yet")]
    NotPersistent { kind: CheckKind, url: String },
}

impl StoreError {
    /// Whether a libsql error is a UNIQUE constraint violation
    pub(crate) fn is_unique_violation(err: &libsql::Error) -> bool {
        err.to_string().contains("UNIQUE constraint failed")
    }
}
