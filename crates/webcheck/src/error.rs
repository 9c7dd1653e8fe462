use thiserror::Error;

use crate::database::{CheckKind, StoreError};

/// Errors reported by add, delete and poll operations.
///
/// None of these end the process; callers get them back as values.
#[derive(Debug, Error)]
pub enum WebCheckError {
    #[error("Could not connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Timed out waiting for {url}")]
    Timeout { url: String },

    #[error("{status} code from server for {url}")]
    BadStatus { url: String, status: u16 },

    #[error("Invalid url {url}: {reason}")]
    MalformedUrl { url: String, reason: String },

    #[error("Failed to normalize response from {url}: {reason}")]
    NormalizationFailed { url: String, reason: String },

    #[error("An entry for {url} is already in the {kind} checks")]
    DuplicateKey { kind: CheckKind, url: String },

    #[error("{0}")]
    InvalidConfiguration(String),

    #[error("There is no {kind} check for {url}")]
    NotFound { kind: CheckKind, url: String },

    #[error(transparent)]
    Storage(StoreError),
}

impl From<StoreError> for WebCheckError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { kind, url } => WebCheckError::DuplicateKey { kind, url },
            other => WebCheckError::Storage(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, WebCheckError>;
