//! webcheck - change detection for monitored web pages
//!
//! This library polls registered URLs on a schedule, normalizes what comes
//! back, and reports when a page changes or stops answering. State lives in a
//! [`CheckStore`] so results stay stable across restarts.

pub mod database;
pub mod detection;
pub mod error;
pub mod import;
pub mod monitoring;
pub mod normalize;
pub mod notify;
pub mod orchestrator;

// Re-export main types
pub use database::{
    CheckKind, CheckRecord, CheckSettings, CheckSpec, CheckStore, LibsqlStore, MemoryStore,
    Snapshot, StoreError, unix_now,
};
pub use error::{Result, WebCheckError};
pub use import::{ImportEntry, ImportError};
pub use monitoring::{FetchOutcome, Fetcher, HttpFetcher, PassReport, RecoveryPolicy};
pub use notify::{CollectingNotifier, ConsoleNotifier, Notifier};
pub use orchestrator::{ImportOutcome, ImportReport, Orchestrator};
