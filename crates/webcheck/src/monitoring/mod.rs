/// Monitoring engine module - polls checks and reports what changed
///
/// This module is responsible for:
/// - Fetching monitored resources
/// - Tracking failing resources and raising down/recovery alerts
/// - Running scheduled passes over due checks
pub mod checker;
pub mod executor;
pub mod scheduler;
pub mod tracker;
pub mod types;
pub mod validation;

pub use checker::{Fetcher, HttpFetcher};
pub use executor::CheckExecutor;
pub use scheduler::MonitoringScheduler;
pub use tracker::{FailureTracker, RecoveryPolicy, Transition};
pub use types::{FetchOutcome, PassReport, PollOutcome};
pub use validation::validate_url;
