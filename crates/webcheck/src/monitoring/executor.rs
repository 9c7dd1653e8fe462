use std::sync::Arc;
use tracing::debug;

use super::checker::Fetcher;
use super::tracker::{FailureTracker, Transition};
use super::types::{FetchOutcome, PollOutcome};
use crate::database::{CheckRecord, CheckStore};
use crate::error::{Result, WebCheckError};
use crate::normalize::normalize;
use crate::notify::Notifier;

/// Polls a single record: schedule, fetch, track failures, detect changes
pub struct CheckExecutor {
    store: Arc<dyn CheckStore>,
    fetcher: Arc<dyn Fetcher>,
    notifier: Arc<dyn Notifier>,
    tracker: FailureTracker,
}

impl CheckExecutor {
    pub fn new(
        store: Arc<dyn CheckStore>,
        fetcher: Arc<dyn Fetcher>,
        notifier: Arc<dyn Notifier>,
        tracker: FailureTracker,
    ) -> Self {
        Self { store, fetcher, notifier, tracker }
    }

    /// Run one attempt for a due record.
    ///
    /// The next run is persisted before the fetch goes out, so a crash
    /// mid-attempt does not cause an immediate retry.
    pub async fn poll(&self, mut record: CheckRecord, now: i64) -> Result<PollOutcome> {
        let previous_run_after = record.run_after;
        record.run_after = now.saturating_add(record.check_frequency);
        self.store.update(&record).await?;

        let outcome = self.fetcher.fetch(&record.url, record.timeout()).await;
        debug!(kind = %record.kind(), url = %record.url, outcome = %outcome.describe(), "Polled check");

        let FetchOutcome::Response { status: 200, body, charset } = outcome else {
            let transition = self.tracker.record_failure(&mut record, now);
            self.apply(&record, transition).await?;
            return Ok(PollOutcome::Unreachable);
        };

        let last_attempt = previous_run_after.saturating_sub(record.check_frequency);
        let transition = self.tracker.record_success(&mut record, last_attempt);
        self.apply(&record, transition).await?;

        let text = normalize(&body, charset.as_deref()).map_err(|e| {
            WebCheckError::NormalizationFailed { url: record.url.clone(), reason: e.to_string() }
        })?;

        let url = record.url.clone();
        match record.snapshot.strategy().evaluate(&url, &text) {
            Some(message) => {
                self.store.update(&record).await?;
                self.notifier.emit(&message);
                Ok(PollOutcome::Changed)
            }
            None => Ok(PollOutcome::Unchanged),
        }
    }

    async fn apply(&self, record: &CheckRecord, transition: Transition) -> Result<()> {
        if transition.persist {
            self.store.update(record).await?;
        }
        if let Some(alert) = transition.alert {
            self.notifier.emit(&alert);
        }
        Ok(())
    }
}
