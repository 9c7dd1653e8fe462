/// Orchestrator - the entry point for every check operation
///
/// Owns the store, fetcher and notifier handles and wires them into the
/// scheduler. Add, delete and import operations go through here so they share
/// the validation and seeding rules of the polling path.
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::database::{CheckKind, CheckRecord, CheckSettings, CheckSpec, CheckStore};
use crate::error::{Result, WebCheckError};
use crate::import::{ImportEntry, ImportError, parse_line};
use crate::monitoring::{
    CheckExecutor, FailureTracker, FetchOutcome, Fetcher, MonitoringScheduler, PassReport,
    RecoveryPolicy, validate_url,
};
use crate::normalize::normalize;
use crate::notify::Notifier;

/// Result of adding one import line
#[derive(Debug)]
pub struct ImportOutcome {
    pub entry: ImportEntry,
    pub result: Result<CheckRecord>,
}

/// Summary of an import run
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Add attempts in file order
    pub outcomes: Vec<ImportOutcome>,
    /// Set when a bad line stopped the import; earlier lines stay applied
    pub aborted: Option<ImportError>,
}

impl ImportReport {
    pub fn added(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.added()
    }
}

pub struct Orchestrator {
    store: Arc<dyn CheckStore>,
    fetcher: Arc<dyn Fetcher>,
    scheduler: MonitoringScheduler,
}

impl Orchestrator {
    /// Create an orchestrator that announces recoveries past `max_down_time`
    pub fn new(
        store: Arc<dyn CheckStore>,
        fetcher: Arc<dyn Fetcher>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::with_policy(store, fetcher, notifier, RecoveryPolicy::default())
    }

    pub fn with_policy(
        store: Arc<dyn CheckStore>,
        fetcher: Arc<dyn Fetcher>,
        notifier: Arc<dyn Notifier>,
        policy: RecoveryPolicy,
    ) -> Self {
        let executor = CheckExecutor::new(
            store.clone(),
            fetcher.clone(),
            notifier,
            FailureTracker::new(policy),
        );
        let scheduler = MonitoringScheduler::new(store.clone(), executor);

        Self { store, fetcher, scheduler }
    }

    /// Run one pass over every check due before `now`
    pub async fn run_pass(&self, now: i64) -> PassReport {
        self.scheduler.run_pass(now).await
    }

    /// Run passes every `period` until `shutdown` resolves
    pub async fn run_forever<F>(&self, period: Duration, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        self.scheduler.run_forever(period, shutdown).await
    }

    /// Register a new check.
    ///
    /// Settings and url are validated before anything is fetched. The first
    /// fetch must answer 200; its normalized text seeds the snapshot. The new
    /// record is due on the next pass.
    pub async fn add(
        &self,
        url: &str,
        spec: &CheckSpec,
        settings: &CheckSettings,
    ) -> Result<CheckRecord> {
        settings.validate()?;
        validate_url(url)
            .map_err(|reason| WebCheckError::MalformedUrl { url: url.to_string(), reason })?;

        let timeout = Duration::from_secs(settings.check_timeout as u64);
        let (body, charset) = match self.fetcher.fetch(url, timeout).await {
            FetchOutcome::Response { status: 200, body, charset } => (body, charset),
            FetchOutcome::Response { status, .. } => {
                return Err(WebCheckError::BadStatus { url: url.to_string(), status });
            }
            FetchOutcome::ConnectionFailed { reason } => {
                return Err(WebCheckError::ConnectionFailed { url: url.to_string(), reason });
            }
            FetchOutcome::Timeout => return Err(WebCheckError::Timeout { url: url.to_string() }),
            FetchOutcome::MalformedUrl { reason } => {
                return Err(WebCheckError::MalformedUrl { url: url.to_string(), reason });
            }
        };

        let text = normalize(&body, charset.as_deref()).map_err(|e| WebCheckError::NormalizationFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let mut record = CheckRecord::new(url, spec.seed(&text), settings);
        record.id = Some(self.store.insert(&record).await?);

        info!(kind = %record.kind(), url, "Added check");
        Ok(record)
    }

    pub async fn add_hash(&self, url: &str, settings: &CheckSettings) -> Result<CheckRecord> {
        self.add(url, &CheckSpec::Hash, settings).await
    }

    pub async fn add_string(
        &self,
        url: &str,
        target: &str,
        settings: &CheckSettings,
    ) -> Result<CheckRecord> {
        self.add(url, &CheckSpec::Presence { target: target.to_string() }, settings).await
    }

    pub async fn add_diff(&self, url: &str, settings: &CheckSettings) -> Result<CheckRecord> {
        self.add(url, &CheckSpec::Diff, settings).await
    }

    /// Remove the `kind` check for `url`
    pub async fn delete(&self, kind: CheckKind, url: &str) -> Result<()> {
        if !self.store.delete(kind, url).await? {
            return Err(WebCheckError::NotFound { kind, url: url.to_string() });
        }
        info!(%kind, url, "Deleted check");
        Ok(())
    }

    /// Stored checks of `kind`, ascending by id
    pub async fn list(&self, kind: CheckKind) -> Result<Vec<CheckRecord>> {
        Ok(self.store.list_all(kind).await?)
    }

    /// Add every check listed in `contents`, in order.
    ///
    /// A failed add is recorded and the import carries on. A line that does
    /// not parse stops the import.
    pub async fn import(&self, contents: &str, defaults: &CheckSettings) -> ImportReport {
        let mut report = ImportReport::default();

        for (index, line) in contents.lines().enumerate() {
            let entry = match parse_line(index + 1, line, defaults) {
                Ok(Some(entry)) => entry,
                Ok(None) => continue,
                Err(e) => {
                    warn!(line = e.line_number(), "Aborting import: {}", e);
                    report.aborted = Some(e);
                    break;
                }
            };

            debug!(line = entry.line_number, url = %entry.url, "Importing check");
            let result = self.add(&entry.url, &entry.spec, &entry.settings).await;
            report.outcomes.push(ImportOutcome { entry, result });
        }

        info!(added = report.added(), failed = report.failed(), "Import finished");
        report
    }
}
