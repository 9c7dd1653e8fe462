use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info, warn};

use super::executor::CheckExecutor;
use super::types::PassReport;
use crate::database::{CheckKind, CheckStore, unix_now};
use crate::error::WebCheckError;

/// Monitoring scheduler - runs passes over every due check
pub struct MonitoringScheduler {
    store: Arc<dyn CheckStore>,
    executor: CheckExecutor,
}

impl MonitoringScheduler {
    pub fn new(store: Arc<dyn CheckStore>, executor: CheckExecutor) -> Self {
        Self { store, executor }
    }

    /// Poll every record with `run_after < now`, kind by kind, oldest id
    /// first. A failing record is logged and counted; the pass carries on.
    pub async fn run_pass(&self, now: i64) -> PassReport {
        let mut report = PassReport::default();

        for kind in CheckKind::ALL {
            let due = match self.store.find_due(kind, now).await {
                Ok(due) => due,
                Err(e) => {
                    error!(%kind, "Failed to load due checks: {}", e);
                    report.errors += 1;
                    continue;
                }
            };

            for record in due {
                let url = record.url.clone();
                match self.executor.poll(record, now).await {
                    Ok(outcome) => report.record(outcome),
                    Err(e @ WebCheckError::NormalizationFailed { .. }) => {
                        warn!(%kind, %url, "Skipping check: {}", e);
                        report.record_error();
                    }
                    Err(e) => {
                        error!(%kind, %url, "Check failed: {}", e);
                        report.record_error();
                    }
                }
            }
        }

        info!(
            checked = report.checked,
            changed = report.changed,
            unreachable = report.unreachable,
            errors = report.errors,
            "Pass finished"
        );
        report
    }

    /// Run a pass every `period` until `shutdown` resolves.
    ///
    /// Shutdown is only observed between passes; a pass in progress always
    /// completes.
    pub async fn run_forever<F>(&self, period: Duration, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping watch loop");
                    break;
                }
                _ = ticker.tick() => {
                    info!("Starting pass");
                    self.run_pass(unix_now()).await;
                }
            }
        }
    }
}
