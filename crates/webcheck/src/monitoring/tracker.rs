use serde::{Deserialize, Serialize};

use crate::database::CheckRecord;

/// When to announce that a failing check answers again
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryPolicy {
    /// Only if the outage lasted at least `max_down_time`
    #[default]
    Threshold,
    /// On every recovery
    Always,
}

/// Effect of a fetch result on a record's failure state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    /// The record changed and must be written back
    pub persist: bool,
    pub alert: Option<String>,
}

/// Healthy/failing state machine driven by `failed_since`.
///
/// A record is healthy while `failed_since` is `None` and failing since that
/// timestamp otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailureTracker {
    policy: RecoveryPolicy,
}

impl FailureTracker {
    pub fn new(policy: RecoveryPolicy) -> Self {
        Self { policy }
    }

    /// Apply a failed attempt at `now`.
    ///
    /// The down alert is repeated on every failing pass once the outage
    /// reaches `max_down_time`.
    pub fn record_failure(&self, record: &mut CheckRecord, now: i64) -> Transition {
        let mut transition = Transition::default();

        let since = match record.failed_since {
            Some(since) => since,
            None => {
                record.failed_since = Some(now);
                transition.persist = true;
                now
            }
        };

        if now.saturating_sub(since) >= record.max_down_time {
            transition.alert = Some(format!("Warning: can't connect to {}", record.url));
        }
        transition
    }

    /// Apply a successful attempt. `last_attempt` is when the check last ran,
    /// which for a failing record is its last failed attempt.
    pub fn record_success(&self, record: &mut CheckRecord, last_attempt: i64) -> Transition {
        let Some(since) = record.failed_since.take() else {
            return Transition::default();
        };

        let announce = match self.policy {
            RecoveryPolicy::Always => true,
            RecoveryPolicy::Threshold => last_attempt.saturating_sub(since) >= record.max_down_time,
        };

        Transition {
            persist: true,
            alert: announce.then(|| format!("Reestablished connection to {}", record.url)),
        }
    }
}
