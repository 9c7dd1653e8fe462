use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

use crate::detection::{DetectionStrategy, DiffState, HashState, PresenceState};

/// Current time as a Unix timestamp in seconds
pub fn unix_now() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs() as i64
}

/// Detection kind of a check. Fixed when the check is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckKind {
    Hash,
    #[serde(rename = "string")]
    Presence,
    Diff,
}

impl CheckKind {
    /// Order in which a pass visits the kinds
    pub const ALL: [CheckKind; 3] = [CheckKind::Hash, CheckKind::Presence, CheckKind::Diff];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckKind::Hash => "hash",
            CheckKind::Presence => "string",
            CheckKind::Diff => "diff",
        }
    }

    /// Backing table in the SQL store
    pub fn table(&self) -> &'static str {
        match self {
            CheckKind::Hash => "hash_checks",
            CheckKind::Presence => "string_checks",
            CheckKind::Diff => "diff_checks",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown check kind `{0}`, choose either hash, string or diff")]
pub struct ParseKindError(pub String);

impl FromStr for CheckKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hash" | "md5" => Ok(CheckKind::Hash),
            "string" => Ok(CheckKind::Presence),
            "diff" => Ok(CheckKind::Diff),
            other => Err(ParseKindError(other.to_string())),
        }
    }
}

/// Stored comparison state, one variant per kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Snapshot {
    Hash(HashState),
    #[serde(rename = "string")]
    Presence(PresenceState),
    Diff(DiffState),
}

impl Snapshot {
    pub fn kind(&self) -> CheckKind {
        match self {
            Snapshot::Hash(_) => CheckKind::Hash,
            Snapshot::Presence(_) => CheckKind::Presence,
            Snapshot::Diff(_) => CheckKind::Diff,
        }
    }

    /// Detection strategy operating on this snapshot
    pub fn strategy(&mut self) -> &mut dyn DetectionStrategy {
        match self {
            Snapshot::Hash(state) => state,
            Snapshot::Presence(state) => state,
            Snapshot::Diff(state) => state,
        }
    }
}

/// What to monitor on a new check, before it has a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckSpec {
    Hash,
    Presence { target: String },
    Diff,
}

impl CheckSpec {
    pub fn kind(&self) -> CheckKind {
        match self {
            CheckSpec::Hash => CheckKind::Hash,
            CheckSpec::Presence { .. } => CheckKind::Presence,
            CheckSpec::Diff => CheckKind::Diff,
        }
    }

    /// Build the initial snapshot from the first normalized fetch
    pub fn seed(&self, text: &str) -> Snapshot {
        match self {
            CheckSpec::Hash => Snapshot::Hash(HashState::seed(text)),
            CheckSpec::Presence { target } => {
                Snapshot::Presence(PresenceState::seed(target.clone(), text))
            }
            CheckSpec::Diff => Snapshot::Diff(DiffState::seed(text)),
        }
    }
}

/// Scheduling and alerting settings for a check, all in seconds.
///
/// Negative `max_down_time` and `check_frequency` are accepted; they make the
/// check run on every pass and alert on the first failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckSettings {
    pub max_down_time: i64,
    pub check_frequency: i64,
    pub check_timeout: i64,
}

impl Default for CheckSettings {
    fn default() -> Self {
        Self { max_down_time: 86_400, check_frequency: 3_600, check_timeout: 30 }
    }
}

/// One monitored resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRecord {
    pub id: Option<i64>,
    pub url: String,
    pub snapshot: Snapshot,
    pub failed_since: Option<i64>,
    pub max_down_time: i64,
    pub run_after: i64,
    pub check_frequency: i64,
    pub check_timeout: i64,
}

impl CheckRecord {
    /// Create a healthy record that is due on the next pass
    pub fn new(url: impl Into<String>, snapshot: Snapshot, settings: &CheckSettings) -> Self {
        Self {
            id: None,
            url: url.into(),
            snapshot,
            failed_since: None,
            max_down_time: settings.max_down_time,
            run_after: 0,
            check_frequency: settings.check_frequency,
            check_timeout: settings.check_timeout,
        }
    }

    pub fn kind(&self) -> CheckKind {
        self.snapshot.kind()
    }

    /// Bound for a single fetch of this record
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.check_timeout.max(1) as u64)
    }
}
