use serde::{Deserialize, Serialize};

/// Result of a single fetch attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The server answered, whatever the status. `charset` comes from the
    /// `Content-Type` header when one was declared.
    Response { status: u16, body: Vec<u8>, charset: Option<String> },
    ConnectionFailed { reason: String },
    Timeout,
    MalformedUrl { reason: String },
}

impl FetchOutcome {
    /// Short description used in logs
    pub fn describe(&self) -> String {
        match self {
            FetchOutcome::Response { status, body, .. } => {
                format!("status {} ({} bytes)", status, body.len())
            }
            FetchOutcome::ConnectionFailed { reason } => format!("connection failed: {}", reason),
            FetchOutcome::Timeout => "timed out".to_string(),
            FetchOutcome::MalformedUrl { reason } => format!("malformed url: {}", reason),
        }
    }
}

/// What happened to one record during a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Unchanged,
    Changed,
    Unreachable,
}

/// Counts for one scheduler pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassReport {
    /// Records that were due and attempted
    pub checked: usize,
    pub unreachable: usize,
    pub changed: usize,
    /// Records skipped because of a store or normalization failure
    pub errors: usize,
}

impl PassReport {
    pub fn record(&mut self, outcome: PollOutcome) {
        self.checked += 1;
        match outcome {
            PollOutcome::Unchanged => {}
            PollOutcome::Changed => self.changed += 1,
            PollOutcome::Unreachable => self.unreachable += 1,
        }
    }

    pub fn record_error(&mut self) {
        self.checked += 1;
        self.errors += 1;
    }
}
