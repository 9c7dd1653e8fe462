use serde::{Deserialize, Serialize};

use super::DetectionStrategy;
use crate::normalize::digest;

/// Digest of the last seen text plus the one before it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashState {
    pub current: String,
    pub previous: Option<String>,
}

impl HashState {
    pub fn seed(text: &str) -> Self {
        Self { current: digest(text), previous: None }
    }
}

impl DetectionStrategy for HashState {
    fn evaluate(&mut self, url: &str, text: &str) -> Option<String> {
        let digest = digest(text);
        if digest == self.current {
            return None;
        }

        let message = if self.previous.as_deref() == Some(digest.as_str()) {
            format!("The content hash for {url} has been reverted")
        } else {
            format!("The content hash for {url} has changed")
        };

        let prior = std::mem::replace(&mut self.current, digest);
        self.previous = Some(prior);
        Some(message)
    }
}
