use serde::{Deserialize, Serialize};

use super::DetectionStrategy;

/// Tracked substring and whether it was present on the last fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceState {
    pub target: String,
    pub present: bool,
}

impl PresenceState {
    pub fn seed(target: String, text: &str) -> Self {
        let present = text.contains(target.as_str());
        Self { target, present }
    }
}

impl DetectionStrategy for PresenceState {
    fn evaluate(&mut self, url: &str, text: &str) -> Option<String> {
        let present = text.contains(self.target.as_str());
        if present == self.present {
            return None;
        }

        self.present = present;
        if present {
            Some(format!("{} is now present on {url}", self.target))
        } else {
            Some(format!("{} is no longer present on {url}", self.target))
        }
    }
}
