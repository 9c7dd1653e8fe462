/// Change detection strategies
///
/// Each check kind keeps its own comparison state and decides on its own what
/// counts as a change:
/// - `hash`: digest of the normalized text, with one generation of history
/// - `string`: whether a substring is present in the normalized text
/// - `diff`: the normalized text itself, reported as a context diff
pub mod diff;
pub mod hash;
pub mod presence;

pub use diff::{DiffState, context_diff};
pub use hash::HashState;
pub use presence::PresenceState;

/// Comparison of freshly fetched text against stored state.
///
/// Only called after a successful fetch. Implementations compare against the
/// state they hold, never against another fetch, and update it in place when
/// they report a change.
pub trait DetectionStrategy {
    /// Returns the notification to emit when the resource changed
    fn evaluate(&mut self, url: &str, text: &str) -> Option<String>;
}
