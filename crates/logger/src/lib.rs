//! Shared tracing setup for webcheck binaries.

mod subscriber;

pub use subscriber::{LogFormat, init_with_level};
