//! Scheduler and orchestrator behavior

mod detection_tests;
mod lifecycle_tests;

pub const URL: &str = "https://example.com/page";
