//! Notification sinks.
//!
//! The engine hands every alert and change report to a [`Notifier`]. Where
//! those messages end up is the sink's business.

use std::sync::{Mutex, PoisonError};

/// Output sink for alert and status text
pub trait Notifier: Send + Sync {
    fn emit(&self, message: &str);
}

/// Writes each notification to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn emit(&self, message: &str) {
        println!("{message}");
    }
}

/// Buffers notifications in memory until they are taken.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    messages: Mutex<Vec<String>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything emitted so far
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Drain the buffer
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.messages.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Notifier for CollectingNotifier {
    fn emit(&self, message: &str) {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner).push(message.to_string());
    }
}
