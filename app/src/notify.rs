//! User notification, the terminal stand-in for a blocking alert dialog.

use std::sync::Mutex;

/// Message shown when an add is rejected for blank text
pub const EMPTY_TEXT_ALERT: &str = "todo item cannot be empty";

/// Delivers a message the user has to see before continuing
pub trait Notifier: Send + Sync {
    /// Show `message` to the user
    fn alert(&self, message: &str);
}

/// Writes alerts to stderr, prefixed with `!`
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    #[allow(clippy::print_stderr)] // Writing to the terminal is the whole point
    fn alert(&self, message: &str) {
        eprintln!("! {message}");
    }
}

/// Keeps every alert in memory
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    /// Creates a notifier with no recorded alerts
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Alerts seen so far, oldest first
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }
}
