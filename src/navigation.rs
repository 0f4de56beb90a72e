//! Navigation primitive used by redirect recovery strategies.
//!
//! The hosting shell decides what "navigate" means (a full page load in a
//! browser, a route change in a desktop shell). The monitoring service only
//! needs the narrow [`Navigator`] interface.

use std::sync::Mutex;

/// Changes the current location of the application.
pub trait Navigator: Send + Sync {
    /// Performs a full navigation to `url`.
    fn navigate(&self, url: &str);
}

/// Navigator that only logs the requested target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn navigate(&self, url: &str) {
        tracing::info!(target_url = %url, "Navigation requested");
    }
}

/// Navigator that remembers every target it was asked to visit.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the visited targets, oldest first.
    pub fn history(&self) -> Vec<String> {
        match self.history.lock() {
            Ok(history) => history.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Returns the most recent target.
    pub fn current(&self) -> Option<String> {
        self.history().pop()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &str) {
        tracing::debug!(target_url = %url, "Recording navigation");
        match self.history.lock() {
            Ok(mut history) => history.push(url.to_string()),
            Err(poisoned) => poisoned.into_inner().push(url.to_string()),
        }
    }
}
