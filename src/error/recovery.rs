//! Recovery strategies and the per-category registry.
//!
//! A strategy is a declarative policy describing how the application should
//! react to faults of a category. The registry holds at most one strategy
//! per category; registering again replaces the previous one.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use super::classification::ErrorCategory;

/// How the application should react to faults of a category.
///
/// Sub-fields are optional and are not validated at registration. A
/// redirect without a URL, for example, is accepted and simply skipped at
/// dispatch time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RecoveryStrategy {
    /// Signal that the failed operation may be retried by its owner.
    Retry {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_attempts: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        delay_ms: Option<u64>,
    },
    /// Advise the presentation layer to show a fallback component.
    Fallback {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fallback_component: Option<String>,
    },
    /// Navigate away to the given URL.
    Redirect {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        redirect_url: Option<String>,
    },
    /// Do nothing beyond a diagnostic log line.
    Ignore,
}

impl RecoveryStrategy {
    /// Creates a retry strategy.
    pub fn retry(max_attempts: u32, delay: Duration) -> Self {
        Self::Retry {
            max_attempts: Some(max_attempts),
            delay_ms: Some(u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)),
        }
    }

    /// Creates a fallback strategy naming the component to show.
    pub fn fallback(component: impl Into<String>) -> Self {
        Self::Fallback {
            fallback_component: Some(component.into()),
        }
    }

    /// Creates a redirect strategy.
    pub fn redirect(url: impl Into<String>) -> Self {
        Self::Redirect {
            redirect_url: Some(url.into()),
        }
    }

    /// Creates an ignore strategy.
    pub fn ignore() -> Self {
        Self::Ignore
    }

    /// Returns the strategy's type name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Retry { .. } => "retry",
            Self::Fallback { .. } => "fallback",
            Self::Redirect { .. } => "redirect",
            Self::Ignore => "ignore",
        }
    }
}

/// What the service did (or advises) after dispatching a strategy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecoveryAction {
    /// The caller may retry; the service does not re-run anything itself.
    Retry {
        max_attempts: Option<u32>,
        delay: Option<Duration>,
    },
    /// A fallback should be shown; recorded for the presentation layer.
    ShowFallback { component: Option<String> },
    /// Navigation to `url` was performed.
    Redirected { url: String },
    /// A redirect strategy had no URL, so nothing happened.
    RedirectSkipped,
    /// The fault was deliberately ignored.
    Ignored,
}

impl RecoveryAction {
    /// Returns true if the caller is expected to retry.
    pub fn should_retry(&self) -> bool {
        matches!(self, Self::Retry { .. })
    }
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Retry {
                max_attempts,
                delay,
            } => {
                write!(f, "retry")?;
                if let Some(max) = max_attempts {
                    write!(f, " up to {} times", max)?;
                }
                if let Some(delay) = delay {
                    write!(f, " after {}ms", delay.as_millis())?;
                }
                Ok(())
            }
            Self::ShowFallback {
                component: Some(component),
            } => write!(f, "show fallback {}", component),
            Self::ShowFallback { component: None } => write!(f, "show fallback"),
            Self::Redirected { url } => write!(f, "redirected to {}", url),
            Self::RedirectSkipped => write!(f, "redirect skipped"),
            Self::Ignored => write!(f, "ignored"),
        }
    }
}

/// Registry mapping categories to their recovery strategy.
#[derive(Clone, Debug, Default)]
pub struct RecoveryRegistry {
    strategies: HashMap<ErrorCategory, RecoveryStrategy>,
}

impl RecoveryRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a strategy for a category.
    ///
    /// Any existing strategy for the category is replaced and returned.
    pub fn register(
        &mut self,
        category: ErrorCategory,
        strategy: RecoveryStrategy,
    ) -> Option<RecoveryStrategy> {
        self.strategies.insert(category, strategy)
    }

    /// Returns the strategy registered for a category.
    pub fn get(&self, category: ErrorCategory) -> Option<&RecoveryStrategy> {
        self.strategies.get(&category)
    }

    /// Returns the number of categories with a strategy.
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Returns true if no strategy has been registered.
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Iterates over registered strategies in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&ErrorCategory, &RecoveryStrategy)> {
        self.strategies.iter()
    }
}
