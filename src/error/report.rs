//! Captured error reports and the context attached to them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

use super::classification::{ErrorCategory, Severity};

/// Length of the random part of an error id.
const ID_SUFFIX_LEN: usize = 12;

/// Unique identifier of a captured error.
///
/// Ids have the form `err_<unix millis>_<random hex>` so they sort roughly by
/// capture time and can be correlated with logs.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorId(String);

impl ErrorId {
    /// Generates a fresh id stamped with the current time.
    pub fn generate() -> Self {
        Self::generate_at(Utc::now())
    }

    pub(crate) fn generate_at(at: DateTime<Utc>) -> Self {
        let random = Uuid::new_v4().simple().to_string();
        Self(format!(
            "err_{}_{}",
            at.timestamp_millis(),
            &random[..ID_SUFFIX_LEN]
        ))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ErrorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ErrorId> for String {
    fn from(id: ErrorId) -> Self {
        id.0
    }
}

impl PartialEq<str> for ErrorId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// The underlying fault of a report: a message plus an optional trace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedError {
    /// Type or kind name of the fault, when known (e.g. `TypeError`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Human-readable message.
    pub message: String,
    /// Stack trace or cause chain, one frame per line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl CapturedError {
    /// Creates a fault from a bare message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            name: None,
            message: message.into(),
            stack: None,
        }
    }

    /// Sets the fault's type name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the stack trace.
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Builds a fault from a Rust error, recording its `source()` chain as
    /// the stack.
    pub fn from_error(error: &(dyn std::error::Error + 'static)) -> Self {
        let mut chain = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            chain.push(format!("caused by: {}", cause));
            source = cause.source();
        }

        Self {
            name: None,
            message: error.to_string(),
            stack: if chain.is_empty() {
                None
            } else {
                Some(chain.join("\n"))
            },
        }
    }
}

impl fmt::Display for CapturedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}: {}", name, self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl From<&str> for CapturedError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for CapturedError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// Where in the application a fault happened.
///
/// Callers pass a scope to attach feature/component/action information to
/// the report context.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorScope {
    pub feature: Option<String>,
    pub component: Option<String>,
    pub action: Option<String>,
}

impl ErrorScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feature(mut self, feature: impl Into<String>) -> Self {
        self.feature = Some(feature.into());
        self
    }

    pub fn component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }
}

/// Environment information captured alongside every report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorContext {
    pub timestamp: DateTime<Utc>,
    pub url: String,
    pub user_agent: String,
    pub session_id: String,
    pub build_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl ErrorContext {
    /// Copies the scope's fields into the context.
    pub fn with_scope(mut self, scope: ErrorScope) -> Self {
        self.feature = scope.feature;
        self.component = scope.component;
        self.action = scope.action;
        self
    }
}

/// A single captured error with its classification and context.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub error_id: ErrorId,
    pub error: CapturedError,
    pub severity: Severity,
    pub category: ErrorCategory,
    pub context: ErrorContext,
    /// Caller-supplied data; not interpreted by the service.
    #[serde(default)]
    pub additional_data: HashMap<String, serde_json::Value>,
}

impl ErrorReport {
    /// One-line summary used in log output.
    pub fn summary(&self) -> String {
        format!(
            "[{}/{}] {} ({})",
            self.severity, self.category, self.error, self.error_id
        )
    }
}
