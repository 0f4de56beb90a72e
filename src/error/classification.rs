//! Error classification types for the monitoring service
//!
//! Captured faults are classified along two axes: how serious they are
//! (severity) and where they came from (category). Recovery strategies are
//! registered per category.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How serious a captured fault is.
///
/// Severities are ordered, so `Severity::Low < Severity::Critical`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Cosmetic or easily ignored faults.
    Low,
    /// Faults that degrade a feature (the default).
    #[default]
    Medium,
    /// Faults that break a feature for the user.
    High,
    /// Faults that make the application unusable.
    Critical,
}

impl Severity {
    /// All severities, lowest first.
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    /// Returns the lowercase name used in reports and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    /// Returns true for severities that warrant paging someone.
    pub fn is_urgent(&self) -> bool {
        *self >= Severity::High
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => Err(UnknownVariant::new("severity", other)),
        }
    }
}

/// The functional origin of a captured fault.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    /// Connectivity failures (offline, DNS, aborted fetches).
    Network,
    /// The backend answered with an error status or malformed payload.
    Api,
    /// A view component failed to render or update.
    Component,
    /// Session expired, missing credentials or forbidden access.
    Auth,
    /// User input was rejected.
    Validation,
    /// Slow renders, long tasks, budget overruns.
    Performance,
    /// Anything that could not be classified.
    #[default]
    Unknown,
}

impl ErrorCategory {
    /// All categories in declaration order.
    pub const ALL: [ErrorCategory; 7] = [
        ErrorCategory::Network,
        ErrorCategory::Api,
        ErrorCategory::Component,
        ErrorCategory::Auth,
        ErrorCategory::Validation,
        ErrorCategory::Performance,
        ErrorCategory::Unknown,
    ];

    /// Returns the lowercase name used in reports and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Api => "api",
            ErrorCategory::Component => "component",
            ErrorCategory::Auth => "auth",
            ErrorCategory::Validation => "validation",
            ErrorCategory::Performance => "performance",
            ErrorCategory::Unknown => "unknown",
        }
    }

    /// A short human-readable title, used for toasts and panels.
    pub fn title(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Connection problem",
            ErrorCategory::Api => "Server error",
            ErrorCategory::Component => "Display error",
            ErrorCategory::Auth => "Session expired",
            ErrorCategory::Validation => "Invalid input",
            ErrorCategory::Performance => "Slow response",
            ErrorCategory::Unknown => "Something went wrong",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorCategory {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "network" => Ok(ErrorCategory::Network),
            "api" => Ok(ErrorCategory::Api),
            "component" => Ok(ErrorCategory::Component),
            "auth" => Ok(ErrorCategory::Auth),
            "validation" => Ok(ErrorCategory::Validation),
            "performance" => Ok(ErrorCategory::Performance),
            "unknown" => Ok(ErrorCategory::Unknown),
            other => Err(UnknownVariant::new("category", other)),
        }
    }
}

/// Returned when parsing a severity or category name fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: '{value}'")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

impl UnknownVariant {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
