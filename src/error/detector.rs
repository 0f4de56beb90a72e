//! Error pattern detector for free-text fault messages
//!
//! Faults coming from fetch wrappers, view code or the host shell usually
//! arrive as plain strings. This module uses regex patterns, checked in
//! priority order, to infer the category (and a suggested severity) of such
//! messages, and maps HTTP status codes the same way.

use regex::Regex;

use super::classification::{ErrorCategory, Severity};

/// A pattern for matching fault messages.
#[derive(Debug, Clone)]
pub struct ErrorPattern {
    /// The compiled regex pattern.
    regex: Regex,
    /// The category to assign when this pattern matches.
    category: ErrorCategory,
    /// The severity suggested for matching faults.
    severity: Severity,
    /// A human-readable description of what this pattern detects.
    description: String,
}

impl ErrorPattern {
    /// Creates a new error pattern, compiling `pattern`.
    pub fn new(
        pattern: &str,
        category: ErrorCategory,
        severity: Severity,
        description: impl Into<String>,
    ) -> Result<Self, regex::Error> {
        Ok(Self::with_regex(
            Regex::new(pattern)?,
            category,
            severity,
            description,
        ))
    }

    /// Creates a new error pattern with a pre-compiled regex.
    pub fn with_regex(
        regex: Regex,
        category: ErrorCategory,
        severity: Severity,
        description: impl Into<String>,
    ) -> Self {
        Self {
            regex,
            category,
            severity,
            description: description.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Checks if this pattern matches the given text.
    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Finds the first match in the text and returns the matched string.
    pub fn find<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.regex.find(text).map(|m| m.as_str())
    }
}

/// The outcome of classifying a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub category: ErrorCategory,
    pub severity: Severity,
    pub description: String,
    /// The fragment of the input that matched.
    pub matched: String,
}

/// Default patterns, highest priority first.
const DEFAULT_PATTERNS: &[(&str, ErrorCategory, Severity, &str)] = &[
    // Auth before api so that "HTTP 401" is not treated as a generic API error
    (
        r"(?i)\b(401|403)\b",
        ErrorCategory::Auth,
        Severity::High,
        "HTTP 401/403 status code",
    ),
    (
        r"(?i)\b(unauthori[sz]ed|forbidden|session\s+expired|not\s+(logged|signed)\s+in|invalid\s+token|jwt\s+expired)\b",
        ErrorCategory::Auth,
        Severity::High,
        "Authentication failure message",
    ),
    (
        r"(?i)\b422\b",
        ErrorCategory::Validation,
        Severity::Low,
        "HTTP 422 status code",
    ),
    (
        r"(?i)\b(validation|invalid|required|must\s+be|out\s+of\s+range)\b",
        ErrorCategory::Validation,
        Severity::Low,
        "Validation failure message",
    ),
    (
        r"(?i)(failed\s+to\s+fetch|fetch\s+failed|\bnetwork\b|\boffline\b|ECONNREFUSED|ECONNRESET|ENOTFOUND|connection\s+(refused|reset)|dns)",
        ErrorCategory::Network,
        Severity::Medium,
        "Network connectivity failure",
    ),
    (
        r"(?i)(timed?\s*out|\btimeout\b|\b408\b|\b504\b)",
        ErrorCategory::Network,
        Severity::Medium,
        "Request timeout",
    ),
    (
        r"(?i)(long\s+task|\bslow\b|exceeded\s+.*budget|memory\s+pressure)",
        ErrorCategory::Performance,
        Severity::Low,
        "Performance budget exceeded",
    ),
    (
        r"(?i)\b5\d\d\b",
        ErrorCategory::Api,
        Severity::High,
        "HTTP 5xx status code",
    ),
    (
        r"(?i)(\bapi\b|internal\s+server\s+error|bad\s+gateway|service\s+unavailable|unexpected\s+(response|token))",
        ErrorCategory::Api,
        Severity::Medium,
        "Backend API failure",
    ),
    (
        r"(?i)(hydration|\brender(ing)?\b|\bcomponent\b|is\s+not\s+a\s+function|cannot\s+read\s+propert)",
        ErrorCategory::Component,
        Severity::Medium,
        "View component failure",
    ),
];

/// Error detector that classifies fault messages using pattern matching.
#[derive(Debug, Clone)]
pub struct ErrorDetector {
    /// The list of patterns to match against, in priority order.
    patterns: Vec<ErrorPattern>,
}

impl Default for ErrorDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorDetector {
    /// Creates a detector with the built-in patterns.
    pub fn new() -> Self {
        Self {
            patterns: Self::default_patterns(),
        }
    }

    /// Creates a detector with custom patterns.
    pub fn with_patterns(patterns: Vec<ErrorPattern>) -> Self {
        Self { patterns }
    }

    fn default_patterns() -> Vec<ErrorPattern> {
        DEFAULT_PATTERNS
            .iter()
            .filter_map(|(pattern, category, severity, description)| {
                match ErrorPattern::new(pattern, *category, *severity, *description) {
                    Ok(pattern) => Some(pattern),
                    Err(e) => {
                        tracing::warn!(error = %e, "Skipping invalid built-in error pattern");
                        None
                    }
                }
            })
            .collect()
    }

    /// Appends a pattern with the lowest priority.
    pub fn add_pattern(&mut self, pattern: ErrorPattern) {
        self.patterns.push(pattern);
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    pub fn patterns(&self) -> &[ErrorPattern] {
        &self.patterns
    }

    /// Classifies a message with the first matching pattern.
    pub fn detect(&self, text: &str) -> Option<Detection> {
        self.patterns.iter().find_map(|pattern| {
            pattern.find(text).map(|matched| Detection {
                category: pattern.category,
                severity: pattern.severity,
                description: pattern.description.clone(),
                matched: matched.to_string(),
            })
        })
    }

    /// Returns the category of a message, or `Unknown` if nothing matches.
    pub fn categorize(&self, text: &str) -> ErrorCategory {
        self.detect(text)
            .map(|detection| detection.category)
            .unwrap_or_default()
    }

    /// Classifies an HTTP status code returned by the backend.
    ///
    /// Returns `None` for non-error statuses.
    pub fn classify_status(&self, status: u16) -> Option<(ErrorCategory, Severity)> {
        match status {
            401 | 403 => Some((ErrorCategory::Auth, Severity::High)),
            408 | 504 => Some((ErrorCategory::Network, Severity::Medium)),
            400 | 422 => Some((ErrorCategory::Validation, Severity::Low)),
            429 => Some((ErrorCategory::Api, Severity::Medium)),
            402..=499 => Some((ErrorCategory::Api, Severity::Medium)),
            500..=599 => Some((ErrorCategory::Api, Severity::High)),
            _ => None,
        }
    }
}
