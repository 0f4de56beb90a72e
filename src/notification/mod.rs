//! Transient UI notifications (toasts).
//!
//! This module provides the notification types and the
//! [`NotificationCenter`] that owns their lifecycle: ordering, auto-dismiss
//! timers, manual dismissal and action handling. Presentation layers
//! subscribe to the center and render whatever it currently holds.

mod center;
mod renderer;

pub use center::NotificationCenter;
pub use renderer::NotificationRenderer;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::error::{ErrorCategory, ErrorReport, UnknownVariant};

/// The visual intent of a notification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    #[default]
    Info,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "success" => Ok(Self::Success),
            "error" => Ok(Self::Error),
            "warning" => Ok(Self::Warning),
            "info" => Ok(Self::Info),
            other => Err(UnknownVariant::new("notification kind", other)),
        }
    }
}

/// Unique identifier of a notification.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(String);

impl NotificationId {
    pub(crate) fn generate() -> Self {
        Self(format!("toast_{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NotificationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A user action attached to a notification (e.g. "Undo", "Retry").
#[derive(Clone)]
pub struct NotificationAction {
    label: String,
    on_click: Arc<dyn Fn() + Send + Sync>,
}

impl NotificationAction {
    pub fn new(label: impl Into<String>, on_click: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            label: label.into(),
            on_click: Arc::new(on_click),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Runs the click handler.
    pub fn invoke(&self) {
        (self.on_click)();
    }
}

impl fmt::Debug for NotificationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationAction")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// What a caller asks for when adding a notification.
///
/// Unset fields take the center's defaults: dismissible, not persistent,
/// and the configured default duration.
#[derive(Clone, Debug, Default)]
pub struct NotificationSpec {
    pub kind: NotificationKind,
    pub title: String,
    pub message: Option<String>,
    pub action: Option<NotificationAction>,
    pub dismissible: Option<bool>,
    pub persistent: bool,
    pub duration: Option<Duration>,
}

impl NotificationSpec {
    pub fn new(kind: NotificationKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn success(title: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, title)
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, title)
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(NotificationKind::Warning, title)
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self::new(NotificationKind::Info, title)
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn action(mut self, action: NotificationAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn dismissible(mut self, dismissible: bool) -> Self {
        self.dismissible = Some(dismissible);
        self
    }

    pub fn persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Builds an error toast for a captured report.
    pub fn from_report(report: &ErrorReport) -> Self {
        let spec = Self::error(report.category.title()).message(report.error.message.clone());
        match report.category {
            // Session problems need the user's attention until dismissed
            ErrorCategory::Auth => spec.persistent(true),
            _ => spec,
        }
    }
}

/// Shows an error toast for a captured report on `center`.
///
/// The monitoring service never calls this itself; callers that want
/// captured faults surfaced to the user opt in by calling it.
///
/// # Errors
///
/// Propagates [`NotificationCenter::add_notification`] errors.
pub fn notify_capture(
    center: &NotificationCenter,
    report: &ErrorReport,
) -> Result<NotificationId, NotificationError> {
    center.add_notification(NotificationSpec::from_report(report))
}

/// A visible notification.
#[derive(Clone, Debug)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: Option<String>,
    pub action: Option<NotificationAction>,
    pub dismissible: bool,
    pub persistent: bool,
    /// Auto-dismiss delay; `None` for persistent notifications.
    pub duration: Option<Duration>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Returns true if the notification dismisses itself.
    pub fn auto_dismisses(&self) -> bool {
        self.duration.is_some()
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {}", self.title, message),
            None => f.write_str(&self.title),
        }
    }
}

/// Why a notification left the list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DismissReason {
    /// Its auto-dismiss timer fired.
    Expired,
    /// The user (or caller) closed it.
    Manual,
    /// Its action ran and closed it.
    Action,
    /// It was pushed out by a newer notification at capacity.
    Evicted,
}

impl fmt::Display for DismissReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expired => write!(f, "expired"),
            Self::Manual => write!(f, "manual"),
            Self::Action => write!(f, "action"),
            Self::Evicted => write!(f, "evicted"),
        }
    }
}

/// Errors returned by notification center operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotificationError {
    #[error("notification title must not be empty")]
    EmptyTitle,

    #[error("notification not found: {0}")]
    NotFound(NotificationId),

    #[error("notification {0} has no action")]
    NoAction(NotificationId),
}
