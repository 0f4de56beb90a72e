//! Stayfront - error monitoring and toast notifications for the rental
//! booking front end.
//!
//! Two independent pieces live here:
//! - [`error::ErrorMonitoringService`] captures, classifies and retains
//!   faults, forwards them to a collection endpoint in production and runs
//!   per-category recovery strategies.
//! - [`notification::NotificationCenter`] holds the ordered list of visible
//!   toasts and dismisses them on their own timers.

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod navigation;
pub mod notification;
pub mod ui;

pub use config::{MonitoringConfig, NotificationConfig, RuntimeMode, StayfrontConfig};
pub use error::{ErrorCategory, ErrorMonitoringService, ErrorReport, Severity};
pub use notification::{NotificationCenter, NotificationSpec};
