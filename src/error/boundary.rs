//! Fault boundary: the entry point the hosting runtime calls on faults that
//! escaped every handler.
//!
//! The boundary talks to the capture logic only through the narrow
//! [`FaultSink`] interface. Uncaught faults are reported with severity
//! `high` and category `unknown`; failed background tasks (the async
//! equivalent of an unhandled rejection) with severity `high` and category
//! `network`.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;

use super::classification::{ErrorCategory, Severity};
use super::report::{CapturedError, ErrorId};
use super::service::ErrorMonitoringService;

static PANIC_HOOK_INSTALLED: AtomicBool = AtomicBool::new(false);

/// Errors raised while wiring the boundary into the host.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoundaryError {
    /// The panic hook can only be installed once per process.
    #[error("panic hook is already installed")]
    AlreadyInstalled,
}

/// Receives faults reported by a [`FaultBoundary`].
pub trait FaultSink: Send + Sync {
    fn on_fault(&self, fault: CapturedError, severity: Severity, category: ErrorCategory) -> ErrorId;
}

impl FaultSink for ErrorMonitoringService {
    fn on_fault(&self, fault: CapturedError, severity: Severity, category: ErrorCategory) -> ErrorId {
        self.capture_error(fault, severity, category, None)
    }
}

/// Routes host-level faults into a [`FaultSink`].
#[derive(Clone)]
pub struct FaultBoundary {
    sink: Arc<dyn FaultSink>,
}

impl FaultBoundary {
    pub fn new(sink: Arc<dyn FaultSink>) -> Self {
        Self { sink }
    }

    /// Reports a fault nothing else handled.
    pub fn report_uncaught(&self, message: impl Into<String>, stack: Option<String>) -> ErrorId {
        let mut fault = CapturedError::new(message).with_name("UncaughtError");
        fault.stack = stack;
        self.sink.on_fault(fault, Severity::High, ErrorCategory::Unknown)
    }

    /// Reports an async operation that failed without anyone awaiting its
    /// error.
    pub fn report_unhandled_rejection(&self, reason: impl Into<String>) -> ErrorId {
        let fault = CapturedError::new(reason).with_name("UnhandledRejection");
        self.sink.on_fault(fault, Severity::High, ErrorCategory::Network)
    }

    /// Routes panics to [`Self::report_uncaught`], then to the previously
    /// installed hook.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError::AlreadyInstalled`] if any boundary already
    /// installed its hook in this process.
    pub fn install_panic_hook(&self) -> Result<(), BoundaryError> {
        if PANIC_HOOK_INSTALLED
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(BoundaryError::AlreadyInstalled);
        }

        let boundary = self.clone();
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let payload = info.payload();
            let message = if let Some(s) = payload.downcast_ref::<&str>() {
                (*s).to_string()
            } else if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else {
                "panic with non-string payload".to_string()
            };
            let location = info
                .location()
                .map(|l| format!("at {}:{}:{}", l.file(), l.line(), l.column()));

            boundary.report_uncaught(message, location);
            previous(info);
        }));

        tracing::debug!("Panic hook installed");
        Ok(())
    }

    /// Awaits a spawned task and reports its failure.
    ///
    /// Returns the task's value on success. A returned error or a panic is
    /// reported as an unhandled rejection and yields `None`; cancellation is
    /// not a fault.
    pub async fn watch_task<T, E>(&self, handle: JoinHandle<Result<T, E>>) -> Option<T>
    where
        E: fmt::Display,
    {
        match handle.await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                self.report_unhandled_rejection(e.to_string());
                None
            }
            Err(join_error) if join_error.is_cancelled() => {
                tracing::debug!("Watched task was cancelled");
                None
            }
            Err(join_error) => {
                self.report_unhandled_rejection(format!("task panicked: {}", join_error));
                None
            }
        }
    }
}

impl fmt::Debug for FaultBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FaultBoundary").finish_non_exhaustive()
    }
}

impl ErrorMonitoringService {
    /// Creates a fault boundary feeding this service.
    pub fn fault_boundary(&self) -> FaultBoundary {
        FaultBoundary::new(Arc::new(self.clone()))
    }
}
