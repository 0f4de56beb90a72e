//! Error monitoring and recovery module
//!
//! This module provides the error monitoring service: capture and
//! classification of faults, a bounded in-memory report log, best-effort
//! forwarding to an external sink, and per-category recovery strategies.

pub mod boundary;
pub mod classification;
pub mod context;
pub mod detector;
pub mod recovery;
pub mod report;
pub mod service;
pub mod sink;

// Re-export main types for convenient access
pub use boundary::{BoundaryError, FaultBoundary, FaultSink};
pub use classification::{ErrorCategory, Severity, UnknownVariant};
pub use context::RuntimeContext;
pub use detector::{Detection, ErrorDetector, ErrorPattern};
pub use recovery::{RecoveryAction, RecoveryRegistry, RecoveryStrategy};
pub use report::{CapturedError, ErrorContext, ErrorId, ErrorReport, ErrorScope};
pub use service::{
    CaptureOutcome, CaptureRequest, ErrorMonitoringService, ErrorMonitoringServiceBuilder,
    ErrorSummary, FallbackAdvice,
};
pub use sink::{ErrorSink, HttpSink, MemorySink, SinkError, SinkResult};
