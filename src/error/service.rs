//! The error monitoring service.
//!
//! A single service instance is constructed by the application's
//! composition root and handed out as a cheaply clonable handle. It is the
//! terminal sink for errors routed through it: capturing never fails and
//! never propagates errors back to the caller.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, error, info, warn};

use super::classification::{ErrorCategory, Severity};
use super::context::RuntimeContext;
use super::detector::ErrorDetector;
use super::recovery::{RecoveryAction, RecoveryRegistry, RecoveryStrategy};
use super::report::{CapturedError, ErrorId, ErrorReport, ErrorScope};
use super::sink::{ErrorSink, HttpSink, SinkResult};
use crate::config::MonitoringConfig;
use crate::metrics::{MetricsTracker, PerformanceMetrics};
use crate::navigation::{LoggingNavigator, Navigator};

/// A capture request with optional classification, scope and data.
///
/// Unset fields default to severity `medium` and category `unknown`.
#[derive(Debug, Clone)]
pub struct CaptureRequest {
    error: CapturedError,
    severity: Severity,
    category: ErrorCategory,
    scope: ErrorScope,
    additional_data: HashMap<String, serde_json::Value>,
}

impl CaptureRequest {
    pub fn new(error: impl Into<CapturedError>) -> Self {
        Self {
            error: error.into(),
            severity: Severity::default(),
            category: ErrorCategory::default(),
            scope: ErrorScope::default(),
            additional_data: HashMap::new(),
        }
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn category(mut self, category: ErrorCategory) -> Self {
        self.category = category;
        self
    }

    pub fn scope(mut self, scope: ErrorScope) -> Self {
        self.scope = scope;
        self
    }

    /// Adds one entry of caller-supplied data.
    pub fn data(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.additional_data.insert(key.into(), value.into());
        self
    }

    /// Replaces the caller-supplied data.
    pub fn additional_data(mut self, data: HashMap<String, serde_json::Value>) -> Self {
        self.additional_data = data;
        self
    }
}

/// The result of a capture: the report id and the recovery that ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureOutcome {
    pub error_id: ErrorId,
    /// `None` when no strategy is registered for the category.
    pub action: Option<RecoveryAction>,
}

/// An outstanding advice to show a fallback component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackAdvice {
    pub category: ErrorCategory,
    pub component: Option<String>,
    /// The report that triggered the fallback.
    pub error_id: ErrorId,
}

/// Counts of retained reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSummary {
    pub total: usize,
    pub by_severity: BTreeMap<String, usize>,
    pub by_category: BTreeMap<String, usize>,
}

struct Inner {
    config: MonitoringConfig,
    context: RwLock<RuntimeContext>,
    reports: RwLock<VecDeque<ErrorReport>>,
    registry: RwLock<RecoveryRegistry>,
    fallbacks: RwLock<HashMap<ErrorCategory, FallbackAdvice>>,
    metrics: MetricsTracker,
    detector: ErrorDetector,
    sink: Option<Arc<dyn ErrorSink>>,
    navigator: Arc<dyn Navigator>,
}

/// Builder for [`ErrorMonitoringService`].
pub struct ErrorMonitoringServiceBuilder {
    config: MonitoringConfig,
    context: Option<RuntimeContext>,
    detector: ErrorDetector,
    sink: Option<Arc<dyn ErrorSink>>,
    navigator: Arc<dyn Navigator>,
}

impl ErrorMonitoringServiceBuilder {
    /// Sets the runtime context (url, user agent, session).
    pub fn context(mut self, context: RuntimeContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Sets the sink used for production forwarding.
    pub fn sink(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Sets the navigation primitive used by redirect strategies.
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    /// Sets the detector used by [`ErrorMonitoringService::capture_message`].
    pub fn detector(mut self, detector: ErrorDetector) -> Self {
        self.detector = detector;
        self
    }

    pub fn build(self) -> ErrorMonitoringService {
        let context = self
            .context
            .unwrap_or_else(|| RuntimeContext::new(self.config.build_version.clone()));

        debug!(
            mode = %self.config.mode,
            max_reports = self.config.max_reports,
            has_sink = self.sink.is_some(),
            "Error monitoring service initialized"
        );

        ErrorMonitoringService {
            inner: Arc::new(Inner {
                config: self.config,
                context: RwLock::new(context),
                reports: RwLock::new(VecDeque::new()),
                registry: RwLock::new(RecoveryRegistry::new()),
                fallbacks: RwLock::new(HashMap::new()),
                metrics: MetricsTracker::new(),
                detector: self.detector,
                sink: self.sink,
                navigator: self.navigator,
            }),
        }
    }
}

/// Captures, retains, forwards and recovers from application errors.
#[derive(Clone)]
pub struct ErrorMonitoringService {
    inner: Arc<Inner>,
}

impl ErrorMonitoringService {
    /// Creates a service with the given configuration and default
    /// collaborators (no sink, logging navigator).
    pub fn new(config: MonitoringConfig) -> Self {
        Self::builder(config).build()
    }

    /// Starts building a service.
    pub fn builder(config: MonitoringConfig) -> ErrorMonitoringServiceBuilder {
        ErrorMonitoringServiceBuilder {
            config,
            context: None,
            detector: ErrorDetector::new(),
            sink: None,
            navigator: Arc::new(LoggingNavigator),
        }
    }

    /// Creates a builder wired to an [`HttpSink`] when the configuration
    /// names an endpoint.
    pub fn builder_from_config(
        config: MonitoringConfig,
    ) -> SinkResult<ErrorMonitoringServiceBuilder> {
        let sink: Option<Arc<dyn ErrorSink>> = match &config.sink_endpoint {
            Some(endpoint) => Some(Arc::new(HttpSink::new(
                endpoint.clone(),
                config.sink_timeout(),
            )?)),
            None => None,
        };

        let mut builder = Self::builder(config);
        builder.sink = sink;
        Ok(builder)
    }

    pub fn config(&self) -> &MonitoringConfig {
        &self.inner.config
    }

    /// Captures an error and returns its id.
    pub fn capture_error(
        &self,
        error: impl Into<CapturedError>,
        severity: Severity,
        category: ErrorCategory,
        additional_data: Option<HashMap<String, serde_json::Value>>,
    ) -> ErrorId {
        let request = CaptureRequest::new(error)
            .severity(severity)
            .category(category)
            .additional_data(additional_data.unwrap_or_default());
        self.capture(request).error_id
    }

    /// Captures an error with scope information.
    pub fn capture_with_scope(
        &self,
        error: impl Into<CapturedError>,
        severity: Severity,
        category: ErrorCategory,
        scope: ErrorScope,
    ) -> ErrorId {
        let request = CaptureRequest::new(error)
            .severity(severity)
            .category(category)
            .scope(scope);
        self.capture(request).error_id
    }

    /// Captures a free-text message, inferring its category.
    pub fn capture_message(&self, message: impl Into<String>, severity: Severity) -> ErrorId {
        let message = message.into();
        let category = self.inner.detector.categorize(&message);
        self.capture_error(message, severity, category, None)
    }

    /// Captures a request and reports which recovery ran.
    pub fn capture(&self, request: CaptureRequest) -> CaptureOutcome {
        let error_id = ErrorId::generate();
        let context = read(&self.inner.context).snapshot(request.scope);

        let report = ErrorReport {
            error_id: error_id.clone(),
            error: request.error,
            severity: request.severity,
            category: request.category,
            context,
            additional_data: request.additional_data,
        };

        self.retain(report.clone());

        if self.inner.config.mode.is_production() {
            self.forward(report.clone());
        } else {
            log_report(&report);
        }

        let action = self.dispatch_recovery(&report);

        CaptureOutcome { error_id, action }
    }

    fn retain(&self, report: ErrorReport) {
        let capacity = self.inner.config.max_reports.max(1);
        let mut reports = write(&self.inner.reports);
        while reports.len() >= capacity {
            if let Some(dropped) = reports.pop_front() {
                debug!(error_id = %dropped.error_id, "Dropping oldest error report");
            }
        }
        reports.push_back(report);
    }

    fn forward(&self, report: ErrorReport) {
        let Some(sink) = self.inner.sink.clone() else {
            return;
        };

        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = sink.send(&report).await {
                        warn!(
                            sink = sink.name(),
                            error_id = %report.error_id,
                            error = %e,
                            "Failed to forward error report"
                        );
                    }
                });
            }
            Err(_) => {
                warn!(
                    error_id = %report.error_id,
                    "No async runtime available; error report not forwarded"
                );
            }
        }
    }

    fn dispatch_recovery(&self, report: &ErrorReport) -> Option<RecoveryAction> {
        let strategy = read(&self.inner.registry).get(report.category).cloned()?;

        let action = match strategy {
            RecoveryStrategy::Retry {
                max_attempts,
                delay_ms,
            } => {
                info!(
                    error_id = %report.error_id,
                    category = %report.category,
                    max_attempts = ?max_attempts,
                    delay_ms = ?delay_ms,
                    "Retry recovery requested"
                );
                RecoveryAction::Retry {
                    max_attempts,
                    delay: delay_ms.map(Duration::from_millis),
                }
            }
            RecoveryStrategy::Fallback { fallback_component } => {
                info!(
                    error_id = %report.error_id,
                    category = %report.category,
                    component = ?fallback_component,
                    "Fallback recovery requested"
                );
                write(&self.inner.fallbacks).insert(
                    report.category,
                    FallbackAdvice {
                        category: report.category,
                        component: fallback_component.clone(),
                        error_id: report.error_id.clone(),
                    },
                );
                RecoveryAction::ShowFallback {
                    component: fallback_component,
                }
            }
            RecoveryStrategy::Redirect {
                redirect_url: Some(url),
            } => {
                info!(error_id = %report.error_id, target_url = %url, "Redirecting after error");
                self.inner.navigator.navigate(&url);
                RecoveryAction::Redirected { url }
            }
            RecoveryStrategy::Redirect { redirect_url: None } => {
                warn!(
                    error_id = %report.error_id,
                    category = %report.category,
                    "Redirect strategy has no URL; skipping navigation"
                );
                RecoveryAction::RedirectSkipped
            }
            RecoveryStrategy::Ignore => {
                debug!(error_id = %report.error_id, category = %report.category, "Ignoring error");
                RecoveryAction::Ignored
            }
        };

        Some(action)
    }

    /// Registers the strategy for a category, replacing any previous one.
    pub fn register_recovery_strategy(&self, category: ErrorCategory, strategy: RecoveryStrategy) {
        debug!(category = %category, strategy = strategy.kind(), "Registering recovery strategy");
        if let Some(previous) = write(&self.inner.registry).register(category, strategy) {
            debug!(category = %category, previous = previous.kind(), "Replaced recovery strategy");
        }
    }

    /// Returns the strategy registered for a category.
    pub fn recovery_strategy(&self, category: ErrorCategory) -> Option<RecoveryStrategy> {
        read(&self.inner.registry).get(category).cloned()
    }

    /// Returns the outstanding fallback advice for a category.
    pub fn active_fallback(&self, category: ErrorCategory) -> Option<FallbackAdvice> {
        read(&self.inner.fallbacks).get(&category).cloned()
    }

    /// Returns all outstanding fallback advice.
    pub fn active_fallbacks(&self) -> Vec<FallbackAdvice> {
        read(&self.inner.fallbacks).values().cloned().collect()
    }

    /// Acknowledges the fallback for a category once the presentation layer
    /// has shown it (or recovered).
    pub fn clear_fallback(&self, category: ErrorCategory) -> Option<FallbackAdvice> {
        write(&self.inner.fallbacks).remove(&category)
    }

    /// Stores the latest value for a named metric.
    pub fn track_performance(&self, metric: impl Into<String>, value: f64) {
        self.inner.metrics.track(metric, value);
    }

    /// Returns a copy of all tracked metrics.
    pub fn get_performance_metrics(&self) -> PerformanceMetrics {
        self.inner.metrics.snapshot()
    }

    /// Returns a copy of the retained reports, oldest first.
    pub fn get_error_reports(&self) -> Vec<ErrorReport> {
        read(&self.inner.reports).iter().cloned().collect()
    }

    /// Returns the report with the given id, if still retained.
    pub fn get_error_report(&self, error_id: &ErrorId) -> Option<ErrorReport> {
        read(&self.inner.reports)
            .iter()
            .find(|report| &report.error_id == error_id)
            .cloned()
    }

    /// Returns reports at or above `min` severity.
    pub fn reports_by_severity(&self, min: Severity) -> Vec<ErrorReport> {
        read(&self.inner.reports)
            .iter()
            .filter(|report| report.severity >= min)
            .cloned()
            .collect()
    }

    /// Returns reports of one category.
    pub fn reports_by_category(&self, category: ErrorCategory) -> Vec<ErrorReport> {
        read(&self.inner.reports)
            .iter()
            .filter(|report| report.category == category)
            .cloned()
            .collect()
    }

    /// Drops all retained reports.
    pub fn clear_error_reports(&self) {
        write(&self.inner.reports).clear();
    }

    /// Counts retained reports by severity and category.
    pub fn error_summary(&self) -> ErrorSummary {
        let reports = read(&self.inner.reports);
        let mut summary = ErrorSummary {
            total: reports.len(),
            ..ErrorSummary::default()
        };
        for report in reports.iter() {
            *summary
                .by_severity
                .entry(report.severity.to_string())
                .or_insert(0) += 1;
            *summary
                .by_category
                .entry(report.category.to_string())
                .or_insert(0) += 1;
        }
        summary
    }

    /// Attaches the signed-in user to subsequent reports.
    pub fn set_user(&self, user_id: impl Into<String>) {
        write(&self.inner.context).set_user(Some(user_id.into()));
    }

    /// Detaches the user after sign-out.
    pub fn clear_user(&self) {
        write(&self.inner.context).set_user(None);
    }

    /// Updates the current location stamped onto reports.
    pub fn set_location(&self, url: impl Into<String>) {
        write(&self.inner.context).set_url(url);
    }

    /// Returns a copy of the current runtime context.
    pub fn runtime_context(&self) -> RuntimeContext {
        read(&self.inner.context).clone()
    }

    pub fn detector(&self) -> &ErrorDetector {
        &self.inner.detector
    }
}

impl fmt::Debug for ErrorMonitoringService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorMonitoringService")
            .field("mode", &self.inner.config.mode)
            .field("reports", &read(&self.inner.reports).len())
            .field("strategies", &read(&self.inner.registry).len())
            .field("sink", &self.inner.sink.as_ref().map(|s| s.name().to_string()))
            .finish()
    }
}

/// Development-mode console channel.
fn log_report(report: &ErrorReport) {
    let stack = report.error.stack.as_deref().unwrap_or("");
    match report.severity {
        Severity::Low | Severity::Medium => warn!(
            error_id = %report.error_id,
            severity = %report.severity,
            category = %report.category,
            url = %report.context.url,
            stack,
            "Captured error: {}",
            report.error
        ),
        Severity::High | Severity::Critical => error!(
            error_id = %report.error_id,
            severity = %report.severity,
            category = %report.category,
            url = %report.context.url,
            stack,
            "Captured error: {}",
            report.error
        ),
    }
}

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeMode;
    use crate::error::sink::MemorySink;
    use crate::navigation::RecordingNavigator;
    use serde_json::json;

    fn service() -> ErrorMonitoringService {
        ErrorMonitoringService::new(MonitoringConfig::default())
    }

    #[test]
    fn test_capture_returns_retrievable_id() {
        let service = service();
        let id = service.capture_error("boom", Severity::Medium, ErrorCategory::Unknown, None);

        let reports = service.get_error_reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].error_id, id);
        assert_eq!(reports[0].error.message, "boom");
        assert!(service.get_error_report(&id).is_some());
    }

    #[test]
    fn test_capture_request_defaults() {
        let service = service();
        let outcome = service.capture(CaptureRequest::new("plain"));
        let report = service.get_error_report(&outcome.error_id).unwrap();

        assert_eq!(report.severity, Severity::Medium);
        assert_eq!(report.category, ErrorCategory::Unknown);
        assert!(outcome.action.is_none());
    }

    #[test]
    fn test_additional_data_is_kept() {
        let service = service();
        let id = service.capture(
            CaptureRequest::new("price mismatch")
                .category(ErrorCategory::Api)
                .data("listing_id", 42)
                .data("currency", "EUR"),
        );

        let report = service.get_error_report(&id.error_id).unwrap();
        assert_eq!(report.additional_data["listing_id"], json!(42));
        assert_eq!(report.additional_data["currency"], json!("EUR"));
    }

    #[test]
    fn test_clear_error_reports() {
        let service = service();
        service.capture_error("a", Severity::Low, ErrorCategory::Validation, None);
        service.capture_error("b", Severity::Low, ErrorCategory::Validation, None);

        service.clear_error_reports();

        assert!(service.get_error_reports().is_empty());
    }

    #[test]
    fn test_reports_are_bounded() {
        let service = ErrorMonitoringService::new(MonitoringConfig::default().with_max_reports(3));
        let ids: Vec<ErrorId> = (0..5)
            .map(|i| service.capture_error(format!("e{}", i), Severity::Low, ErrorCategory::Unknown, None))
            .collect();

        let reports = service.get_error_reports();
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].error_id, ids[2]);
        assert_eq!(reports[2].error_id, ids[4]);
    }

    #[test]
    fn test_returned_reports_are_copies() {
        let service = service();
        service.capture_error("original", Severity::Low, ErrorCategory::Unknown, None);

        let mut copy = service.get_error_reports();
        copy[0].error.message = "changed".to_string();
        copy.clear();

        assert_eq!(service.get_error_reports()[0].error.message, "original");
    }

    #[test]
    fn test_redirect_strategy_navigates_once() {
        let navigator = Arc::new(RecordingNavigator::new());
        let service = ErrorMonitoringService::builder(MonitoringConfig::default())
            .navigator(navigator.clone())
            .build();
        service.register_recovery_strategy(ErrorCategory::Auth, RecoveryStrategy::redirect("/login"));

        let outcome = service.capture(
            CaptureRequest::new("token expired")
                .severity(Severity::High)
                .category(ErrorCategory::Auth),
        );

        assert_eq!(navigator.history(), vec!["/login"]);
        assert_eq!(
            outcome.action,
            Some(RecoveryAction::Redirected {
                url: "/login".to_string()
            })
        );
    }

    #[test]
    fn test_redirect_without_url_is_skipped() {
        let navigator = Arc::new(RecordingNavigator::new());
        let service = ErrorMonitoringService::builder(MonitoringConfig::default())
            .navigator(navigator.clone())
            .build();
        service.register_recovery_strategy(
            ErrorCategory::Auth,
            RecoveryStrategy::Redirect { redirect_url: None },
        );

        let outcome = service.capture(CaptureRequest::new("x").category(ErrorCategory::Auth));

        assert!(navigator.history().is_empty());
        assert_eq!(outcome.action, Some(RecoveryAction::RedirectSkipped));
    }

    #[test]
    fn test_second_registration_replaces_first() {
        let navigator = Arc::new(RecordingNavigator::new());
        let service = ErrorMonitoringService::builder(MonitoringConfig::default())
            .navigator(navigator.clone())
            .build();
        service.register_recovery_strategy(ErrorCategory::Network, RecoveryStrategy::redirect("/offline"));
        service.register_recovery_strategy(ErrorCategory::Network, RecoveryStrategy::ignore());

        let outcome = service.capture(CaptureRequest::new("offline").category(ErrorCategory::Network));

        assert_eq!(outcome.action, Some(RecoveryAction::Ignored));
        assert!(navigator.history().is_empty());
        assert_eq!(
            service.recovery_strategy(ErrorCategory::Network),
            Some(RecoveryStrategy::Ignore)
        );
    }

    #[test]
    fn test_retry_strategy_only_signals_intent() {
        let service = service();
        service.register_recovery_strategy(
            ErrorCategory::Network,
            RecoveryStrategy::retry(3, Duration::from_millis(750)),
        );

        let outcome = service.capture(CaptureRequest::new("fetch failed").category(ErrorCategory::Network));

        assert_eq!(
            outcome.action,
            Some(RecoveryAction::Retry {
                max_attempts: Some(3),
                delay: Some(Duration::from_millis(750)),
            })
        );
    }

    #[test]
    fn test_fallback_is_advisory_until_cleared() {
        let service = service();
        service.register_recovery_strategy(
            ErrorCategory::Component,
            RecoveryStrategy::fallback("ListingCardSkeleton"),
        );

        let id = service.capture_error("render failed", Severity::Medium, ErrorCategory::Component, None);

        let advice = service.active_fallback(ErrorCategory::Component).unwrap();
        assert_eq!(advice.component.as_deref(), Some("ListingCardSkeleton"));
        assert_eq!(advice.error_id, id);
        assert_eq!(service.active_fallbacks().len(), 1);

        assert!(service.clear_fallback(ErrorCategory::Component).is_some());
        assert!(service.active_fallback(ErrorCategory::Component).is_none());
    }

    #[test]
    fn test_unregistered_category_has_no_action() {
        let service = service();
        service.register_recovery_strategy(ErrorCategory::Auth, RecoveryStrategy::redirect("/login"));
        let outcome = service.capture(CaptureRequest::new("x").category(ErrorCategory::Api));
        assert!(outcome.action.is_none());
    }

    #[test]
    fn test_track_performance_keeps_latest() {
        let service = service();
        service.track_performance("lcp", 3100.0);
        service.track_performance("lcp", 2100.0);
        service.track_performance("cls", 0.1);

        let metrics = service.get_performance_metrics();
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics.get("lcp"), Some(2100.0));
    }

    #[test]
    fn test_capture_message_infers_category() {
        let service = service();
        let id = service.capture_message("GET /api/me returned 401", Severity::High);
        let report = service.get_error_report(&id).unwrap();
        assert_eq!(report.category, ErrorCategory::Auth);
    }

    #[test]
    fn test_user_and_location_in_context() {
        let service = service();
        service.set_location("/dashboard/bookings");
        service.set_user("owner-12");
        let with_user = service.capture_error("a", Severity::Low, ErrorCategory::Unknown, None);
        service.clear_user();
        let without_user = service.capture_error("b", Severity::Low, ErrorCategory::Unknown, None);

        let first = service.get_error_report(&with_user).unwrap();
        let second = service.get_error_report(&without_user).unwrap();
        assert_eq!(first.context.url, "/dashboard/bookings");
        assert_eq!(first.context.user_id.as_deref(), Some("owner-12"));
        assert!(second.context.user_id.is_none());
        assert_eq!(first.context.session_id, second.context.session_id);
    }

    #[test]
    fn test_capture_with_scope() {
        let service = service();
        let id = service.capture_with_scope(
            "date range invalid",
            Severity::Low,
            ErrorCategory::Validation,
            ErrorScope::new().feature("search").component("DateRangePicker").action("select"),
        );
        let report = service.get_error_report(&id).unwrap();
        assert_eq!(report.context.feature.as_deref(), Some("search"));
        assert_eq!(report.context.component.as_deref(), Some("DateRangePicker"));
        assert_eq!(report.context.action.as_deref(), Some("select"));
    }

    #[test]
    fn test_filters_and_summary() {
        let service = service();
        service.capture_error("a", Severity::Low, ErrorCategory::Validation, None);
        service.capture_error("b", Severity::High, ErrorCategory::Api, None);
        service.capture_error("c", Severity::Critical, ErrorCategory::Api, None);

        assert_eq!(service.reports_by_severity(Severity::High).len(), 2);
        assert_eq!(service.reports_by_category(ErrorCategory::Api).len(), 2);

        let summary = service.error_summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.by_category["api"], 2);
        assert_eq!(summary.by_severity["low"], 1);
    }

    #[test]
    fn test_clones_share_state() {
        let service = service();
        let handle = service.clone();
        handle.capture_error("shared", Severity::Low, ErrorCategory::Unknown, None);
        assert_eq!(service.get_error_reports().len(), 1);
    }

    #[test]
    fn test_builder_from_config_without_endpoint() {
        let builder = ErrorMonitoringService::builder_from_config(MonitoringConfig::default()).unwrap();
        let service = builder.build();
        assert!(format!("{:?}", service).contains("sink: None"));
    }

    #[test]
    fn test_production_capture_without_runtime_does_not_fail() {
        let sink = Arc::new(MemorySink::new());
        let service = ErrorMonitoringService::builder(
            MonitoringConfig::default().with_mode(RuntimeMode::Production),
        )
        .sink(sink.clone())
        .build();

        let id = service.capture_error("no runtime", Severity::High, ErrorCategory::Unknown, None);

        assert!(service.get_error_report(&id).is_some());
        assert!(sink.delivered().is_empty());
    }

    #[tokio::test]
    async fn test_production_forwards_to_sink() {
        let sink = Arc::new(MemorySink::new());
        let service = ErrorMonitoringService::builder(
            MonitoringConfig::default().with_mode(RuntimeMode::Production),
        )
        .sink(sink.clone())
        .build();

        let id = service.capture_error("forward me", Severity::High, ErrorCategory::Api, None);

        for _ in 0..50 {
            if !sink.delivered().is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }

        let delivered = sink.delivered();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].error_id, id);
    }

    #[tokio::test]
    async fn test_development_does_not_forward() {
        let sink = Arc::new(MemorySink::new());
        let service = ErrorMonitoringService::builder(MonitoringConfig::default())
            .sink(sink.clone())
            .build();

        service.capture_error("local only", Severity::High, ErrorCategory::Api, None);
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        assert!(sink.delivered().is_empty());
    }
}
