//! Performance metric tracking for the monitoring service.
//!
//! Metrics are a flat mapping from name to the most recently reported value.
//! This is not a time series: reporting a metric again overwrites it.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Snapshot of all tracked metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    values: HashMap<String, f64>,
}

impl PerformanceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `value` for `metric`, replacing any previous value.
    ///
    /// Returns the previous value, if any.
    pub fn record(&mut self, metric: impl Into<String>, value: f64) -> Option<f64> {
        self.values.insert(metric.into(), value)
    }

    /// Returns the latest value of a metric.
    pub fn get(&self, metric: &str) -> Option<f64> {
        self.values.get(metric).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the metrics as a plain map.
    pub fn to_map(&self) -> HashMap<String, f64> {
        self.values.clone()
    }

    /// Iterates over metrics sorted by name.
    pub fn sorted(&self) -> BTreeMap<&str, f64> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v)).collect()
    }
}

/// Thread-safe, cheaply clonable metrics tracker.
#[derive(Debug, Clone, Default)]
pub struct MetricsTracker {
    inner: Arc<RwLock<PerformanceMetrics>>,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the latest value of a metric.
    pub fn track(&self, metric: impl Into<String>, value: f64) {
        let metric = metric.into();
        tracing::trace!(metric = %metric, value, "Tracking performance metric");
        if let Ok(mut metrics) = self.inner.write() {
            metrics.record(metric, value);
        }
    }

    /// Stores a duration metric in milliseconds.
    pub fn track_duration(&self, metric: impl Into<String>, duration: Duration) {
        self.track(metric, duration.as_secs_f64() * 1000.0);
    }

    /// Returns a copy of all metrics.
    pub fn snapshot(&self) -> PerformanceMetrics {
        match self.inner.read() {
            Ok(metrics) => metrics.clone(),
            Err(_) => PerformanceMetrics::default(),
        }
    }
}

/// Format metrics for display.
pub fn format_metrics(metrics: &PerformanceMetrics) -> String {
    let mut output = String::from("## Performance Metrics\n\n");

    if metrics.is_empty() {
        output.push_str("No metrics recorded.\n");
        return output;
    }

    for (name, value) in metrics.sorted() {
        output.push_str(&format!("- **{}**: {:.2}\n", name, value));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_overwrites_previous_value() {
        let mut metrics = PerformanceMetrics::new();
        assert_eq!(metrics.record("lcp", 2400.0), None);
        assert_eq!(metrics.record("lcp", 1800.0), Some(2400.0));

        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics.get("lcp"), Some(1800.0));
    }

    #[test]
    fn test_tracker_snapshot_is_a_copy() {
        let tracker = MetricsTracker::new();
        tracker.track("search_results_ms", 120.0);

        let snapshot = tracker.snapshot();
        tracker.track("search_results_ms", 300.0);

        assert_eq!(snapshot.get("search_results_ms"), Some(120.0));
        assert_eq!(tracker.snapshot().get("search_results_ms"), Some(300.0));
    }

    #[test]
    fn test_track_duration_in_millis() {
        let tracker = MetricsTracker::new();
        tracker.track_duration("checkout_render", Duration::from_millis(250));
        assert_eq!(tracker.snapshot().get("checkout_render"), Some(250.0));
    }

    #[test]
    fn test_tracker_clones_share_state() {
        let tracker = MetricsTracker::new();
        let clone = tracker.clone();
        clone.track("fid", 12.0);
        assert_eq!(tracker.snapshot().get("fid"), Some(12.0));
    }

    #[test]
    fn test_format_metrics_sorted() {
        let mut metrics = PerformanceMetrics::new();
        metrics.record("ttfb", 80.0);
        metrics.record("cls", 0.05);

        let output = format_metrics(&metrics);

        assert!(output.contains("## Performance Metrics"));
        let cls = output.find("cls").unwrap();
        let ttfb = output.find("ttfb").unwrap();
        assert!(cls < ttfb);
        assert!(output.contains("**ttfb**: 80.00"));
    }

    #[test]
    fn test_format_empty_metrics() {
        let output = format_metrics(&PerformanceMetrics::new());
        assert!(output.contains("No metrics recorded."));
    }
}
