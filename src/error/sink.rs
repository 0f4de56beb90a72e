//! External error-ingestion sinks.
//!
//! In production builds every captured report is forwarded to a sink on a
//! best-effort basis: delivery runs in a spawned task, and failures are
//! logged and dropped.

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;

use super::report::ErrorReport;

/// Errors that can occur while delivering a report.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    Client(String),

    /// The request could not be sent or timed out.
    #[error("request to error sink failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The sink answered with a non-success status.
    #[error("error sink rejected report with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Result type for sink operations.
pub type SinkResult<T> = Result<T, SinkError>;

/// Receives serialised error reports.
#[async_trait]
pub trait ErrorSink: Send + Sync {
    /// Name used in log output.
    fn name(&self) -> &str;

    /// Delivers one report.
    async fn send(&self, report: &ErrorReport) -> SinkResult<()>;
}

/// Sink that POSTs each report as JSON to an ingestion endpoint.
pub struct HttpSink {
    client: Client,
    endpoint: String,
}

impl HttpSink {
    /// Creates a sink for `endpoint` with the given request timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> SinkResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SinkError::Client(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Returns the configured endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ErrorSink for HttpSink {
    fn name(&self) -> &str {
        "http"
    }

    async fn send(&self, report: &ErrorReport) -> SinkResult<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(report)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SinkError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

/// Sink that keeps delivered reports in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    delivered: Mutex<Vec<ErrorReport>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns copies of every delivered report, oldest first.
    pub fn delivered(&self) -> Vec<ErrorReport> {
        match self.delivered.lock() {
            Ok(delivered) => delivered.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl ErrorSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    async fn send(&self, report: &ErrorReport) -> SinkResult<()> {
        match self.delivered.lock() {
            Ok(mut delivered) => delivered.push(report.clone()),
            Err(poisoned) => poisoned.into_inner().push(report.clone()),
        }
        Ok(())
    }
}
