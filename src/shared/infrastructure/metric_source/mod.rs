// Port for the external telemetry source the calorie value is read from.
//
// Boundaries
// - Implementations return the raw text state. Parsing and validation belong
//   to the sync core, not to the adapters.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub mod home_assistant;
pub mod stub;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("unexpected status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("source not configured: {0}")]
    NotConfigured(String),
}

/// Raw state reported by a source, before any validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricReading {
    pub state: Option<String>,
    pub observed_at: DateTime<Utc>,
}

#[async_trait]
pub trait MetricSource: Send + Sync {
    async fn fetch(&self, now: DateTime<Utc>) -> Result<MetricReading, SourceError>;

    /// Label used in logs and on the status endpoint.
    fn name(&self) -> &str;
}
