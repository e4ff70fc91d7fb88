// Stub source producing plausible daily calorie totals without a Home
// Assistant instance. Used for local development and demos.

use crate::shared::infrastructure::metric_source::{MetricReading, MetricSource, SourceError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::ops::Range;
use std::time::Duration;

const DEFAULT_RANGE: Range<f64> = 1500.0..2500.0;

pub struct StubMetricSource {
    range: Range<f64>,
    latency: Option<Duration>,
}

impl Default for StubMetricSource {
    fn default() -> Self {
        Self::new()
    }
}

impl StubMetricSource {
    pub fn new() -> Self {
        Self {
            range: DEFAULT_RANGE,
            latency: None,
        }
    }

    /// Simulate network delay before every reading.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }
}

#[async_trait]
impl MetricSource for StubMetricSource {
    async fn fetch(&self, now: DateTime<Utc>) -> Result<MetricReading, SourceError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let value = rand::thread_rng().gen_range(self.range.clone());
        tracing::debug!(value, "generated stub calorie reading");
        Ok(MetricReading {
            state: Some(format!("{value:.1}")),
            observed_at: now,
        })
    }

    fn name(&self) -> &str {
        "stub"
    }
}
