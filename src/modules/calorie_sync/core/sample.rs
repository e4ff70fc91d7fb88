// Validation of a raw reading into a writable calorie sample.
//
// Purpose
// - Turn the text state reported by a source into a positive, finite value.
//
// Responsibilities
// - Absent, non-numeric, non-finite, zero, and negative states are "no data",
//   a normal steady state rather than an error.
// - Never perform input or output.

use crate::shared::infrastructure::metric_source::MetricReading;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoDataReason {
    #[error("source reported no value")]
    Absent,

    #[error("source value {raw:?} is not a number")]
    NotNumeric { raw: String },

    #[error("source value {value} is not positive")]
    NotPositive { value: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSample {
    value: f64,
    observed_at: DateTime<Utc>,
}

impl MetricSample {
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }
}

impl TryFrom<MetricReading> for MetricSample {
    type Error = NoDataReason;

    fn try_from(reading: MetricReading) -> Result<Self, Self::Error> {
        let raw = reading.state.ok_or(NoDataReason::Absent)?;
        let value = raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| NoDataReason::NotNumeric { raw: raw.clone() })?;
        if value <= 0.0 {
            return Err(NoDataReason::NotPositive { value });
        }
        Ok(Self {
            value,
            observed_at: reading.observed_at,
        })
    }
}
