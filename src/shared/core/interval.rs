// Half-open time span attributed to one health record.
//
// Purpose
// - Give every sync attempt a validated `[start, end)` span.
//
// Responsibilities
// - Reject empty or inverted spans at construction.
// - Answer intersection questions with half-open semantics, so spans that
//   only touch at an endpoint do not overlap.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IntervalError {
    #[error("end time must be after start time")]
    InvalidInterval,

    #[error("lookback must be a positive duration")]
    NonPositiveLookback,

    #[error("interval start is out of the representable time range")]
    OutOfRange,
}

/// Width of the span each attempt attributes its reading to. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lookback(TimeDelta);

impl Lookback {
    pub fn new(delta: TimeDelta) -> Result<Self, IntervalError> {
        if delta <= TimeDelta::zero() {
            return Err(IntervalError::NonPositiveLookback);
        }
        Ok(Self(delta))
    }

    pub fn as_delta(&self) -> TimeDelta {
        self.0
    }
}

impl Default for Lookback {
    fn default() -> Self {
        Self(TimeDelta::minutes(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl SyncInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, IntervalError> {
        if end <= start {
            return Err(IntervalError::InvalidInterval);
        }
        Ok(Self { start, end })
    }

    /// The candidate span `[now - lookback, now)`.
    pub fn ending_at(now: DateTime<Utc>, lookback: Lookback) -> Result<Self, IntervalError> {
        let start = now
            .checked_sub_signed(lookback.as_delta())
            .ok_or(IntervalError::OutOfRange)?;
        Self::new(start, now)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn intersects(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && start < self.end
    }
}
