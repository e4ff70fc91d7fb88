use crate::modules::calorie_sync::core::sample::NoDataReason;
use crate::shared::core::interval::SyncInterval;
use serde::Serialize;
use std::fmt;

/// Why an attempt failed. Every cause is an environment or transient
/// condition, so every failure is retryable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureCause {
    #[error("record store is not available")]
    Unavailable,

    #[error("record store permissions not granted")]
    Unauthorized,

    #[error("failed to fetch data from source: {0}")]
    SourceUnreachable(String),

    #[error("failed to check existing records: {0}")]
    SinkQueryFailed(String),

    #[error("failed to write to record store: {0}")]
    SinkWriteFailed(String),

    #[error("sync attempt timed out")]
    TimedOut,

    #[error("clock is outside the representable time range")]
    ClockOutOfRange,
}

impl FailureCause {
    pub fn is_retryable(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncOutcome {
    Synced {
        value: f64,
        interval: SyncInterval,
    },
    SkippedNoData {
        reason: NoDataReason,
    },
    SkippedDuplicate {
        interval: SyncInterval,
    },
    Failed {
        cause: FailureCause,
        retryable: bool,
    },
}

impl SyncOutcome {
    pub fn failed(cause: FailureCause) -> Self {
        let retryable = cause.is_retryable();
        Self::Failed { cause, retryable }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Whether the scheduler should try again before the next regular tick.
    pub fn should_retry(&self) -> bool {
        matches!(self, Self::Failed { retryable: true, .. })
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Synced { value, .. } => write!(f, "Synced {value:.1} calories successfully"),
            Self::SkippedNoData { reason } => write!(f, "No data to sync ({reason})"),
            Self::SkippedDuplicate { .. } => {
                write!(f, "Sync skipped - data already exists for this time range")
            }
            Self::Failed { cause, .. } => write!(f, "Sync failed: {cause}"),
        }
    }
}
