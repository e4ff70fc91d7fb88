// Background scheduler for periodic syncs.
//
// Responsibilities
// - Invoke the runner once per sync interval.
// - After a retryable failure, try again with exponential backoff, never
//   waiting longer than the regular interval.
// - Stop when the shutdown signal fires.

use crate::modules::calorie_sync::core::outcome::SyncOutcome;
use crate::modules::calorie_sync::use_cases::sync_calories::runner::{SyncRunner, Trigger};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub initial: Duration,
    pub max: Duration,
}

impl RetryPolicy {
    pub fn backoff(&self, consecutive_failures: u32) -> Duration {
        let exponent = consecutive_failures.saturating_sub(1).min(16);
        self.initial
            .checked_mul(1 << exponent)
            .unwrap_or(self.max)
            .min(self.max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub interval: Duration,
    pub retry: RetryPolicy,
}

impl Schedule {
    /// Delay before the next attempt and the updated failure streak.
    pub fn next_delay(&self, outcome: &SyncOutcome, consecutive_failures: u32) -> (Duration, u32) {
        if outcome.should_retry() {
            let failures = consecutive_failures.saturating_add(1);
            (self.retry.backoff(failures).min(self.interval), failures)
        } else {
            (self.interval, 0)
        }
    }
}

pub async fn run_scheduler(
    runner: Arc<SyncRunner>,
    schedule: Schedule,
    mut shutdown: watch::Receiver<bool>,
) {
    tracing::info!(
        target_entity = runner.target(),
        interval_secs = schedule.interval.as_secs(),
        "scheduler started"
    );
    let mut failures = 0;
    loop {
        let outcome = runner.run(Trigger::Scheduled).await;
        let (delay, streak) = schedule.next_delay(&outcome, failures);
        failures = streak;
        if failures > 0 {
            tracing::warn!(%outcome, failures, retry_in_secs = delay.as_secs(), "sync failed, retrying");
        } else {
            tracing::info!(%outcome, next_in_secs = delay.as_secs(), "sync finished");
        }

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
    tracing::info!(target_entity = runner.target(), "scheduler stopped");
}
