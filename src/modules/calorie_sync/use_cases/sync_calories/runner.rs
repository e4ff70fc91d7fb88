// Single-flight runner around the sync handler.
//
// Purpose
// - Give periodic ticks and manual "sync now" requests one shared mutual
//   exclusion domain, keyed by the sync target.
//
// Responsibilities
// - Periodic ticks wait for the target lock; manual triggers are rejected
//   while an attempt is in flight.
// - Bound every attempt by a timeout and report a timeout as a retryable
//   failure.
// - Keep the last status for the status endpoint.

use crate::modules::calorie_sync::core::outcome::{FailureCause, SyncOutcome};
use crate::modules::calorie_sync::use_cases::sync_calories::handler::SyncCaloriesHandler;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RunnerError {
    #[error("a sync for {target} is already running")]
    AlreadyRunning { target: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Scheduled,
    Manual,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Scheduled => f.write_str("scheduled"),
            Trigger::Manual => f.write_str("manual"),
        }
    }
}

/// One lock per sync target, shared by every runner in the process.
#[derive(Default)]
pub struct SyncLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SyncLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn for_target(&self, target: &str) -> Arc<Mutex<()>> {
        self.locks
            .lock()
            .await
            .entry(target.to_string())
            .or_default()
            .clone()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncStatus {
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub last_outcome: Option<SyncOutcome>,
    pub last_message: Option<String>,
}

pub struct SyncRunner {
    target: String,
    handler: Arc<SyncCaloriesHandler>,
    locks: Arc<SyncLocks>,
    attempt_timeout: Duration,
    status: RwLock<SyncStatus>,
}

impl SyncRunner {
    pub fn new(
        target: impl Into<String>,
        handler: Arc<SyncCaloriesHandler>,
        locks: Arc<SyncLocks>,
        attempt_timeout: Duration,
    ) -> Self {
        Self {
            target: target.into(),
            handler,
            locks,
            attempt_timeout,
            status: RwLock::new(SyncStatus::default()),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn handler(&self) -> &SyncCaloriesHandler {
        &self.handler
    }

    pub async fn status(&self) -> SyncStatus {
        self.status.read().await.clone()
    }

    /// Wait for any in-flight attempt on the target, then run one.
    pub async fn run(&self, trigger: Trigger) -> SyncOutcome {
        let guard = self.locks.for_target(&self.target).await.lock_owned().await;
        self.execute(trigger, guard).await
    }

    /// Run one attempt unless another is already in flight for the target.
    pub async fn try_run(&self, trigger: Trigger) -> Result<SyncOutcome, RunnerError> {
        let guard = self
            .locks
            .for_target(&self.target)
            .await
            .try_lock_owned()
            .map_err(|_| RunnerError::AlreadyRunning {
                target: self.target.clone(),
            })?;
        Ok(self.execute(trigger, guard).await)
    }

    async fn execute(&self, trigger: Trigger, _guard: OwnedMutexGuard<()>) -> SyncOutcome {
        let now = Utc::now();
        tracing::info!(target_entity = %self.target, %trigger, "sync attempt started");
        let outcome =
            match tokio::time::timeout(self.attempt_timeout, self.handler.attempt_sync(now)).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    tracing::error!(
                        target_entity = %self.target,
                        timeout_secs = self.attempt_timeout.as_secs(),
                        "sync attempt timed out"
                    );
                    SyncOutcome::failed(FailureCause::TimedOut)
                }
            };
        self.record(now, &outcome).await;
        outcome
    }

    async fn record(&self, attempted_at: DateTime<Utc>, outcome: &SyncOutcome) {
        let mut status = self.status.write().await;
        status.last_attempt_at = Some(attempted_at);
        if matches!(outcome, SyncOutcome::Synced { .. }) {
            status.last_synced_at = Some(Utc::now());
        }
        status.last_message = Some(outcome.to_string());
        status.last_outcome = Some(outcome.clone());
    }
}
