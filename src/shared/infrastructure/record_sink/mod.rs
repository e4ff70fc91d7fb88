// Port for the local, append-only health record store.
//
// Purpose
// - Describe what the sync core needs from the record store: environment
//   checks, an overlap query, and a single-record insert.
//
// Boundaries
// - Insert is the only commit point of a sync attempt. Implementations must
//   either persist the whole record or nothing.

use crate::shared::core::interval::SyncInterval;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub mod in_memory;
pub mod json_lines;

pub const RECORD_ORIGIN: &str = "health_bridge";

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("backend error: {0}")]
    Backend(String),

    #[error("corrupt record store: {0}")]
    Corrupt(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRecord {
    pub id: Uuid,
    pub energy_kcal: f64,
    pub interval: SyncInterval,
    pub origin: String,
}

impl HealthRecord {
    pub fn new(energy_kcal: f64, interval: SyncInterval) -> Self {
        Self {
            id: Uuid::now_v7(),
            energy_kcal,
            interval,
            origin: RECORD_ORIGIN.to_string(),
        }
    }
}

#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn is_available(&self) -> bool;

    async fn is_authorized(&self) -> bool;

    /// True when any stored record intersects `[start, end)`.
    async fn exists_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool, SinkError>;

    async fn insert(&self, energy_kcal: f64, interval: &SyncInterval) -> Result<(), SinkError>;

    async fn records_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<HealthRecord>, SinkError>;
}
