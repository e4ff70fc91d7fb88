// In memory implementation of the RecordSink port.
//
// Purpose
// - Support sync handler tests and local development without a record store.
//
// Responsibilities
// - Keep inserted records in insertion order for inspection.
// - Let tests flip availability, authorization, and failure modes at runtime.

use crate::shared::core::interval::SyncInterval;
use crate::shared::infrastructure::record_sink::{HealthRecord, RecordSink, SinkError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryRecordSink {
    records: RwLock<Vec<HealthRecord>>,
    unavailable: AtomicBool,
    unauthorized: AtomicBool,
    is_offline: AtomicBool,
    failing_inserts: AtomicUsize,
    dropped_acks: AtomicUsize,
    ack_delay_ms: AtomicU64,
    range_queries: AtomicUsize,
}

impl InMemoryRecordSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every query and insert fails while offline.
    pub fn toggle_offline(&self) {
        self.is_offline.fetch_xor(true, Ordering::SeqCst);
    }

    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    pub fn set_authorized(&self, authorized: bool) {
        self.unauthorized.store(!authorized, Ordering::SeqCst);
    }

    /// Fail the next `count` inserts without storing anything.
    pub fn fail_next_inserts(&self, count: usize) {
        self.failing_inserts.store(count, Ordering::SeqCst);
    }

    /// Store the next `count` inserts but report them as failed.
    pub fn drop_next_acks(&self, count: usize) {
        self.dropped_acks.store(count, Ordering::SeqCst);
    }

    /// Hold every acknowledgement back for `delay` after the record is stored.
    pub fn delay_acks(&self, delay: Duration) {
        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.ack_delay_ms.store(millis, Ordering::SeqCst);
    }

    pub async fn records(&self) -> Vec<HealthRecord> {
        self.records.read().await.clone()
    }

    /// Number of overlap queries answered so far.
    pub fn range_queries(&self) -> usize {
        self.range_queries.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<(), SinkError> {
        if self.is_offline.load(Ordering::SeqCst) {
            return Err(SinkError::Backend("Record store offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordSink for InMemoryRecordSink {
    async fn is_available(&self) -> bool {
        !self.unavailable.load(Ordering::SeqCst)
    }

    async fn is_authorized(&self) -> bool {
        !self.unauthorized.load(Ordering::SeqCst)
    }

    async fn exists_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool, SinkError> {
        self.range_queries.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        let guard = self.records.read().await;
        Ok(guard.iter().any(|r| r.interval.intersects(start, end)))
    }

    async fn insert(&self, energy_kcal: f64, interval: &SyncInterval) -> Result<(), SinkError> {
        self.check_online()?;
        let failing = self
            .failing_inserts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if failing.is_ok() {
            return Err(SinkError::Backend("Record store rejected the insert".into()));
        }
        self.records
            .write()
            .await
            .push(HealthRecord::new(energy_kcal, *interval));

        let delay = self.ack_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        let dropped = self
            .dropped_acks
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if dropped.is_ok() {
            return Err(SinkError::Backend("Record store connection reset".into()));
        }
        Ok(())
    }

    async fn records_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<HealthRecord>, SinkError> {
        self.check_online()?;
        let guard = self.records.read().await;
        Ok(guard
            .iter()
            .filter(|r| r.interval.intersects(start, end))
            .cloned()
            .collect())
    }
}
