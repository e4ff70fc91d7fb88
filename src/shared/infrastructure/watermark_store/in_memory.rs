// In memory watermark store for tests and runs without a data directory.

use crate::shared::infrastructure::watermark_store::{StoreError, WatermarkStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryWatermarkStore {
    watermark: RwLock<Option<DateTime<Utc>>>,
    is_offline: AtomicBool,
    failing_writes: AtomicBool,
    writes: AtomicUsize,
}

impl InMemoryWatermarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(watermark: DateTime<Utc>) -> Self {
        Self {
            watermark: RwLock::new(Some(watermark)),
            ..Self::default()
        }
    }

    /// Reads and writes both fail while offline.
    pub fn toggle_offline(&self) {
        self.is_offline.fetch_xor(true, Ordering::SeqCst);
    }

    /// Only writes fail; reads keep returning the last persisted value.
    pub fn set_failing_writes(&self, failing: bool) {
        self.failing_writes.store(failing, Ordering::SeqCst);
    }

    /// Number of successful writes.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WatermarkStore for InMemoryWatermarkStore {
    async fn get(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        if self.is_offline.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("Watermark store offline".into()));
        }
        Ok(*self.watermark.read().await)
    }

    async fn set(&self, watermark: DateTime<Utc>) -> Result<(), StoreError> {
        if self.is_offline.load(Ordering::SeqCst) || self.failing_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("Watermark store offline".into()));
        }
        let mut guard = self.watermark.write().await;
        if guard.is_none_or(|current| current < watermark) {
            *guard = Some(watermark);
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
