// Port for persisting the sync watermark: the end of the last successfully
// written interval.
//
// Responsibilities
// - Implementations never move a stored watermark backwards; a lower value
//   passed to `set` is ignored.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub mod in_memory;
pub mod json_file;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("backend error: {0}")]
    Backend(String),

    #[error("corrupt watermark: {0}")]
    Corrupt(String),
}

#[async_trait]
pub trait WatermarkStore: Send + Sync {
    async fn get(&self) -> Result<Option<DateTime<Utc>>, StoreError>;

    async fn set(&self, watermark: DateTime<Utc>) -> Result<(), StoreError>;
}
