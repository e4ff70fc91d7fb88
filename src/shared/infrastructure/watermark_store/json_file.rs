// Watermark store persisted as a small JSON document.
//
// Responsibilities
// - Write through a temporary file and rename it into place, so a crash
//   leaves either the old or the new watermark on disk.
// - Replace a document that no longer parses instead of failing forever.
// - Record the wall-clock time of the last successful write next to the
//   watermark.

use crate::shared::infrastructure::watermark_store::{StoreError, WatermarkStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WatermarkDocument {
    last_synced_end: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

pub struct JsonFileWatermarkStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileWatermarkStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read_document(&self) -> Result<Option<WatermarkDocument>, StoreError> {
        match fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| StoreError::Corrupt(e.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Backend(e.to_string())),
        }
    }
}

#[async_trait]
impl WatermarkStore for JsonFileWatermarkStore {
    async fn get(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(self.read_document().await?.map(|d| d.last_synced_end))
    }

    async fn set(&self, watermark: DateTime<Utc>) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let current = match self.read_document().await {
            Ok(document) => document.map(|d| d.last_synced_end),
            Err(StoreError::Corrupt(reason)) => {
                tracing::warn!(%reason, path = %self.path.display(), "overwriting corrupt watermark document");
                None
            }
            Err(e) => return Err(e),
        };
        if let Some(current) = current.filter(|c| *c >= watermark) {
            tracing::debug!(%watermark, %current, "ignoring watermark regression");
            return Ok(());
        }

        let document = WatermarkDocument {
            last_synced_end: watermark,
            updated_at: Utc::now(),
        };
        let bytes =
            serde_json::to_vec_pretty(&document).map_err(|e| StoreError::Backend(e.to_string()))?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, bytes)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        fs::rename(&staging, &self.path)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }
}
