// Append-only record store backed by a JSON lines file.
//
// Responsibilities
// - One HealthRecord per line; lines are never rewritten.
// - Availability means the data directory exists; authorization means the
//   store file (or its directory, before the first write) is writable.

use crate::shared::core::interval::SyncInterval;
use crate::shared::infrastructure::record_sink::{HealthRecord, RecordSink, SinkError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

pub struct JsonLinesRecordSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLinesRecordSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn directory(&self) -> &Path {
        self.path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }

    async fn load(&self) -> Result<Vec<HealthRecord>, SinkError> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(SinkError::Backend(e.to_string())),
        };
        contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(n, line)| {
                serde_json::from_str::<HealthRecord>(line)
                    .map_err(|e| SinkError::Corrupt(format!("line {}: {e}", n + 1)))
            })
            .collect()
    }
}

#[async_trait]
impl RecordSink for JsonLinesRecordSink {
    async fn is_available(&self) -> bool {
        fs::metadata(self.directory())
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    async fn is_authorized(&self) -> bool {
        let target = match fs::metadata(&self.path).await {
            Ok(meta) => Ok(meta),
            Err(_) => fs::metadata(self.directory()).await,
        };
        target.map(|m| !m.permissions().readonly()).unwrap_or(false)
    }

    async fn exists_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool, SinkError> {
        Ok(self
            .load()
            .await?
            .iter()
            .any(|r| r.interval.intersects(start, end)))
    }

    async fn insert(&self, energy_kcal: f64, interval: &SyncInterval) -> Result<(), SinkError> {
        let record = HealthRecord::new(energy_kcal, *interval);
        let mut line =
            serde_json::to_string(&record).map_err(|e| SinkError::Backend(e.to_string()))?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| SinkError::Backend(e.to_string()))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| SinkError::Backend(e.to_string()))?;
        file.sync_data()
            .await
            .map_err(|e| SinkError::Backend(e.to_string()))?;
        tracing::debug!(record_id = %record.id, path = %self.path.display(), "appended health record");
        Ok(())
    }

    async fn records_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<HealthRecord>, SinkError> {
        Ok(self
            .load()
            .await?
            .into_iter()
            .filter(|r| r.interval.intersects(start, end))
            .collect())
    }
}
