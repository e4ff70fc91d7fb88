// Read model: total kilocalories recorded for the current UTC day.

use crate::shared::infrastructure::record_sink::{RecordSink, SinkError};
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotal {
    pub day_start: DateTime<Utc>,
    pub day_end: DateTime<Utc>,
    pub total_kcal: f64,
    pub records: usize,
}

pub struct TodayCaloriesHandler {
    sink: Arc<dyn RecordSink>,
}

impl TodayCaloriesHandler {
    pub fn new(sink: Arc<dyn RecordSink>) -> Self {
        Self { sink }
    }

    pub async fn handle(&self, now: DateTime<Utc>) -> Result<DailyTotal, SinkError> {
        let day_start = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|midnight| midnight.and_utc())
            .unwrap_or(now);
        let day_end = day_start + TimeDelta::days(1);
        let records = self.sink.records_in_range(day_start, day_end).await?;
        Ok(DailyTotal {
            day_start,
            day_end,
            total_kcal: records.iter().map(|r| r.energy_kcal).sum(),
            records: records.len(),
        })
    }
}
