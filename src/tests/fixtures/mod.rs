// Shared test fixtures: a scripted metric source and a harness wiring the
// sync handler to in-memory adapters.

pub mod scripted_source;

use crate::modules::calorie_sync::use_cases::sync_calories::handler::SyncCaloriesHandler;
use crate::modules::calorie_sync::use_cases::sync_calories::runner::{SyncLocks, SyncRunner};
use crate::modules::calorie_sync::use_cases::today_calories::handler::TodayCaloriesHandler;
use crate::shared::core::interval::Lookback;
use crate::shared::infrastructure::record_sink::in_memory::InMemoryRecordSink;
use crate::shared::infrastructure::watermark_store::in_memory::InMemoryWatermarkStore;
use crate::shell::state::AppState;
use chrono::{DateTime, TimeZone, Utc};
use scripted_source::ScriptedMetricSource;
use std::sync::Arc;
use std::time::Duration;

pub const TARGET: &str = "sensor.calorie_tracker";

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 12, 15, 8, 0, 0).unwrap()
}

pub struct SyncHarness {
    pub source: Arc<ScriptedMetricSource>,
    pub sink: Arc<InMemoryRecordSink>,
    pub watermarks: Arc<InMemoryWatermarkStore>,
    pub lookback: Lookback,
}

impl SyncHarness {
    pub fn new() -> Self {
        Self::from_store(InMemoryWatermarkStore::new())
    }

    pub fn with_watermark(watermark: DateTime<Utc>) -> Self {
        Self::from_store(InMemoryWatermarkStore::starting_at(watermark))
    }

    fn from_store(store: InMemoryWatermarkStore) -> Self {
        Self {
            source: Arc::new(ScriptedMetricSource::new()),
            sink: Arc::new(InMemoryRecordSink::new()),
            watermarks: Arc::new(store),
            lookback: Lookback::default(),
        }
    }

    pub fn handler(&self) -> SyncCaloriesHandler {
        SyncCaloriesHandler::new(
            self.source.clone(),
            self.sink.clone(),
            self.watermarks.clone(),
            self.lookback,
        )
    }
}

pub fn app_state(harness: &SyncHarness) -> AppState {
    let runner = SyncRunner::new(
        TARGET,
        Arc::new(harness.handler()),
        Arc::new(SyncLocks::new()),
        Duration::from_secs(5),
    );
    AppState {
        runner: Arc::new(runner),
        today: Arc::new(TodayCaloriesHandler::new(harness.sink.clone())),
    }
}
