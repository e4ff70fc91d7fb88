// Composition root for the calorie bridge.
//
// Responsibilities
// - Read config from environment.
// - Instantiate concrete infrastructure implementations.
// - Wire implementations into the sync handler and runner.
// - Spawn the periodic scheduler next to the HTTP surface.

pub mod config;
pub mod http;
pub mod state;
pub mod workers;

use crate::modules::calorie_sync::use_cases::sync_calories::handler::SyncCaloriesHandler;
use crate::modules::calorie_sync::use_cases::sync_calories::runner::{SyncLocks, SyncRunner};
use crate::modules::calorie_sync::use_cases::today_calories::handler::TodayCaloriesHandler;
use crate::shared::infrastructure::metric_source::MetricSource;
use crate::shared::infrastructure::metric_source::home_assistant::HomeAssistantMetricSource;
use crate::shared::infrastructure::metric_source::stub::StubMetricSource;
use crate::shared::infrastructure::record_sink::json_lines::JsonLinesRecordSink;
use crate::shared::infrastructure::watermark_store::json_file::JsonFileWatermarkStore;
use config::{AppConfig, SourceConfig};
use state::AppState;
use std::sync::Arc;
use std::time::Duration;
use workers::{RetryPolicy, Schedule};

pub fn build_source(config: &AppConfig) -> anyhow::Result<Arc<dyn MetricSource>> {
    let source: Arc<dyn MetricSource> = match &config.source {
        SourceConfig::Stub => {
            Arc::new(StubMetricSource::new().with_latency(Duration::from_millis(300)))
        }
        SourceConfig::HomeAssistant { base_url, token } => Arc::new(
            HomeAssistantMetricSource::new(base_url, token.clone(), config.entity_id.clone())?,
        ),
    };
    tracing::info!(source = source.name(), "metric source selected");
    Ok(source)
}

pub fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let source = build_source(config)?;
    let sink = Arc::new(JsonLinesRecordSink::new(config.records_path()));
    let watermarks = Arc::new(JsonFileWatermarkStore::new(config.watermark_path()));

    let handler = Arc::new(SyncCaloriesHandler::new(
        source,
        sink.clone(),
        watermarks,
        config.lookback,
    ));
    let runner = Arc::new(SyncRunner::new(
        config.entity_id.clone(),
        handler,
        Arc::new(SyncLocks::new()),
        config.attempt_timeout,
    ));
    Ok(AppState {
        runner,
        today: Arc::new(TodayCaloriesHandler::new(sink)),
    })
}

pub fn schedule(config: &AppConfig) -> Schedule {
    Schedule {
        interval: config.sync_interval,
        retry: RetryPolicy {
            initial: config.retry_initial,
            max: config.retry_max,
        },
    }
}
