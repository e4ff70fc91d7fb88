// Sync handler: one idempotency-aware attempt to copy the calorie reading
// into the record store.
//
// Responsibilities
// - Check the record store environment before doing any work.
// - Fetch and validate the reading, then build the candidate interval.
// - Run the duplicate guard against the watermark and, when needed, the
//   record store itself.
// - Insert as the single commit point, then advance the watermark best-effort.
// - Return a SyncOutcome on every path. No retries here.

use crate::modules::calorie_sync::core::outcome::{FailureCause, SyncOutcome};
use crate::modules::calorie_sync::core::sample::MetricSample;
use crate::modules::calorie_sync::core::watermark_policy::{
    GuardDecision, WatermarkView, effective_watermark, guard_decision, next_watermark,
};
use crate::shared::core::interval::{Lookback, SyncInterval};
use crate::shared::infrastructure::metric_source::MetricSource;
use crate::shared::infrastructure::record_sink::RecordSink;
use crate::shared::infrastructure::watermark_store::WatermarkStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct SyncCaloriesHandler {
    source: Arc<dyn MetricSource>,
    sink: Arc<dyn RecordSink>,
    watermark_store: Arc<dyn WatermarkStore>,
    lookback: Lookback,
    local: Mutex<LocalWatermarks>,
}

#[derive(Debug, Default)]
struct LocalWatermarks {
    // Watermark computed after a successful insert whose persist failed.
    pending: Option<DateTime<Utc>>,
    // End of an insert that started but was never confirmed. It may have
    // committed, so later candidates reaching it must be checked.
    in_doubt: Option<DateTime<Utc>>,
}

impl SyncCaloriesHandler {
    pub fn new(
        source: Arc<dyn MetricSource>,
        sink: Arc<dyn RecordSink>,
        watermark_store: Arc<dyn WatermarkStore>,
        lookback: Lookback,
    ) -> Self {
        Self {
            source,
            sink,
            watermark_store,
            lookback,
            local: Mutex::new(LocalWatermarks::default()),
        }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Stored watermark combined with any pending one.
    pub async fn current_watermark(&self) -> WatermarkView {
        let stored = self.read_watermark().await;
        effective_watermark(stored, self.local.lock().await.pending)
    }

    pub async fn attempt_sync(&self, now: DateTime<Utc>) -> SyncOutcome {
        tracing::debug!(%now, source = self.source.name(), "starting calorie sync");

        if !self.sink.is_available().await {
            return self.fail(FailureCause::Unavailable);
        }
        if !self.sink.is_authorized().await {
            return self.fail(FailureCause::Unauthorized);
        }

        let reading = match self.source.fetch(now).await {
            Ok(reading) => reading,
            Err(e) => return self.fail(FailureCause::SourceUnreachable(e.to_string())),
        };

        let sample = match MetricSample::try_from(reading) {
            Ok(sample) => sample,
            Err(reason) => {
                tracing::info!(%reason, "no valid calorie data to sync");
                return SyncOutcome::SkippedNoData { reason };
            }
        };

        let candidate = match SyncInterval::ending_at(now, self.lookback) {
            Ok(candidate) => candidate,
            Err(_) => return self.fail(FailureCause::ClockOutOfRange),
        };

        let watermark = self.current_watermark().await;
        let in_doubt = self.local.lock().await.in_doubt;
        let guard_view = effective_watermark(watermark, in_doubt);
        if guard_decision(guard_view, &candidate) == GuardDecision::CheckExisting {
            tracing::debug!(
                ?guard_view,
                start = %candidate.start(),
                end = %candidate.end(),
                "checking for existing records to avoid duplicates"
            );
            match self
                .sink
                .exists_in_range(candidate.start(), candidate.end())
                .await
            {
                Ok(true) => {
                    tracing::info!(
                        start = %candidate.start(),
                        end = %candidate.end(),
                        "records already exist for time range, skipping write"
                    );
                    return SyncOutcome::SkippedDuplicate {
                        interval: candidate,
                    };
                }
                Ok(false) => {}
                Err(e) => return self.fail(FailureCause::SinkQueryFailed(e.to_string())),
            }
        }

        self.mark_in_doubt(&candidate).await;
        if let Err(e) = self.sink.insert(sample.value(), &candidate).await {
            return self.fail(FailureCause::SinkWriteFailed(e.to_string()));
        }
        tracing::info!(
            value = sample.value(),
            observed_at = %sample.observed_at(),
            end = %candidate.end(),
            "synced calories"
        );

        self.advance_watermark(watermark, &candidate).await;

        SyncOutcome::Synced {
            value: sample.value(),
            interval: candidate,
        }
    }

    async fn read_watermark(&self) -> WatermarkView {
        match self.watermark_store.get().await {
            Ok(watermark) => WatermarkView::Known(watermark),
            Err(e) => {
                tracing::warn!(error = %e, "watermark unreadable, falling back to record store check");
                WatermarkView::Unknown
            }
        }
    }

    async fn mark_in_doubt(&self, candidate: &SyncInterval) {
        let mut local = self.local.lock().await;
        local.in_doubt = local.in_doubt.max(Some(candidate.end()));
    }

    /// Persist the watermark for a confirmed insert. The in-doubt marker is
    /// only released once the watermark, stored or pending, covers it.
    async fn advance_watermark(&self, current: WatermarkView, candidate: &SyncInterval) {
        let mut local = self.local.lock().await;
        match next_watermark(current, candidate) {
            None => {
                tracing::debug!(?current, "watermark already covers the written interval");
            }
            Some(next) => match self.watermark_store.set(next).await {
                Ok(()) => local.pending = None,
                Err(e) => {
                    tracing::warn!(error = %e, watermark = %next, "failed to persist watermark after successful sync");
                    local.pending = local.pending.max(Some(next));
                }
            },
        }
        local.in_doubt = local.in_doubt.filter(|end| *end > candidate.end());
    }

    fn fail(&self, cause: FailureCause) -> SyncOutcome {
        tracing::error!(%cause, "calorie sync failed");
        SyncOutcome::failed(cause)
    }
}
