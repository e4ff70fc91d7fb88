// End to end sync flows over sequences of attempts against in memory
// adapters.
//
// Responsibilities
// - Assert that no instant is ever covered by two written records.
// - Assert that the watermark never moves backwards.
// - Assert recovery after failed inserts and failed watermark writes.

use crate::modules::calorie_sync::core::outcome::{FailureCause, SyncOutcome};
use crate::modules::calorie_sync::core::watermark_policy::WatermarkView;
use crate::shared::core::interval::SyncInterval;
use crate::shared::infrastructure::record_sink::HealthRecord;
use crate::shared::infrastructure::watermark_store::WatermarkStore;
use crate::tests::fixtures::{SyncHarness, t0};
use chrono::{DateTime, TimeDelta, Utc};
use rstest::{fixture, rstest};

#[fixture]
fn harness() -> SyncHarness {
    SyncHarness::new()
}

fn assert_no_overlap(records: &[HealthRecord]) {
    for (i, a) in records.iter().enumerate() {
        for b in records.iter().skip(i + 1) {
            assert!(
                !a.interval.intersects(b.interval.start(), b.interval.end()),
                "records {:?} and {:?} overlap",
                a.interval,
                b.interval
            );
        }
    }
}

fn minute_ending(end: DateTime<Utc>) -> SyncInterval {
    SyncInterval::new(end - TimeDelta::minutes(1), end).unwrap()
}

#[rstest]
#[case(TimeDelta::seconds(10))]
#[case(TimeDelta::seconds(25))]
#[case(TimeDelta::seconds(45))]
#[case(TimeDelta::seconds(60))]
#[case(TimeDelta::seconds(90))]
#[tokio::test]
async fn it_should_never_cover_an_instant_twice(harness: SyncHarness, #[case] step: TimeDelta) {
    harness.source.set_fallback("1800");
    let handler = harness.handler();

    let mut last_watermark = None;
    for i in 0..40 {
        handler.attempt_sync(t0() + step * i).await;
        let watermark = harness.watermarks.get().await.unwrap();
        assert!(watermark >= last_watermark, "watermark moved backwards");
        last_watermark = watermark;
    }

    let records = harness.sink.records().await;
    assert!(!records.is_empty());
    assert_no_overlap(&records);
}

#[rstest]
#[tokio::test]
async fn it_should_skip_retried_attempts_that_overlap_a_written_record(harness: SyncHarness) {
    harness.source.set_fallback("1800");
    let handler = harness.handler();
    handler.attempt_sync(t0()).await;

    let t1 = t0() + TimeDelta::seconds(40);
    for _ in 0..3 {
        let outcome = handler.attempt_sync(t1).await;
        assert_eq!(
            outcome,
            SyncOutcome::SkippedDuplicate {
                interval: minute_ending(t1)
            }
        );
    }
    assert_eq!(harness.sink.records().await.len(), 1);
    assert_eq!(harness.watermarks.get().await.unwrap(), Some(t0()));
}

#[rstest]
#[tokio::test]
async fn it_should_recover_from_a_failed_insert_by_rechecking_the_record_store() {
    let harness = SyncHarness::with_watermark(t0());
    harness.source.set_fallback("1800");
    let handler = harness.handler();

    harness.sink.fail_next_inserts(1);
    let t1 = t0() + TimeDelta::seconds(30);
    let failed = handler.attempt_sync(t1).await;
    assert!(matches!(
        failed,
        SyncOutcome::Failed {
            cause: FailureCause::SinkWriteFailed(_),
            retryable: true
        }
    ));
    assert_eq!(harness.watermarks.get().await.unwrap(), Some(t0()));
    let queries_before_retry = harness.sink.range_queries();

    let retried = handler.attempt_sync(t1).await;

    assert_eq!(
        retried,
        SyncOutcome::Synced {
            value: 1800.0,
            interval: minute_ending(t1)
        }
    );
    assert_eq!(harness.sink.range_queries(), queries_before_retry + 1);
    assert_eq!(harness.sink.records().await.len(), 1);
    assert_eq!(harness.watermarks.get().await.unwrap(), Some(t1));
}

#[rstest]
#[tokio::test]
async fn it_should_skip_the_next_attempt_after_a_failed_watermark_write(harness: SyncHarness) {
    harness.source.set_fallback("1800");
    let handler = harness.handler();

    harness.watermarks.set_failing_writes(true);
    let first = handler.attempt_sync(t0()).await;
    assert!(matches!(first, SyncOutcome::Synced { .. }));
    assert_eq!(harness.watermarks.get().await.unwrap(), None);

    let second = handler.attempt_sync(t0() + TimeDelta::seconds(20)).await;

    assert!(matches!(second, SyncOutcome::SkippedDuplicate { .. }));
    assert_eq!(harness.sink.range_queries(), 1);
    assert_eq!(harness.sink.records().await.len(), 1);
}

#[rstest]
#[tokio::test]
async fn it_should_persist_the_pending_watermark_once_the_store_recovers(harness: SyncHarness) {
    harness.source.set_fallback("1800");
    let handler = harness.handler();

    harness.watermarks.set_failing_writes(true);
    handler.attempt_sync(t0()).await;
    harness.watermarks.set_failing_writes(false);

    let t1 = t0() + TimeDelta::minutes(2);
    let outcome = handler.attempt_sync(t1).await;

    assert!(matches!(outcome, SyncOutcome::Synced { .. }));
    assert_eq!(harness.watermarks.get().await.unwrap(), Some(t1));
    assert_eq!(
        handler.current_watermark().await,
        WatermarkView::Known(Some(t1))
    );
    assert_no_overlap(&harness.sink.records().await);
}

#[rstest]
#[tokio::test]
async fn it_should_insert_when_the_guard_finds_no_record_for_a_stale_watermark() {
    let harness = SyncHarness::with_watermark(t0());
    harness.source.set_fallback("2100.5");

    let t1 = t0() + TimeDelta::seconds(30);
    let outcome = harness.handler().attempt_sync(t1).await;

    assert_eq!(
        outcome,
        SyncOutcome::Synced {
            value: 2100.5,
            interval: minute_ending(t1)
        }
    );
    assert_eq!(harness.sink.range_queries(), 1);
}

#[rstest]
#[tokio::test]
async fn it_should_not_lower_the_watermark_when_the_clock_goes_backwards(harness: SyncHarness) {
    harness.source.set_fallback("1800");
    let handler = harness.handler();
    handler.attempt_sync(t0()).await;

    let outcome = handler.attempt_sync(t0() - TimeDelta::minutes(10)).await;

    assert!(matches!(outcome, SyncOutcome::Synced { .. }));
    assert_eq!(harness.watermarks.get().await.unwrap(), Some(t0()));
    assert_eq!(harness.watermarks.writes(), 1);
}
