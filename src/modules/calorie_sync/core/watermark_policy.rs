// Pure watermark rules for the duplicate guard.
//
// Responsibilities
// - Decide whether a candidate interval needs an existence check against the
//   record store before it may be written.
// - Compute the next watermark without ever moving it backwards.
// - Never perform input or output.

use crate::shared::core::interval::SyncInterval;
use chrono::{DateTime, Utc};

/// What the orchestrator knows about the last synced end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatermarkView {
    /// The store answered; `None` means nothing was ever synced.
    Known(Option<DateTime<Utc>>),
    /// The store could not be read.
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// No previously synced territory can overlap the candidate.
    WriteDirectly,
    /// The candidate reaches into synced (or possibly synced) territory.
    CheckExisting,
}

pub fn guard_decision(watermark: WatermarkView, candidate: &SyncInterval) -> GuardDecision {
    match watermark {
        WatermarkView::Known(None) => GuardDecision::WriteDirectly,
        WatermarkView::Known(Some(last_synced_end)) if candidate.start() <= last_synced_end => {
            GuardDecision::CheckExisting
        }
        WatermarkView::Known(Some(_)) => GuardDecision::WriteDirectly,
        WatermarkView::Unknown => GuardDecision::CheckExisting,
    }
}

/// Combine the persisted watermark with one that was computed in-process but
/// failed to persist.
pub fn effective_watermark(
    stored: WatermarkView,
    pending: Option<DateTime<Utc>>,
) -> WatermarkView {
    match (stored, pending) {
        (WatermarkView::Known(stored), pending) => WatermarkView::Known(stored.max(pending)),
        (WatermarkView::Unknown, _) => WatermarkView::Unknown,
    }
}

/// The watermark to persist after writing `candidate`, or `None` when the
/// known watermark is already at or past its end.
pub fn next_watermark(current: WatermarkView, candidate: &SyncInterval) -> Option<DateTime<Utc>> {
    match current {
        WatermarkView::Known(Some(current)) if current >= candidate.end() => None,
        _ => Some(candidate.end()),
    }
}
