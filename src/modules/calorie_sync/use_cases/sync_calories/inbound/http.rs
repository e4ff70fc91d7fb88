use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::modules::calorie_sync::core::outcome::SyncOutcome;
use crate::modules::calorie_sync::core::watermark_policy::WatermarkView;
use crate::modules::calorie_sync::use_cases::sync_calories::runner::{
    RunnerError, SyncStatus, Trigger,
};
use crate::shell::state::AppState;

#[derive(Serialize)]
pub struct SyncNowResponse {
    pub outcome: SyncOutcome,
    pub message: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub target: String,
    pub source: String,
    #[serde(flatten)]
    pub status: SyncStatus,
    pub watermark: Option<DateTime<Utc>>,
    pub watermark_readable: bool,
}

pub async fn sync_now(State(state): State<AppState>) -> impl IntoResponse {
    match state.runner.try_run(Trigger::Manual).await {
        Ok(outcome) => {
            let status = if outcome.is_failure() {
                StatusCode::SERVICE_UNAVAILABLE
            } else {
                StatusCode::OK
            };
            let message = outcome.to_string();
            (status, Json(SyncNowResponse { outcome, message })).into_response()
        }
        Err(e @ RunnerError::AlreadyRunning { .. }) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let (watermark, watermark_readable) = match state.runner.handler().current_watermark().await {
        WatermarkView::Known(watermark) => (watermark, true),
        WatermarkView::Unknown => (None, false),
    };
    Json(StatusResponse {
        target: state.runner.target().to_string(),
        source: state.runner.handler().source_name().to_string(),
        status: state.runner.status().await,
        watermark,
        watermark_readable,
    })
}
