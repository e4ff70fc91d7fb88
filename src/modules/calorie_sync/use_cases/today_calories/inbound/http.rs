use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use serde::Serialize;

use crate::shell::state::AppState;

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub async fn handle(State(state): State<AppState>) -> impl IntoResponse {
    match state.today.handle(Utc::now()).await {
        Ok(total) => (StatusCode::OK, Json(total)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to read today's calories");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod today_calories_http_inbound_tests {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        routing::get,
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::handle;
    use crate::shell::state::AppState;
    use crate::tests::fixtures::{SyncHarness, app_state};

    fn app(state: AppState) -> Router {
        Router::new().route("/today", get(handle)).with_state(state)
    }

    #[tokio::test]
    async fn it_should_return_the_total_for_today() {
        let harness = SyncHarness::new();
        harness.source.push_state("1800");
        let state = app_state(&harness);
        state.runner.handler().attempt_sync(chrono::Utc::now()).await;

        let response = app(state)
            .oneshot(Request::get("/today").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["total_kcal"], 1800.0);
        assert_eq!(json["records"], 1);
    }

    #[tokio::test]
    async fn it_should_return_500_when_the_record_store_is_offline() {
        let harness = SyncHarness::new();
        harness.sink.toggle_offline();

        let response = app(app_state(&harness))
            .oneshot(Request::get("/today").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
