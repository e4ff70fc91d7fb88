use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::modules::calorie_sync::use_cases::sync_calories::inbound::http as sync_http;
use crate::modules::calorie_sync::use_cases::today_calories::inbound::http as today_http;
use crate::shell::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/sync-now", post(sync_http::sync_now))
        .route("/status", get(sync_http::status))
        .route("/today", get(today_http::handle))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod router_tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::router;
    use crate::tests::fixtures::{SyncHarness, app_state};

    #[tokio::test]
    async fn it_should_expose_the_sync_routes() {
        let harness = SyncHarness::new();
        harness.source.set_fallback("1800");
        let app = router(app_state(&harness));

        for (method, uri) in [("POST", "/sync-now"), ("GET", "/status"), ("GET", "/today")] {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .method(method)
                        .uri(uri)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{method} {uri}");
        }
    }

    #[tokio::test]
    async fn it_should_reject_a_get_on_sync_now() {
        let harness = SyncHarness::new();
        let response = router(app_state(&harness))
            .oneshot(Request::get("/sync-now").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
