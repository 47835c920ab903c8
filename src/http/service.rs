//! Admission service endpoints.
//!
//! Edge functions that cannot embed the middleware ask this service for
//! an admission decision instead: they relay the original caller's
//! forwarded headers plus the authenticated user id, and name the policy
//! class that governs their endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info};

use crate::ratelimit::{Identifier, PolicyClass, WindowTracker};

use super::response::rejection_response;

/// Shared state for the admission endpoints.
#[derive(Clone)]
struct AppState {
    tracker: Arc<WindowTracker>,
}

/// An admission query from an edge function.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckRequest {
    /// Which policy class governs the calling endpoint
    policy: PolicyClass,
    /// Authenticated user id, when the edge function has one
    #[serde(default)]
    user_id: Option<String>,
}

/// Build the admission service router.
pub fn router(tracker: Arc<WindowTracker>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/check", post(check))
        .with_state(AppState { tracker })
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Decide admission for one request.
async fn check(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CheckRequest>,
) -> Response {
    let identifier = Identifier::derive(&headers, request.user_id.as_deref());
    let policy = request.policy.policy();

    debug!(
        identifier = %identifier,
        policy = ?request.policy,
        "Processing admission query"
    );

    let decision = state.tracker.check(&identifier, &policy);
    if !decision.admitted {
        info!(
            identifier = %identifier,
            policy = ?request.policy,
            "Rate limit exceeded"
        );
        return rejection_response(decision.remaining, decision.reset_time);
    }

    Json(decision).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::ratelimit::AUTH;

    fn check_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/v1/check")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = router(Arc::new(WindowTracker::new()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["status"], "healthy");
    }

    #[tokio::test]
    async fn test_check_admits_and_reports_quota() {
        let app = router(Arc::new(WindowTracker::new()));

        let response = app
            .oneshot(check_request(r#"{"policy":"auth","userId":"u1"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["admitted"], true);
        assert_eq!(json["remaining"], AUTH.max_requests - 1);
        assert!(json["resetTime"].is_i64());
    }

    #[tokio::test]
    async fn test_check_rejects_over_budget() {
        let app = router(Arc::new(WindowTracker::new()));

        for _ in 0..AUTH.max_requests {
            let response = app
                .clone()
                .oneshot(check_request(r#"{"policy":"auth","userId":"u1"}"#))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app
            .oneshot(check_request(r#"{"policy":"auth","userId":"u1"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let json = json_body(response).await;
        assert_eq!(json["error"], "Too Many Requests");
    }

    #[tokio::test]
    async fn test_check_anonymous_uses_forwarded_address() {
        let tracker = Arc::new(WindowTracker::new());
        let app = router(tracker.clone());

        let request = Request::builder()
            .method("POST")
            .uri("/v1/check")
            .header("content-type", "application/json")
            .header("x-forwarded-for", "9.9.9.9, 10.0.0.1")
            .body(Body::from(r#"{"policy":"api"}"#))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(tracker.count(&Identifier::from_addr("9.9.9.9")), Some(1));
    }

    #[tokio::test]
    async fn test_check_unknown_policy_name_rejected() {
        let app = router(Arc::new(WindowTracker::new()));

        let response = app
            .oneshot(check_request(r#"{"policy":"premium"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
