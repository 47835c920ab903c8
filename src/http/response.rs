//! Standardized rejection responses for over-budget requests.
//!
//! The 429 status, body shape, and headers are a fixed wire contract;
//! browser clients parse them, so the shape must not drift.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// Request headers cross-origin callers are allowed to send.
const ALLOWED_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

/// JSON body of a rate limit rejection.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RejectionBody {
    error: &'static str,
    message: &'static str,
    /// Whole seconds until the window resets
    retry_after: i64,
}

/// Build the standardized 429 response for a rejected request.
pub fn rejection_response(remaining: u32, reset_time: i64) -> Response {
    rejection_response_at(remaining, reset_time, Utc::now().timestamp_millis())
}

fn rejection_response_at(remaining: u32, reset_time: i64, now: i64) -> Response {
    // Ceiling division, clamped to zero: a window expiring mid-second
    // still asks the client to wait out the full second.
    let retry_after = ((reset_time - now).max(0) + 999) / 1000;

    let reset_iso = DateTime::<Utc>::from_timestamp_millis(reset_time)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true);

    (
        StatusCode::TOO_MANY_REQUESTS,
        [
            ("x-ratelimit-remaining", remaining.to_string()),
            ("x-ratelimit-reset", reset_iso),
            ("retry-after", retry_after.to_string()),
            ("access-control-allow-origin", "*".to_string()),
            ("access-control-allow-headers", ALLOWED_HEADERS.to_string()),
        ],
        Json(RejectionBody {
            error: "Too Many Requests",
            message: "Rate limit exceeded. Please try again later.",
            retry_after,
        }),
    )
        .into_response()
}
