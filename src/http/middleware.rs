//! Axum middleware enforcing a rate limit policy on wrapped routes.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use crate::ratelimit::{Identifier, Policy, UserId, WindowTracker};

use super::response::rejection_response;

/// State for the rate limit middleware: the shared tracker plus the policy
/// applied to the wrapped routes.
#[derive(Clone)]
pub struct RateLimitLayer {
    tracker: Arc<WindowTracker>,
    policy: Policy,
}

impl RateLimitLayer {
    /// Create middleware state guarding routes with `policy`.
    pub fn new(tracker: Arc<WindowTracker>, policy: Policy) -> Self {
        Self { tracker, policy }
    }
}

/// Middleware function for `axum::middleware::from_fn_with_state`.
///
/// Derives the caller's identifier (authenticated [`UserId`] extension
/// first, forwarded address otherwise), checks the budget, and
/// short-circuits with the standardized 429 when the caller is over it.
/// Admitted responses carry the remaining quota in a header.
pub async fn rate_limit(
    State(layer): State<RateLimitLayer>,
    request: Request,
    next: Next,
) -> Response {
    let user_id = request.extensions().get::<UserId>().map(|u| u.0.clone());
    let identifier = Identifier::derive(request.headers(), user_id.as_deref());

    let decision = layer.tracker.check(&identifier, &layer.policy);
    if !decision.admitted {
        debug!(identifier = %identifier, "Rejecting over-budget request");
        return rejection_response(decision.remaining, decision.reset_time);
    }

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&decision.remaining.to_string()) {
        response
            .headers_mut()
            .insert("x-ratelimit-remaining", value);
    }
    response
}
