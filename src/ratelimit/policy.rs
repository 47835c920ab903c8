//! Rate limit policies and the named policy catalog.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A rate limit policy: how many requests are admitted per fixed window.
///
/// Both fields must be at least 1; a policy that admits nothing or has an
/// empty window is a caller bug, not a runtime condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Maximum admitted requests per window
    pub max_requests: u32,
    /// Window duration in milliseconds
    pub window_ms: u64,
}

impl Policy {
    /// Create a new policy.
    pub const fn new(max_requests: u32, window_ms: u64) -> Self {
        Self {
            max_requests,
            window_ms,
        }
    }

    /// The window as a `Duration`.
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

/// Login and credential endpoints: 5 requests per 15 minutes.
pub const AUTH: Policy = Policy::new(5, 15 * 60 * 1000);
/// Model inference endpoints: 20 requests per minute.
pub const AI: Policy = Policy::new(20, 60 * 1000);
/// General API traffic: 60 requests per minute.
pub const API: Policy = Policy::new(60, 60 * 1000);
/// Endpoints with expensive side effects: 10 requests per minute.
pub const EXPENSIVE: Policy = Policy::new(10, 60 * 1000);

/// Endpoint classes selectable by name on the admission API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyClass {
    Auth,
    Ai,
    Api,
    Expensive,
}

impl PolicyClass {
    /// The catalog policy for this class.
    pub fn policy(&self) -> Policy {
        match self {
            PolicyClass::Auth => AUTH,
            PolicyClass::Ai => AI,
            PolicyClass::Api => API,
            PolicyClass::Expensive => EXPENSIVE,
        }
    }
}
