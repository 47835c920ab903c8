//! Core fixed-window rate limiter implementation.

use std::collections::HashMap;

use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, trace};

use super::identity::Identifier;
use super::policy::Policy;

/// Tracking state for one identifier's current window.
#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    /// Requests counted in the current window, including overflow requests
    /// that were rejected
    count: u64,
    /// Epoch milliseconds at which the current window expires
    reset_time: i64,
}

/// The outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    /// Whether the request may proceed
    pub admitted: bool,
    /// Admissions left in the current window
    pub remaining: u32,
    /// Epoch milliseconds at which the current window expires
    pub reset_time: i64,
}

/// Per-identifier fixed-window request tracking.
///
/// The tracker holds at most one live entry per identifier and decides
/// admit/reject in O(1) per check. A fixed-window counter admits up to
/// `2 x max_requests` across a rolling window that straddles a reset
/// boundary; that burst artifact is the accepted cost of constant memory
/// per identifier.
///
/// This struct is thread-safe and can be shared across multiple tasks.
pub struct WindowTracker {
    /// Live window entries indexed by identifier
    entries: RwLock<HashMap<Identifier, WindowEntry>>,
}

impl WindowTracker {
    /// Create a new, empty tracker.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Check whether a request from `identifier` is admitted under `policy`.
    ///
    /// Increments the counter for the identifier's current window and
    /// returns the decision. This never fails: a request over budget is
    /// counted, then rejected.
    pub fn check(&self, identifier: &Identifier, policy: &Policy) -> Decision {
        self.check_at(identifier, policy, Utc::now().timestamp_millis())
    }

    pub(crate) fn check_at(&self, identifier: &Identifier, policy: &Policy, now: i64) -> Decision {
        debug_assert!(policy.max_requests >= 1, "policy admits no requests");
        debug_assert!(policy.window_ms >= 1, "policy window is empty");

        trace!(identifier = %identifier, "Checking rate limit");

        // The write lock is held across the read-modify-write so two
        // concurrent checks for the same identifier cannot both observe
        // the same count.
        let mut entries = self.entries.write();

        match entries.get_mut(identifier) {
            Some(entry) if now < entry.reset_time => {
                entry.count += 1;
                if entry.count > u64::from(policy.max_requests) {
                    debug!(
                        identifier = %identifier,
                        count = entry.count,
                        limit = policy.max_requests,
                        "Rate limit exceeded"
                    );
                    Decision {
                        admitted: false,
                        remaining: 0,
                        reset_time: entry.reset_time,
                    }
                } else {
                    Decision {
                        admitted: true,
                        remaining: policy.max_requests - entry.count as u32,
                        reset_time: entry.reset_time,
                    }
                }
            }
            // First request for this identifier, or its window has
            // expired: open a fresh window.
            _ => {
                let reset_time = now + policy.window_ms as i64;
                entries.insert(identifier.clone(), WindowEntry { count: 1, reset_time });
                debug!(
                    identifier = %identifier,
                    reset_time,
                    "Opened new rate limit window"
                );
                Decision {
                    admitted: true,
                    remaining: policy.max_requests - 1,
                    reset_time,
                }
            }
        }
    }

    /// Remove every entry whose window has already expired.
    ///
    /// Housekeeping only: `check` detects expired windows on access, so
    /// correctness never depends on the sweep having run. Returns the
    /// number of entries removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Utc::now().timestamp_millis())
    }

    pub(crate) fn sweep_at(&self, now: i64) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.reset_time >= now);
        before - entries.len()
    }

    /// Get the current count for an identifier, if it is being tracked.
    pub fn count(&self, identifier: &Identifier) -> Option<u64> {
        self.entries.read().get(identifier).map(|e| e.count)
    }

    /// Get the number of live tracking entries.
    pub fn entry_count(&self) -> usize {
        self.entries.read().len()
    }

    /// Drop all tracking entries.
    ///
    /// This is primarily useful for testing.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl Default for WindowTracker {
    fn default() -> Self {
        Self::new()
    }
}
