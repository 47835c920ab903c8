//! Identifier derivation for rate limit tracking.
//!
//! Callers are tracked under a namespaced key: authenticated users under
//! `user:<id>`, anonymous traffic under `ip:<addr>` resolved from the
//! trusted proxy header chain. The namespaces keep a user id from ever
//! colliding with an address.

use axum::http::HeaderMap;

/// Sentinel address used when no client address can be resolved.
///
/// All unidentifiable traffic shares the one `ip:unknown` budget, an
/// accepted coarse-grained tradeoff for callers whose proxies strip the
/// forwarding headers.
const UNKNOWN_ADDR: &str = "unknown";

/// Authenticated user id for a request.
///
/// Inserted into request extensions by the upstream auth layer; the rate
/// limit middleware reads it back out when deriving the caller's key.
#[derive(Debug, Clone)]
pub struct UserId(pub String);

/// A key that uniquely identifies a caller for rate limit tracking.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    /// Key for an authenticated user.
    pub fn from_user(user_id: &str) -> Self {
        Self(format!("user:{}", user_id))
    }

    /// Key for a network address.
    pub fn from_addr(addr: &str) -> Self {
        Self(format!("ip:{}", addr))
    }

    /// Derive the tracking key for a request.
    ///
    /// An authenticated user id always wins: it is unambiguous and immune
    /// to NAT or proxy sharing. Anonymous traffic falls back to the
    /// forwarded address chain, then to the shared `unknown` bucket.
    /// Derivation never fails.
    pub fn derive(headers: &HeaderMap, user_id: Option<&str>) -> Self {
        if let Some(id) = user_id {
            return Self::from_user(id);
        }
        Self::from_addr(client_addr(headers))
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolve the client address from the proxy header chain.
///
/// `x-forwarded-for` may carry a comma-separated chain; the first entry is
/// the original client. `x-real-ip` is consulted next.
fn client_addr(headers: &HeaderMap) -> &str {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first;
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip;
        }
    }

    UNKNOWN_ADDR
}
