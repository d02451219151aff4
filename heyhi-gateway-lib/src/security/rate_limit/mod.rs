//! Per-client, per-route rate limiting.
//!
//! Requests are counted in fixed 60-second windows keyed by a hash of the
//! client identity and the route path. The limit comes from the request's
//! configuration snapshot, so a reload takes effect on the next check.
//!
//! ```ignore
//! use heyhi_gateway_lib::security::rate_limit::RateLimiter;
//!
//! let limiter = RateLimiter::new();
//! if limiter.check("203.0.113.7", "/chat", 120).is_limited() {
//!     // answer 429 RATE_LIMIT_EXCEEDED
//! }
//! ```

mod limiter;

pub use limiter::{RateLimitResult, RateLimiter, WINDOW};

use ahash::RandomState;
use std::net::SocketAddr;

// Fixed seeds keep bucket keys stable for the life of the process and across
// limiter instances.
const KEY_SEEDS: (u64, u64, u64, u64) =
    (0x6865_7968_695f_726c, 0x0000_0000_0000_003c, 0x9e37_79b9_7f4a_7c15, 0xc2b2_ae3d_27d4_eb4f);

/// Stable bucket key for a `(client, route)` pair
pub fn bucket_key(client: &str, route: &str) -> u64 {
    let hasher = RandomState::with_seeds(KEY_SEEDS.0, KEY_SEEDS.1, KEY_SEEDS.2, KEY_SEEDS.3);
    hasher.hash_one((client, route))
}

/// Client identity used for rate limiting
///
/// The peer IP, or the first `X-Forwarded-For` entry when the gateway runs
/// behind a trusted proxy.
pub fn client_identity(
    peer: SocketAddr,
    headers: &http::HeaderMap,
    trust_forwarded_for: bool,
) -> String {
    if trust_forwarded_for {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .map(str::trim)
            .filter(|s| !s.is_empty());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }
    peer.ip().to_string()
}
