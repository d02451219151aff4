//! Fixed-window rate limiter.
//!
//! Each `(client, route)` pair owns a bucket holding a counter and the instant
//! its window ends. The window is anchored at the bucket's creation, not at
//! each request, so a burst straddling a window boundary can admit up to twice
//! the limit within a short span. That coarseness is part of the contract.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::time::{Duration, Instant};

use super::bucket_key;

/// Length of one rate-limit window in production
pub const WINDOW: Duration = Duration::from_secs(60);

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed to proceed.
    Allowed {
        /// Maximum number of requests allowed in the window
        limit: u32,
        /// Number of requests remaining in the current window
        remaining: u32,
    },
    /// Request is rate limited and should be rejected.
    Limited {
        /// Maximum number of requests allowed in the window
        limit: u32,
        /// Time until the current window ends
        reset_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }

    pub fn is_limited(&self) -> bool {
        matches!(self, RateLimitResult::Limited { .. })
    }

    pub fn limit(&self) -> u32 {
        match self {
            RateLimitResult::Allowed { limit, .. } => *limit,
            RateLimitResult::Limited { limit, .. } => *limit,
        }
    }

    pub fn remaining(&self) -> u32 {
        match self {
            RateLimitResult::Allowed { remaining, .. } => *remaining,
            RateLimitResult::Limited { .. } => 0,
        }
    }

    pub fn reset_after(&self) -> Option<Duration> {
        match self {
            RateLimitResult::Limited { reset_after, .. } => Some(*reset_after),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct RateBucket {
    count: u32,
    expires_at: Instant,
}

impl RateBucket {
    fn open(now: Instant, window: Duration) -> Self {
        Self { count: 1, expires_at: now + window }
    }

    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Per-client, per-route request counter with fixed windows
///
/// Buckets live in a sharded map; the read-compare-increment of one bucket
/// happens under that bucket's shard lock, so concurrent requests on the same
/// key can never push the count past the limit.
pub struct RateLimiter {
    buckets: DashMap<u64, RateBucket, ahash::RandomState>,
    window: Duration,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiter {
    /// Limiter with the standard 60-second window
    pub fn new() -> Self {
        Self::with_window(WINDOW)
    }

    pub fn with_window(window: Duration) -> Self {
        Self { buckets: DashMap::with_hasher(ahash::RandomState::new()), window }
    }

    /// Count one request from `client` on `route` against `limit_per_window`
    ///
    /// A denied request does not increment the counter.
    pub fn check(&self, client: &str, route: &str, limit_per_window: u32) -> RateLimitResult {
        self.check_at(client, route, limit_per_window, Instant::now())
    }

    fn check_at(&self, client: &str, route: &str, limit: u32, now: Instant) -> RateLimitResult {
        let key = bucket_key(client, route);

        match self.buckets.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(RateBucket::open(now, self.window));
                RateLimitResult::Allowed { limit, remaining: limit.saturating_sub(1) }
            }
            Entry::Occupied(mut slot) => {
                let bucket = slot.get_mut();
                if bucket.is_expired(now) {
                    *bucket = RateBucket::open(now, self.window);
                    return RateLimitResult::Allowed { limit, remaining: limit.saturating_sub(1) };
                }
                if bucket.count >= limit {
                    return RateLimitResult::Limited {
                        limit,
                        reset_after: bucket.expires_at.saturating_duration_since(now),
                    };
                }
                bucket.count = bucket.count.saturating_add(1);
                RateLimitResult::Allowed { limit, remaining: limit.saturating_sub(bucket.count) }
            }
        }
    }

    /// Current count for a key, `None` if no live bucket exists
    pub fn current_count(&self, client: &str, route: &str) -> Option<u32> {
        let now = Instant::now();
        self.buckets
            .get(&bucket_key(client, route))
            .filter(|b| !b.is_expired(now))
            .map(|b| b.count)
    }

    /// Drop expired buckets; returns how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.buckets.len();
        self.buckets.retain(|_, bucket| !bucket.is_expired(now));
        before.saturating_sub(self.buckets.len())
    }

    /// Number of buckets currently stored, expired ones included
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}
