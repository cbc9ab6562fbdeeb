//! Fixed-window request rate limiter

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Rate limit policy - how many requests a window admits and how long it lasts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Maximum requests admitted per window
    pub max_requests: u32,
    /// Window length in milliseconds
    pub window_ms: i64,
}

impl RateLimitPolicy {
    /// Create a policy with an explicit limit and window
    pub fn new(max_requests: u32, window_ms: i64) -> Self {
        Self {
            max_requests,
            window_ms,
        }
    }

    /// Preset for authentication endpoints: 5 requests per minute
    pub fn auth() -> Self {
        Self::new(5, 60_000)
    }

    /// Preset for API endpoints: 60 requests per minute
    pub fn api() -> Self {
        Self::new(60, 60_000)
    }

    fn window(&self) -> Duration {
        Duration::milliseconds(self.window_ms)
    }
}

/// Outcome of a rate limit check
///
/// Produced for every request, allowed or not, so handlers can attach
/// `X-RateLimit-*` headers to successful responses too.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitDecision {
    /// Whether the request is admitted
    pub allowed: bool,
    /// The policy's request limit
    pub limit: u32,
    /// Requests left in the current window
    pub remaining: u32,
    /// When the current window ends
    pub reset_at: DateTime<Utc>,
}

impl RateLimitDecision {
    /// Window end as milliseconds since the Unix epoch
    pub fn reset_epoch_ms(&self) -> i64 {
        self.reset_at.timestamp_millis()
    }
}

#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    count: u32,
    reset_at: DateTime<Utc>,
}

/// In-memory fixed-window rate limiter keyed by client identifier
///
/// Each identifier gets an independent counter that resets when its
/// window elapses. A window that has reached `reset_at` is treated as
/// expired, so a request arriving exactly at the boundary starts a
/// fresh window. Expired entries are purged opportunistically on every
/// check to keep the map bounded by the set of recently active clients.
#[derive(Debug, Default)]
pub struct RateLimiter {
    windows: RwLock<HashMap<String, WindowEntry>>,
}

impl RateLimiter {
    /// Create a new limiter with no tracked clients
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a request from `identifier` is admitted under `policy`
    pub async fn check(&self, identifier: &str, policy: &RateLimitPolicy) -> RateLimitDecision {
        self.check_at(identifier, policy, Utc::now()).await
    }

    async fn check_at(
        &self,
        identifier: &str,
        policy: &RateLimitPolicy,
        now: DateTime<Utc>,
    ) -> RateLimitDecision {
        let mut windows = self.windows.write().await;

        windows.retain(|_, entry| now < entry.reset_at);

        match windows.get_mut(identifier) {
            Some(entry) if entry.count >= policy.max_requests => RateLimitDecision {
                allowed: false,
                limit: policy.max_requests,
                remaining: 0,
                reset_at: entry.reset_at,
            },
            Some(entry) => {
                entry.count += 1;
                RateLimitDecision {
                    allowed: true,
                    limit: policy.max_requests,
                    remaining: policy.max_requests - entry.count,
                    reset_at: entry.reset_at,
                }
            }
            None => {
                let reset_at = now + policy.window();
                windows.insert(
                    identifier.to_string(),
                    WindowEntry { count: 1, reset_at },
                );
                RateLimitDecision {
                    allowed: true,
                    limit: policy.max_requests,
                    remaining: policy.max_requests - 1,
                    reset_at,
                }
            }
        }
    }
}
