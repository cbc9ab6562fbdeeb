//! Rate limiting infrastructure
//!
//! This module provides the in-memory fixed-window rate limiter used by
//! the HTTP layer, along with the per-endpoint-class policies.

mod limiter;

pub use limiter::{RateLimitDecision, RateLimitPolicy, RateLimiter};
