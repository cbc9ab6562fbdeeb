//! Per-client rate limiting for request admission
//!
//! Handlers call [`enforce_rate_limit`] first, before reading the body;
//! the returned headers are echoed on success responses so clients can
//! see their remaining budget.

use axum::http::{HeaderMap, HeaderValue, header};
use tracing::debug;

use crate::api::types::ApiError;
use crate::infrastructure::rate_limit::{RateLimitDecision, RateLimitPolicy, RateLimiter};

/// Resolve the client identifier used as the rate limit key
///
/// The first entry of `x-forwarded-for` wins, then `x-real-ip`; clients
/// with neither all share the `"unknown"` bucket.
pub fn client_identifier(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Build the `X-RateLimit-*` response headers for a decision
pub fn rate_limit_headers(decision: &RateLimitDecision) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("x-ratelimit-limit", HeaderValue::from(decision.limit));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(decision.remaining));
    headers.insert("x-ratelimit-reset", HeaderValue::from(decision.reset_epoch_ms()));
    headers
}

/// Check the caller against `policy`
///
/// Returns the rate limit headers to attach to the success response, or
/// a ready-made 429 carrying the same headers plus `Retry-After`.
pub async fn enforce_rate_limit(
    limiter: &RateLimiter,
    headers: &HeaderMap,
    policy: &RateLimitPolicy,
) -> Result<HeaderMap, ApiError> {
    let identifier = client_identifier(headers);
    let decision = limiter.check(&identifier, policy).await;
    let mut rate_headers = rate_limit_headers(&decision);

    if !decision.allowed {
        debug!(identifier = %identifier, "rate limit exceeded");
        rate_headers.insert(header::RETRY_AFTER, HeaderValue::from_static("60"));
        return Err(
            ApiError::rate_limited("Too many requests. Please try again later.")
                .with_headers(rate_headers),
        );
    }

    Ok(rate_headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn headers_with(name: &'static str, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, value.parse().unwrap());
        headers
    }

    #[test]
    fn test_identifier_prefers_forwarded_for() {
        let mut headers = headers_with("x-forwarded-for", "203.0.113.7, 10.0.0.1");
        headers.insert("x-real-ip", "192.0.2.1".parse().unwrap());

        assert_eq!(client_identifier(&headers), "203.0.113.7");
    }

    #[test]
    fn test_identifier_trims_forwarded_entry() {
        let headers = headers_with("x-forwarded-for", "  203.0.113.7  ");

        assert_eq!(client_identifier(&headers), "203.0.113.7");
    }

    #[test]
    fn test_identifier_falls_back_to_real_ip() {
        let headers = headers_with("x-real-ip", "192.0.2.1");

        assert_eq!(client_identifier(&headers), "192.0.2.1");
    }

    #[test]
    fn test_identifier_defaults_to_unknown() {
        assert_eq!(client_identifier(&HeaderMap::new()), "unknown");
    }

    #[tokio::test]
    async fn test_rate_limit_headers() {
        let limiter = RateLimiter::new();
        let decision = limiter.check("203.0.113.7", &RateLimitPolicy::auth()).await;

        let headers = rate_limit_headers(&decision);
        assert_eq!(headers["x-ratelimit-limit"], "5");
        assert_eq!(headers["x-ratelimit-remaining"], "4");
        assert!(headers.contains_key("x-ratelimit-reset"));
    }

    #[tokio::test]
    async fn test_enforce_allows_within_limit() {
        let limiter = RateLimiter::new();
        let headers = headers_with("x-forwarded-for", "203.0.113.7");

        let result = enforce_rate_limit(&limiter, &headers, &RateLimitPolicy::auth()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_enforce_rejects_over_limit() {
        let limiter = RateLimiter::new();
        let headers = headers_with("x-forwarded-for", "203.0.113.7");
        let policy = RateLimitPolicy::auth();

        for _ in 0..5 {
            enforce_rate_limit(&limiter, &headers, &policy).await.unwrap();
        }

        let error = enforce_rate_limit(&limiter, &headers, &policy)
            .await
            .unwrap_err();
        assert_eq!(error.status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(error.message(), "Too many requests. Please try again later.");
    }

    #[tokio::test]
    async fn test_separate_identifiers_do_not_share_windows() {
        let limiter = RateLimiter::new();
        let policy = RateLimitPolicy::auth();

        for _ in 0..5 {
            let headers = headers_with("x-forwarded-for", "203.0.113.7");
            enforce_rate_limit(&limiter, &headers, &policy).await.unwrap();
        }

        let headers = headers_with("x-forwarded-for", "198.51.100.2");
        assert!(enforce_rate_limit(&limiter, &headers, &policy).await.is_ok());
    }
}
