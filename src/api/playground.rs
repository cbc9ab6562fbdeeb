//! Playground key validation endpoint

use axum::{
    extract::{FromRequest, Request, State},
    http::HeaderMap,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use tracing::debug;

use crate::api::middleware::{
    API_KEY_SESSION_COOKIE, API_KEY_SESSION_MAX_AGE, API_KEY_SESSION_VALID, enforce_rate_limit,
};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, SuccessResponse};
use crate::domain::validation::{MAX_API_KEY_LENGTH, is_valid_api_key_format, sanitize_string};
use crate::infrastructure::rate_limit::RateLimitPolicy;

/// Key validation request
#[derive(Debug, Deserialize)]
pub struct ValidateKeyRequest {
    pub key: Option<String>,
}

/// Validate an API key for playground access
///
/// POST /validate-key
///
/// A match against an active key grants a short-lived playground
/// session cookie. Validation does not update the key's `lastUsed`
/// timestamp.
pub async fn validate_key(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
) -> Result<(CookieJar, HeaderMap, Json<SuccessResponse>), ApiError> {
    let rate_headers = enforce_rate_limit(
        &state.rate_limiter,
        request.headers(),
        &RateLimitPolicy::api(),
    )
    .await?;

    let Json(body) = Json::<ValidateKeyRequest>::from_request(request, &()).await?;

    let key = sanitize_string(body.key.as_deref().unwrap_or(""), MAX_API_KEY_LENGTH);

    if key.is_empty() {
        return Err(ApiError::bad_request("API key is required."));
    }
    if !is_valid_api_key_format(&key) {
        return Err(ApiError::bad_request("Invalid API key format."));
    }

    let matched = state
        .api_key_service
        .validate(&key)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid or inactive API key."))?;

    debug!(key_id = %matched.id(), "playground key validated");

    let jar = jar.add(state.cookies.session_cookie(
        API_KEY_SESSION_COOKIE,
        API_KEY_SESSION_VALID,
        API_KEY_SESSION_MAX_AGE,
    ));

    Ok((jar, rate_headers, Json(SuccessResponse::ok())))
}
