//! User registration endpoint

use axum::{
    extract::{FromRequest, Request, State},
    http::{HeaderMap, StatusCode},
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::auth::UserProfileResponse;
use crate::api::middleware::{USER_SESSION_COOKIE, USER_SESSION_MAX_AGE, enforce_rate_limit};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::validation::{
    MAX_USERNAME_LENGTH, is_valid_password, is_valid_username, sanitize_string,
};
use crate::infrastructure::rate_limit::RateLimitPolicy;

/// Registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Registration response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: UserProfileResponse,
}

/// Register a new user
///
/// POST /users
///
/// Creates the account and signs the new user in by setting the
/// session cookie.
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
) -> Result<(StatusCode, CookieJar, HeaderMap, Json<RegisterResponse>), ApiError> {
    let rate_headers = enforce_rate_limit(
        &state.rate_limiter,
        request.headers(),
        &RateLimitPolicy::auth(),
    )
    .await?;

    let Json(body) = Json::<RegisterRequest>::from_request(request, &()).await?;

    let username = sanitize_string(body.username.as_deref().unwrap_or(""), MAX_USERNAME_LENGTH);
    let password = body.password.unwrap_or_default();

    if username.is_empty() || password.is_empty() {
        return Err(ApiError::bad_request("Username and password are required."));
    }
    if !is_valid_username(&username) {
        return Err(ApiError::bad_request(
            "Username must be 3-100 characters and contain only letters, numbers, and @._-",
        ));
    }
    if !is_valid_password(&password) {
        return Err(ApiError::bad_request(
            "Password must be between 6 and 128 characters.",
        ));
    }

    let user = state.user_service.register(&username, &password).await?;

    info!(user_id = %user.id(), "user registered");

    let jar = jar.add(state.cookies.session_cookie(
        USER_SESSION_COOKIE,
        user.id().to_string(),
        USER_SESSION_MAX_AGE,
    ));

    Ok((
        StatusCode::CREATED,
        jar,
        rate_headers,
        Json(RegisterResponse {
            user: UserProfileResponse::from_user(&user),
        }),
    ))
}
