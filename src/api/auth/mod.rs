//! Authentication API endpoints
//!
//! Provides login, logout, and session info endpoints for cookie-based
//! sessions. Login admission runs in a fixed order: rate limit first,
//! then content type and body shape, then field checks, then the
//! credential check.

use axum::{
    Router,
    extract::{FromRequest, Request, State},
    http::HeaderMap,
    routing::{get, post},
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::middleware::{
    API_KEY_SESSION_COOKIE, USER_SESSION_COOKIE, USER_SESSION_MAX_AGE, enforce_rate_limit,
    try_session_user,
};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, SuccessResponse};
use crate::domain::user::User;
use crate::domain::validation::{MAX_USERNAME_LENGTH, sanitize_string};
use crate::infrastructure::rate_limit::RateLimitPolicy;

/// Create the authentication router
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(get_current_user))
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserResponse,
}

/// User fields exposed at login
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
}

impl UserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            username: user.username().to_string(),
        }
    }
}

/// User fields exposed to an established session
#[derive(Debug, Serialize)]
pub struct UserProfileResponse {
    pub id: String,
    pub username: String,
    pub created_at: String,
}

impl UserProfileResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            username: user.username().to_string(),
            created_at: user.created_at().to_rfc3339(),
        }
    }
}

/// Current session response
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: Option<UserProfileResponse>,
}

/// Login with username and password
///
/// POST /auth/login
///
/// Sets the `user_session` cookie on success. Unknown usernames and
/// wrong passwords produce the same response.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
) -> Result<(CookieJar, HeaderMap, Json<LoginResponse>), ApiError> {
    let rate_headers = enforce_rate_limit(
        &state.rate_limiter,
        request.headers(),
        &RateLimitPolicy::auth(),
    )
    .await?;

    let Json(body) = Json::<LoginRequest>::from_request(request, &()).await?;

    let username = sanitize_string(body.username.as_deref().unwrap_or(""), MAX_USERNAME_LENGTH);
    let password = body.password.unwrap_or_default();

    if username.is_empty() || password.is_empty() {
        return Err(ApiError::bad_request("Username and password are required."));
    }

    let user = state
        .user_service
        .authenticate(&username, &password)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid username or password."))?;

    info!(user_id = %user.id(), "user logged in");

    let jar = jar.add(state.cookies.session_cookie(
        USER_SESSION_COOKIE,
        user.id().to_string(),
        USER_SESSION_MAX_AGE,
    ));

    Ok((
        jar,
        rate_headers,
        Json(LoginResponse {
            user: UserResponse::from_user(&user),
        }),
    ))
}

/// Log out the current session
///
/// POST /auth/logout
///
/// Clears both session cookies; succeeds whether or not a session
/// existed.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<SuccessResponse>) {
    let jar = jar
        .add(state.cookies.clear_cookie(USER_SESSION_COOKIE))
        .add(state.cookies.clear_cookie(API_KEY_SESSION_COOKIE));

    (jar, Json(SuccessResponse::ok()))
}

/// Get the current session's user
///
/// GET /auth/me
///
/// Never errors; without a valid session the user field is null.
pub async fn get_current_user(State(state): State<AppState>, jar: CookieJar) -> Json<MeResponse> {
    let user = try_session_user(&jar, &state).await;

    Json(MeResponse {
        user: user.as_ref().map(UserProfileResponse::from_user),
    })
}
