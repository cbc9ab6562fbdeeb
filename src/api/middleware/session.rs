//! Session cookie handling
//!
//! Sessions ride in a `user_session` cookie whose value is the user's
//! ID. The playground sets a separate short-lived `api_key_session`
//! cookie after a successful key validation.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::user::{User, UserId};
use crate::domain::validation::is_valid_uuid;

/// Cookie carrying the logged-in user's ID
pub const USER_SESSION_COOKIE: &str = "user_session";

/// Cookie set by a successful playground key validation
pub const API_KEY_SESSION_COOKIE: &str = "api_key_session";

/// Fixed value of the playground session cookie
pub const API_KEY_SESSION_VALID: &str = "valid";

/// User session lifetime (1 hour)
pub const USER_SESSION_MAX_AGE: Duration = Duration::seconds(3600);

/// Playground session lifetime (5 minutes)
pub const API_KEY_SESSION_MAX_AGE: Duration = Duration::seconds(300);

/// Cookie attributes that depend on the runtime environment
///
/// `Secure` is only set in production so local HTTP development keeps
/// working; everything else is fixed.
#[derive(Debug, Clone, Copy)]
pub struct CookiePolicy {
    secure: bool,
}

impl CookiePolicy {
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    /// Build a session cookie with the shared attribute set
    pub fn session_cookie(
        &self,
        name: &'static str,
        value: impl Into<String>,
        max_age: Duration,
    ) -> Cookie<'static> {
        Cookie::build((name, value.into()))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(max_age)
            .build()
    }

    /// Build an expired cookie that removes `name` from the client
    pub fn clear_cookie(&self, name: &'static str) -> Cookie<'static> {
        self.session_cookie(name, "", Duration::ZERO)
    }
}

/// Resolve the authenticated user's ID from the session cookie
///
/// A missing or empty cookie and a malformed one are reported
/// distinctly so clients can tell "log in" from "session is broken".
pub fn session_user_id(jar: &CookieJar) -> Result<UserId, ApiError> {
    let value = jar
        .get(USER_SESSION_COOKIE)
        .map(|cookie| cookie.value())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;

    if !is_valid_uuid(value) {
        return Err(ApiError::unauthorized("Invalid session."));
    }

    UserId::parse(value).map_err(|_| ApiError::unauthorized("Invalid session."))
}

/// Resolve the current user if a valid session cookie is present
///
/// Returns `None` for missing or malformed cookies, unknown users and
/// lookup failures alike; used where authentication is optional.
pub async fn try_session_user(jar: &CookieJar, state: &AppState) -> Option<User> {
    let user_id = session_user_id(jar).ok()?;

    state.user_service.get(&user_id).await.ok().flatten()
}

/// Extractor that requires a valid `user_session` cookie
///
/// Carries only the user's ID; the session cookie is the sole source
/// of identity, so no store lookup happens here.
#[derive(Debug, Clone, Copy)]
pub struct SessionUser(pub UserId);

impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::unauthorized("Unauthorized"))?;

        session_user_id(&jar).map(SessionUser)
    }
}
