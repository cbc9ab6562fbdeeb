//! HTTP middleware

pub mod rate_limit;
pub mod security;
pub mod session;

pub use rate_limit::{client_identifier, enforce_rate_limit, rate_limit_headers};
pub use security::{MAX_BODY_SIZE, body_limit_middleware, security_headers_middleware};
pub use session::{
    API_KEY_SESSION_COOKIE, API_KEY_SESSION_MAX_AGE, API_KEY_SESSION_VALID, CookiePolicy,
    SessionUser, USER_SESSION_COOKIE, USER_SESSION_MAX_AGE, session_user_id, try_session_user,
};
