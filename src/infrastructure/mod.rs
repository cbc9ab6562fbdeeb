//! Infrastructure layer - External service implementations

pub mod api_key;
pub mod logging;
pub mod rate_limit;
pub mod user;
