//! API layer - HTTP endpoints and middleware

pub mod api_keys;
pub mod auth;
pub mod health;
pub mod middleware;
pub mod playground;
pub mod router;
pub mod state;
pub mod types;
pub mod users;

pub use middleware::SessionUser;
pub use router::create_router_with_state;
pub use state::AppState;
