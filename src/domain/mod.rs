//! Domain layer - Core business logic and entities

pub mod api_key;
pub mod error;
pub mod user;
pub mod validation;

pub use api_key::{ApiKey, ApiKeyId, ApiKeyRepository, MAX_KEYS_PER_USER};
pub use error::DomainError;
pub use user::{User, UserId, UserRepository};
