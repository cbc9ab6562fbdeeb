//! API key domain
//!
//! This module provides domain types and traits for user-owned API keys,
//! including the key entity, the per-user cap, and the repository trait.

mod entity;
mod repository;

pub use entity::{ApiKey, ApiKeyId, MAX_KEYS_PER_USER};
pub use repository::ApiKeyRepository;

#[cfg(test)]
pub use repository::mock::MockApiKeyRepository;
