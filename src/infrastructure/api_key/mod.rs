//! API key infrastructure module
//!
//! This module provides the in-memory and PostgreSQL repositories and
//! the API key service.

mod postgres_repository;
mod repository;
mod service;

pub use postgres_repository::PostgresApiKeyRepository;
pub use repository::InMemoryApiKeyRepository;
pub use service::{ApiKeyChanges, ApiKeyService, CreateApiKeyRequest};
