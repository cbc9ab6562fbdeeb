//! Application state for shared services

use std::sync::Arc;

use crate::domain::DomainError;
use crate::domain::api_key::{ApiKey, ApiKeyId, ApiKeyRepository};
use crate::domain::user::{User, UserId, UserRepository};
use crate::infrastructure::api_key::{ApiKeyChanges, ApiKeyService, CreateApiKeyRequest};
use crate::infrastructure::rate_limit::RateLimiter;
use crate::infrastructure::user::{PasswordHasher, UserService};

use super::middleware::CookiePolicy;

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServiceTrait>,
    pub api_key_service: Arc<dyn ApiKeyServiceTrait>,
    pub rate_limiter: Arc<RateLimiter>,
    pub cookies: CookiePolicy,
}

/// Trait for user service operations
#[async_trait::async_trait]
pub trait UserServiceTrait: Send + Sync {
    async fn register(&self, username: &str, password: &str) -> Result<User, DomainError>;
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError>;
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError>;
}

/// Trait for API key service operations
#[async_trait::async_trait]
pub trait ApiKeyServiceTrait: Send + Sync {
    async fn list(&self, user_id: &UserId) -> Result<Vec<ApiKey>, DomainError>;
    async fn create(
        &self,
        user_id: &UserId,
        request: CreateApiKeyRequest,
    ) -> Result<ApiKey, DomainError>;
    async fn update(
        &self,
        user_id: &UserId,
        id: &ApiKeyId,
        changes: ApiKeyChanges,
    ) -> Result<ApiKey, DomainError>;
    async fn delete(&self, user_id: &UserId, id: &ApiKeyId) -> Result<(), DomainError>;
    async fn validate(&self, key: &str) -> Result<Option<ApiKey>, DomainError>;
}

// Implement traits for the actual services

#[async_trait::async_trait]
impl<R: UserRepository + 'static, H: PasswordHasher + 'static> UserServiceTrait
    for UserService<R, H>
{
    async fn register(&self, username: &str, password: &str) -> Result<User, DomainError> {
        UserService::register(self, username, password).await
    }

    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        UserService::authenticate(self, username, password).await
    }

    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        UserService::get(self, id).await
    }
}

#[async_trait::async_trait]
impl<R: ApiKeyRepository + 'static> ApiKeyServiceTrait for ApiKeyService<R> {
    async fn list(&self, user_id: &UserId) -> Result<Vec<ApiKey>, DomainError> {
        ApiKeyService::list(self, user_id).await
    }

    async fn create(
        &self,
        user_id: &UserId,
        request: CreateApiKeyRequest,
    ) -> Result<ApiKey, DomainError> {
        ApiKeyService::create(self, user_id, request).await
    }

    async fn update(
        &self,
        user_id: &UserId,
        id: &ApiKeyId,
        changes: ApiKeyChanges,
    ) -> Result<ApiKey, DomainError> {
        ApiKeyService::update(self, user_id, id, changes).await
    }

    async fn delete(&self, user_id: &UserId, id: &ApiKeyId) -> Result<(), DomainError> {
        ApiKeyService::delete(self, user_id, id).await
    }

    async fn validate(&self, key: &str) -> Result<Option<ApiKey>, DomainError> {
        ApiKeyService::validate(self, key).await
    }
}

impl AppState {
    /// Create new application state with provided services
    pub fn new(
        user_service: Arc<dyn UserServiceTrait>,
        api_key_service: Arc<dyn ApiKeyServiceTrait>,
        rate_limiter: Arc<RateLimiter>,
        cookies: CookiePolicy,
    ) -> Self {
        Self {
            user_service,
            api_key_service,
            rate_limiter,
            cookies,
        }
    }
}
