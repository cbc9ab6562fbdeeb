//! API key service
//!
//! Provides the per-user key management operations behind the HTTP
//! layer: listing, creation under the per-user cap, owner-checked
//! updates and deletes, and playground validation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::domain::DomainError;
use crate::domain::api_key::{ApiKey, ApiKeyId, ApiKeyRepository, MAX_KEYS_PER_USER};
use crate::domain::user::UserId;

/// Request for creating a new API key
///
/// Fields are expected to be validated and sanitized by the caller.
#[derive(Debug, Clone)]
pub struct CreateApiKeyRequest {
    pub name: String,
    pub description: Option<String>,
    pub key: String,
    pub is_active: bool,
}

/// A partial update to an API key
///
/// Outer `None` leaves a field unchanged. For `description` and
/// `last_used` the inner `None` clears the stored value.
#[derive(Debug, Clone, Default)]
pub struct ApiKeyChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub key: Option<String>,
    pub is_active: Option<bool>,
    pub last_used: Option<Option<DateTime<Utc>>>,
}

/// API key service scoped to per-user ownership
///
/// Mutations verify ownership with a single-row lookup before touching
/// the store, so a missing key and someone else's key produce distinct
/// errors. Storage failures are logged here with their cause and
/// replaced with the client-facing message for the failed step.
#[derive(Debug)]
pub struct ApiKeyService<R>
where
    R: ApiKeyRepository,
{
    repository: Arc<R>,
}

impl<R: ApiKeyRepository> ApiKeyService<R> {
    /// Create a new API key service
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// List a user's keys, newest first
    pub async fn list(&self, user_id: &UserId) -> Result<Vec<ApiKey>, DomainError> {
        self.repository.list_by_owner(user_id).await.map_err(|e| {
            tracing::error!(error = %e, "failed to list API keys");
            DomainError::storage("Failed to fetch API keys.")
        })
    }

    /// Create a new key for a user, subject to the per-user cap
    pub async fn create(
        &self,
        user_id: &UserId,
        request: CreateApiKeyRequest,
    ) -> Result<ApiKey, DomainError> {
        info!(user_id = %user_id, name = %request.name, "creating API key");

        let count = self.repository.count_by_owner(user_id).await.map_err(|e| {
            tracing::error!(error = %e, "failed to count API keys");
            DomainError::storage("Failed to check API key limit.")
        })?;

        if count >= MAX_KEYS_PER_USER {
            return Err(DomainError::limit_exceeded(cap_message()));
        }

        let mut key = ApiKey::new(ApiKeyId::generate(), *user_id, request.name, request.key)
            .with_active(request.is_active);
        if let Some(description) = request.description {
            key = key.with_description(description);
        }

        self.repository.create(key).await.map_err(|e| match e {
            // A concurrent create can land between the count and the
            // insert; the repository enforces the cap atomically.
            DomainError::LimitExceeded { .. } => DomainError::limit_exceeded(cap_message()),
            other => {
                tracing::error!(error = %other, "failed to create API key");
                DomainError::storage("Failed to create API key.")
            }
        })
    }

    /// Apply a partial update to a key the user owns
    pub async fn update(
        &self,
        user_id: &UserId,
        id: &ApiKeyId,
        changes: ApiKeyChanges,
    ) -> Result<ApiKey, DomainError> {
        debug!(user_id = %user_id, key_id = %id, "updating API key");

        let mut key = self
            .check_ownership(user_id, id, "Failed to update API key.")
            .await?;

        if let Some(name) = changes.name {
            key.set_name(name);
        }
        if let Some(description) = changes.description {
            key.set_description(description);
        }
        if let Some(new_key) = changes.key {
            key.set_key(new_key);
        }
        if let Some(is_active) = changes.is_active {
            key.set_active(is_active);
        }
        if let Some(last_used) = changes.last_used {
            key.set_last_used(last_used);
        }

        self.repository.update(&key).await.map_err(|e| match e {
            DomainError::NotFound { .. } => DomainError::not_found("API key not found."),
            other => {
                tracing::error!(error = %other, "failed to update API key");
                DomainError::storage("Failed to update API key.")
            }
        })
    }

    /// Delete a key the user owns
    pub async fn delete(&self, user_id: &UserId, id: &ApiKeyId) -> Result<(), DomainError> {
        info!(user_id = %user_id, key_id = %id, "deleting API key");

        self.check_ownership(user_id, id, "Failed to delete API key.")
            .await?;

        self.repository.delete(id, user_id).await.map_err(|e| match e {
            DomainError::NotFound { .. } => DomainError::not_found("API key not found."),
            other => {
                tracing::error!(error = %other, "failed to delete API key");
                DomainError::storage("Failed to delete API key.")
            }
        })
    }

    /// Check a raw key string against the set of active keys
    pub async fn validate(&self, key: &str) -> Result<Option<ApiKey>, DomainError> {
        self.repository.find_active_by_key(key).await.map_err(|e| {
            tracing::error!(error = %e, "failed to validate API key");
            DomainError::storage("Error validating API key.")
        })
    }

    /// Verify the key exists and belongs to the user before a mutation
    async fn check_ownership(
        &self,
        user_id: &UserId,
        id: &ApiKeyId,
        storage_message: &str,
    ) -> Result<ApiKey, DomainError> {
        let key = self.repository.get(id).await.map_err(|e| {
            tracing::error!(error = %e, "failed to fetch API key for ownership check");
            DomainError::storage(storage_message)
        })?;

        let key = key.ok_or_else(|| DomainError::not_found("API key not found."))?;

        if !key.is_owned_by(user_id) {
            return Err(DomainError::forbidden("Forbidden."));
        }

        Ok(key)
    }
}

fn cap_message() -> String {
    format!(
        "You have reached the maximum limit of {} API keys. Please delete an existing key before creating a new one.",
        MAX_KEYS_PER_USER
    )
}
