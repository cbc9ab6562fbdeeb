//! In-memory API key repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::DomainError;
use crate::domain::api_key::{ApiKey, ApiKeyId, ApiKeyRepository, MAX_KEYS_PER_USER};
use crate::domain::user::UserId;

/// In-memory implementation of ApiKeyRepository
///
/// The per-user cap is enforced inside the write lock, so concurrent
/// creates for the same user cannot overshoot it.
#[derive(Debug)]
pub struct InMemoryApiKeyRepository {
    keys: Arc<RwLock<HashMap<ApiKeyId, ApiKey>>>,
}

impl InMemoryApiKeyRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self {
            keys: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryApiKeyRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiKeyRepository for InMemoryApiKeyRepository {
    async fn get(&self, id: &ApiKeyId) -> Result<Option<ApiKey>, DomainError> {
        let keys = self.keys.read().await;
        Ok(keys.get(id).cloned())
    }

    async fn list_by_owner(&self, user_id: &UserId) -> Result<Vec<ApiKey>, DomainError> {
        let keys = self.keys.read().await;

        let mut result: Vec<ApiKey> = keys
            .values()
            .filter(|k| k.is_owned_by(user_id))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at().cmp(&a.created_at()));

        Ok(result)
    }

    async fn count_by_owner(&self, user_id: &UserId) -> Result<usize, DomainError> {
        let keys = self.keys.read().await;
        Ok(keys.values().filter(|k| k.is_owned_by(user_id)).count())
    }

    async fn find_active_by_key(&self, key: &str) -> Result<Option<ApiKey>, DomainError> {
        let keys = self.keys.read().await;
        Ok(keys
            .values()
            .find(|k| k.key() == key && k.is_active())
            .cloned())
    }

    async fn create(&self, key: ApiKey) -> Result<ApiKey, DomainError> {
        let mut keys = self.keys.write().await;

        let owned = keys
            .values()
            .filter(|k| k.is_owned_by(&key.user_id()))
            .count();
        if owned >= MAX_KEYS_PER_USER {
            return Err(DomainError::limit_exceeded(format!(
                "User '{}' already has {} API keys",
                key.user_id(),
                MAX_KEYS_PER_USER
            )));
        }

        keys.insert(key.id(), key.clone());
        Ok(key)
    }

    async fn update(&self, key: &ApiKey) -> Result<ApiKey, DomainError> {
        let mut keys = self.keys.write().await;

        match keys.get(&key.id()) {
            Some(existing) if existing.is_owned_by(&key.user_id()) => {
                keys.insert(key.id(), key.clone());
                Ok(key.clone())
            }
            _ => Err(DomainError::not_found(format!(
                "API key '{}' not found for user '{}'",
                key.id(),
                key.user_id()
            ))),
        }
    }

    async fn delete(&self, id: &ApiKeyId, user_id: &UserId) -> Result<(), DomainError> {
        let mut keys = self.keys.write().await;

        match keys.get(id) {
            Some(existing) if existing.is_owned_by(user_id) => {
                keys.remove(id);
                Ok(())
            }
            _ => Err(DomainError::not_found(format!(
                "API key '{}' not found for user '{}'",
                id, user_id
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_key(user_id: UserId, name: &str, key: &str) -> ApiKey {
        ApiKey::new(ApiKeyId::generate(), user_id, name, key)
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = InMemoryApiKeyRepository::new();
        let key = create_test_key(UserId::generate(), "Test Key", "api_0123456789abcdef");

        repo.create(key.clone()).await.unwrap();

        let retrieved = repo.get(&key.id()).await.unwrap();
        assert!(retrieved.is_some());
        assert_eq!(retrieved.unwrap().name(), "Test Key");
    }

    #[tokio::test]
    async fn test_list_by_owner_newest_first() {
        let repo = InMemoryApiKeyRepository::new();
        let owner = UserId::generate();

        let older = ApiKey::from_storage(
            ApiKeyId::generate(),
            owner,
            "Older".to_string(),
            None,
            "api_0123456789abcdef".to_string(),
            true,
            chrono::Utc::now() - chrono::Duration::hours(2),
            None,
        );
        let newer = ApiKey::from_storage(
            ApiKeyId::generate(),
            owner,
            "Newer".to_string(),
            None,
            "api_fedcba9876543210".to_string(),
            true,
            chrono::Utc::now(),
            None,
        );

        repo.create(older).await.unwrap();
        repo.create(newer).await.unwrap();

        let listed = repo.list_by_owner(&owner).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name(), "Newer");
        assert_eq!(listed[1].name(), "Older");
    }

    #[tokio::test]
    async fn test_list_by_owner_scoped_to_user() {
        let repo = InMemoryApiKeyRepository::new();
        let owner = UserId::generate();

        repo.create(create_test_key(owner, "Mine", "api_0123456789abcdef"))
            .await
            .unwrap();
        repo.create(create_test_key(
            UserId::generate(),
            "Theirs",
            "api_fedcba9876543210",
        ))
        .await
        .unwrap();

        let listed = repo.list_by_owner(&owner).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name(), "Mine");
    }

    #[tokio::test]
    async fn test_find_active_by_key() {
        let repo = InMemoryApiKeyRepository::new();
        let owner = UserId::generate();

        repo.create(create_test_key(owner, "Active", "api_0123456789abcdef"))
            .await
            .unwrap();
        repo.create(
            create_test_key(owner, "Disabled", "api_fedcba9876543210").with_active(false),
        )
        .await
        .unwrap();

        let active = repo.find_active_by_key("api_0123456789abcdef").await.unwrap();
        assert!(active.is_some());

        let disabled = repo.find_active_by_key("api_fedcba9876543210").await.unwrap();
        assert!(disabled.is_none());

        let unknown = repo.find_active_by_key("api_doesnotexist1234").await.unwrap();
        assert!(unknown.is_none());
    }

    #[tokio::test]
    async fn test_create_enforces_cap_per_user() {
        let repo = InMemoryApiKeyRepository::new();
        let owner = UserId::generate();

        for i in 0..MAX_KEYS_PER_USER {
            repo.create(create_test_key(
                owner,
                &format!("Key {}", i),
                &format!("api_{:016}", i),
            ))
            .await
            .unwrap();
        }

        let result = repo
            .create(create_test_key(owner, "Overflow", "api_overflow12345678"))
            .await;
        assert!(matches!(result, Err(DomainError::LimitExceeded { .. })));

        // Another user is unaffected by the first user's cap.
        let other = repo
            .create(create_test_key(
                UserId::generate(),
                "Other",
                "api_otheruser1234567",
            ))
            .await;
        assert!(other.is_ok());
    }

    #[tokio::test]
    async fn test_update_scoped_to_owner() {
        let repo = InMemoryApiKeyRepository::new();
        let owner = UserId::generate();
        let key = create_test_key(owner, "Test Key", "api_0123456789abcdef");

        repo.create(key.clone()).await.unwrap();

        let mut renamed = key.clone();
        renamed.set_name("Renamed");
        repo.update(&renamed).await.unwrap();

        let stored = repo.get(&key.id()).await.unwrap().unwrap();
        assert_eq!(stored.name(), "Renamed");

        let forged = ApiKey::from_storage(
            key.id(),
            UserId::generate(),
            "Hijacked".to_string(),
            None,
            key.key().to_string(),
            true,
            key.created_at(),
            None,
        );
        let result = repo.update(&forged).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_scoped_to_owner() {
        let repo = InMemoryApiKeyRepository::new();
        let owner = UserId::generate();
        let key = create_test_key(owner, "Test Key", "api_0123456789abcdef");

        repo.create(key.clone()).await.unwrap();

        let result = repo.delete(&key.id(), &UserId::generate()).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
        assert!(repo.get(&key.id()).await.unwrap().is_some());

        repo.delete(&key.id(), &owner).await.unwrap();
        assert!(repo.get(&key.id()).await.unwrap().is_none());
    }
}
