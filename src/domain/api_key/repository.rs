//! API key repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{ApiKey, ApiKeyId};
use crate::domain::DomainError;
use crate::domain::user::UserId;

/// Repository trait for API key storage
///
/// Write operations are scoped to an owner: an update or delete only
/// touches a row when both the key ID and the owning user match, so a
/// caller can never mutate another user's key through this interface.
#[async_trait]
pub trait ApiKeyRepository: Send + Sync + Debug {
    /// Get a key by its ID, regardless of owner
    async fn get(&self, id: &ApiKeyId) -> Result<Option<ApiKey>, DomainError>;

    /// List all keys owned by a user, newest first
    async fn list_by_owner(&self, user_id: &UserId) -> Result<Vec<ApiKey>, DomainError>;

    /// Count the keys owned by a user
    async fn count_by_owner(&self, user_id: &UserId) -> Result<usize, DomainError>;

    /// Find an active key by its key string (for playground validation)
    async fn find_active_by_key(&self, key: &str) -> Result<Option<ApiKey>, DomainError>;

    /// Create a new key, enforcing the per-user cap
    async fn create(&self, key: ApiKey) -> Result<ApiKey, DomainError>;

    /// Update a key; only applies when the stored row matches both the
    /// key ID and the owner carried by the entity
    async fn update(&self, key: &ApiKey) -> Result<ApiKey, DomainError>;

    /// Delete a key owned by the given user
    async fn delete(&self, id: &ApiKeyId, user_id: &UserId) -> Result<(), DomainError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::domain::api_key::MAX_KEYS_PER_USER;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// Mock API key repository for testing
    #[derive(Debug, Default)]
    pub struct MockApiKeyRepository {
        keys: Arc<RwLock<HashMap<ApiKeyId, ApiKey>>>,
        should_fail: Arc<RwLock<bool>>,
    }

    impl MockApiKeyRepository {
        /// Create a new mock repository
        pub fn new() -> Self {
            Self::default()
        }

        /// Set whether operations should fail
        pub async fn set_should_fail(&self, fail: bool) {
            *self.should_fail.write().await = fail;
        }

        async fn check_should_fail(&self) -> Result<(), DomainError> {
            if *self.should_fail.read().await {
                return Err(DomainError::storage("Mock repository configured to fail"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ApiKeyRepository for MockApiKeyRepository {
        async fn get(&self, id: &ApiKeyId) -> Result<Option<ApiKey>, DomainError> {
            self.check_should_fail().await?;
            let keys = self.keys.read().await;
            Ok(keys.get(id).cloned())
        }

        async fn list_by_owner(&self, user_id: &UserId) -> Result<Vec<ApiKey>, DomainError> {
            self.check_should_fail().await?;
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
            self.check_should_fail().await?;
            let keys = self.keys.read().await;
            Ok(keys.values().filter(|k| k.is_owned_by(user_id)).count())
        }

        async fn find_active_by_key(&self, key: &str) -> Result<Option<ApiKey>, DomainError> {
            self.check_should_fail().await?;
            let keys = self.keys.read().await;
            Ok(keys
                .values()
                .find(|k| k.key() == key && k.is_active())
                .cloned())
        }

        async fn create(&self, key: ApiKey) -> Result<ApiKey, DomainError> {
            self.check_should_fail().await?;
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
            self.check_should_fail().await?;
            let mut keys = self.keys.write().await;

            match keys.get(&key.id()) {
                Some(existing) if existing.is_owned_by(&key.user_id()) => {
                    keys.insert(key.id(), key.clone());
                    Ok(key.clone())
                }
                _ => Err(DomainError::not_found(format!(
                    "API key '{}' not found",
                    key.id()
                ))),
            }
        }

        async fn delete(&self, id: &ApiKeyId, user_id: &UserId) -> Result<(), DomainError> {
            self.check_should_fail().await?;
            let mut keys = self.keys.write().await;

            match keys.get(id) {
                Some(existing) if existing.is_owned_by(user_id) => {
                    keys.remove(id);
                    Ok(())
                }
                _ => Err(DomainError::not_found(format!(
                    "API key '{}' not found",
                    id
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
            let repo = MockApiKeyRepository::new();
            let key = create_test_key(UserId::generate(), "Test Key", "api_0123456789abcdef");

            repo.create(key.clone()).await.unwrap();

            let retrieved = repo.get(&key.id()).await.unwrap();
            assert!(retrieved.is_some());
            assert_eq!(retrieved.unwrap().name(), "Test Key");
        }

        #[tokio::test]
        async fn test_list_by_owner_excludes_other_users() {
            let repo = MockApiKeyRepository::new();
            let owner = UserId::generate();
            let other = UserId::generate();

            repo.create(create_test_key(owner, "Mine", "api_0123456789abcdef"))
                .await
                .unwrap();
            repo.create(create_test_key(other, "Theirs", "api_fedcba9876543210"))
                .await
                .unwrap();

            let listed = repo.list_by_owner(&owner).await.unwrap();
            assert_eq!(listed.len(), 1);
            assert_eq!(listed[0].name(), "Mine");
        }

        #[tokio::test]
        async fn test_count_by_owner() {
            let repo = MockApiKeyRepository::new();
            let owner = UserId::generate();

            repo.create(create_test_key(owner, "One", "api_0123456789abcdef"))
                .await
                .unwrap();
            repo.create(create_test_key(owner, "Two", "api_fedcba9876543210"))
                .await
                .unwrap();

            assert_eq!(repo.count_by_owner(&owner).await.unwrap(), 2);
            assert_eq!(repo.count_by_owner(&UserId::generate()).await.unwrap(), 0);
        }

        #[tokio::test]
        async fn test_find_active_by_key_skips_inactive() {
            let repo = MockApiKeyRepository::new();
            let owner = UserId::generate();

            repo.create(
                create_test_key(owner, "Inactive", "api_0123456789abcdef").with_active(false),
            )
            .await
            .unwrap();

            let found = repo.find_active_by_key("api_0123456789abcdef").await.unwrap();
            assert!(found.is_none());
        }

        #[tokio::test]
        async fn test_create_enforces_cap() {
            let repo = MockApiKeyRepository::new();
            let owner = UserId::generate();

            for i in 0..MAX_KEYS_PER_USER {
                let key = create_test_key(owner, &format!("Key {}", i), &format!("api_{:016}", i));
                repo.create(key).await.unwrap();
            }

            let result = repo
                .create(create_test_key(owner, "One Too Many", "api_overflow12345678"))
                .await;
            assert!(matches!(result, Err(DomainError::LimitExceeded { .. })));
        }

        #[tokio::test]
        async fn test_update_requires_matching_owner() {
            let repo = MockApiKeyRepository::new();
            let owner = UserId::generate();
            let key = create_test_key(owner, "Test Key", "api_0123456789abcdef");

            repo.create(key.clone()).await.unwrap();

            let mut forged = ApiKey::from_storage(
                key.id(),
                UserId::generate(),
                "Hijacked".to_string(),
                None,
                key.key().to_string(),
                true,
                key.created_at(),
                None,
            );
            forged.set_name("Hijacked");

            let result = repo.update(&forged).await;
            assert!(matches!(result, Err(DomainError::NotFound { .. })));
        }

        #[tokio::test]
        async fn test_delete_requires_matching_owner() {
            let repo = MockApiKeyRepository::new();
            let owner = UserId::generate();
            let key = create_test_key(owner, "Test Key", "api_0123456789abcdef");

            repo.create(key.clone()).await.unwrap();

            let result = repo.delete(&key.id(), &UserId::generate()).await;
            assert!(result.is_err());

            repo.delete(&key.id(), &owner).await.unwrap();
            assert!(repo.get(&key.id()).await.unwrap().is_none());
        }
    }
}
