//! PostgreSQL API key repository implementation

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::DomainError;
use crate::domain::api_key::{ApiKey, ApiKeyId, ApiKeyRepository, MAX_KEYS_PER_USER};
use crate::domain::user::UserId;

/// PostgreSQL implementation of ApiKeyRepository
///
/// The per-user cap is enforced with a conditional insert, so the count
/// and the write happen in a single statement.
#[derive(Debug, Clone)]
pub struct PostgresApiKeyRepository {
    pool: PgPool,
}

impl PostgresApiKeyRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApiKeyRepository for PostgresApiKeyRepository {
    async fn get(&self, id: &ApiKeyId) -> Result<Option<ApiKey>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, name, description, key, is_active, created_at, last_used
            FROM api_keys
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get API key: {}", e)))?;

        Ok(row.map(|row| row_to_api_key(&row)))
    }

    async fn list_by_owner(&self, user_id: &UserId) -> Result<Vec<ApiKey>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, name, description, key, is_active, created_at, last_used
            FROM api_keys
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list API keys: {}", e)))?;

        Ok(rows.iter().map(row_to_api_key).collect())
    }

    async fn count_by_owner(&self, user_id: &UserId) -> Result<usize, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM api_keys WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count API keys: {}", e)))?;

        Ok(count as usize)
    }

    async fn find_active_by_key(&self, key: &str) -> Result<Option<ApiKey>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, name, description, key, is_active, created_at, last_used
            FROM api_keys
            WHERE key = $1 AND is_active = TRUE
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to look up API key: {}", e)))?;

        Ok(row.map(|row| row_to_api_key(&row)))
    }

    async fn create(&self, key: ApiKey) -> Result<ApiKey, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO api_keys (id, user_id, name, description, key, is_active, created_at, last_used)
            SELECT $1, $2, $3, $4, $5, $6, $7, $8
            WHERE (SELECT COUNT(*) FROM api_keys WHERE user_id = $2) < $9
            "#,
        )
        .bind(key.id().as_uuid())
        .bind(key.user_id().as_uuid())
        .bind(key.name())
        .bind(key.description())
        .bind(key.key())
        .bind(key.is_active())
        .bind(key.created_at())
        .bind(key.last_used())
        .bind(MAX_KEYS_PER_USER as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create API key: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::limit_exceeded(format!(
                "User '{}' already has {} API keys",
                key.user_id(),
                MAX_KEYS_PER_USER
            )));
        }

        Ok(key)
    }

    async fn update(&self, key: &ApiKey) -> Result<ApiKey, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE api_keys
            SET name = $3, description = $4, key = $5, is_active = $6, last_used = $7
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(key.id().as_uuid())
        .bind(key.user_id().as_uuid())
        .bind(key.name())
        .bind(key.description())
        .bind(key.key())
        .bind(key.is_active())
        .bind(key.last_used())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to update API key: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "API key '{}' not found for user '{}'",
                key.id(),
                key.user_id()
            )));
        }

        Ok(key.clone())
    }

    async fn delete(&self, id: &ApiKeyId, user_id: &UserId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM api_keys WHERE id = $1 AND user_id = $2")
            .bind(id.as_uuid())
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete API key: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "API key '{}' not found for user '{}'",
                id, user_id
            )));
        }

        Ok(())
    }
}

fn row_to_api_key(row: &sqlx::postgres::PgRow) -> ApiKey {
    let id: Uuid = row.get("id");
    let user_id: Uuid = row.get("user_id");
    let name: String = row.get("name");
    let description: Option<String> = row.get("description");
    let key: String = row.get("key");
    let is_active: bool = row.get("is_active");
    let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");
    let last_used: Option<chrono::DateTime<chrono::Utc>> = row.get("last_used");

    ApiKey::from_storage(
        ApiKeyId::from(id),
        UserId::from(user_id),
        name,
        description,
        key,
        is_active,
        created_at,
        last_used,
    )
}
