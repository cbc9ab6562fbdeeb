//! API key entity and identifier

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::user::UserId;
use crate::domain::validation::is_valid_uuid;

/// Maximum number of API keys a single user may hold
pub const MAX_KEYS_PER_USER: usize = 10;

/// API key identifier - a UUID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApiKeyId(Uuid);

impl ApiKeyId {
    /// Generate a new random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier from its string form
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        if !is_valid_uuid(value) {
            return Err(DomainError::invalid_id(format!(
                "'{}' is not a valid API key ID",
                value
            )));
        }

        let uuid = Uuid::parse_str(value)
            .map_err(|_| DomainError::invalid_id(format!("'{}' is not a valid API key ID", value)))?;

        Ok(Self(uuid))
    }

    /// Get the inner UUID value
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for ApiKeyId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl TryFrom<String> for ApiKeyId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ApiKeyId> for String {
    fn from(id: ApiKeyId) -> Self {
        id.0.to_string()
    }
}

impl std::fmt::Display for ApiKeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// API key entity
///
/// Every key belongs to exactly one user. The raw key string is stored
/// as-is; it is the credential the playground validates against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKey {
    /// Unique identifier for the key record
    id: ApiKeyId,
    /// Owner of the key
    user_id: UserId,
    /// Display name for the key
    name: String,
    /// Description of the key's purpose
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    /// The key string itself
    key: String,
    /// Whether the key can currently be validated
    is_active: bool,
    /// Creation timestamp
    created_at: DateTime<Utc>,
    /// Last time the key was reported as used
    #[serde(skip_serializing_if = "Option::is_none")]
    last_used: Option<DateTime<Utc>>,
}

impl ApiKey {
    /// Create a new API key owned by the given user
    pub fn new(
        id: ApiKeyId,
        user_id: UserId,
        name: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            id,
            user_id,
            name: name.into(),
            description: None,
            key: key.into(),
            is_active: true,
            created_at: Utc::now(),
            last_used: None,
        }
    }

    /// Rehydrate a key from storage without touching its timestamps
    #[allow(clippy::too_many_arguments)]
    pub fn from_storage(
        id: ApiKeyId,
        user_id: UserId,
        name: String,
        description: Option<String>,
        key: String,
        is_active: bool,
        created_at: DateTime<Utc>,
        last_used: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            user_id,
            name,
            description,
            key,
            is_active,
            created_at,
            last_used,
        }
    }

    /// Set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the active flag
    pub fn with_active(mut self, active: bool) -> Self {
        self.is_active = active;
        self
    }

    // Getters

    pub fn id(&self) -> ApiKeyId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_used(&self) -> Option<DateTime<Utc>> {
        self.last_used
    }

    /// Check whether the key belongs to the given user
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        self.user_id == *user_id
    }

    // Mutators

    /// Update the name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Update or clear the description
    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    /// Replace the key string
    pub fn set_key(&mut self, key: impl Into<String>) {
        self.key = key.into();
    }

    /// Update the active flag
    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }

    /// Update or clear the last-used timestamp
    pub fn set_last_used(&mut self, last_used: Option<DateTime<Utc>>) {
        self.last_used = last_used;
    }
}
