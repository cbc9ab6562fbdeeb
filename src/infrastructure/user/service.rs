//! User service for registration and authentication

use std::sync::Arc;

use crate::domain::DomainError;
use crate::domain::user::{User, UserId, UserRepository};

use super::password::PasswordHasher;

/// User service for registration and credential checks
///
/// Storage failures are logged here with their underlying cause and
/// surfaced to callers with the client-facing message for the failed
/// step, so handlers never leak database details.
#[derive(Debug)]
pub struct UserService<R: UserRepository, H: PasswordHasher> {
    repository: Arc<R>,
    hasher: Arc<H>,
}

impl<R: UserRepository, H: PasswordHasher> UserService<R, H> {
    /// Create a new user service
    pub fn new(repository: Arc<R>, hasher: Arc<H>) -> Self {
        Self { repository, hasher }
    }

    /// Register a new user with an already-validated username and password
    pub async fn register(&self, username: &str, password: &str) -> Result<User, DomainError> {
        let exists = self
            .repository
            .username_exists(username)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "failed to check for existing username");
                DomainError::storage("Error checking existing users.")
            })?;

        if exists {
            return Err(DomainError::conflict(
                "User already exists with this username.",
            ));
        }

        let password_hash = self.hasher.hash(password).map_err(|e| {
            tracing::error!(error = %e, "failed to hash password");
            DomainError::internal("An error occurred while creating the user.")
        })?;

        let user = User::new(UserId::generate(), username, password_hash);

        self.repository.create(user).await.map_err(|e| match e {
            // A concurrent registration can slip in between the exists
            // check and the insert; report it as the same conflict.
            DomainError::Conflict { .. } => {
                DomainError::conflict("User already exists with this username.")
            }
            other => {
                tracing::error!(error = %other, "failed to create user");
                DomainError::storage("Error creating user.")
            }
        })
    }

    /// Authenticate a user with username and password
    ///
    /// Returns `Ok(None)` for an unknown username and for a wrong
    /// password alike; callers respond identically to both.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        let user = self
            .repository
            .get_by_username(username)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "failed to fetch user for login");
                DomainError::storage("Error fetching user.")
            })?;

        let user = match user {
            Some(u) => u,
            None => return Ok(None),
        };

        if !self.hasher.verify(password, user.password_hash()) {
            return Ok(None);
        }

        Ok(Some(user))
    }

    /// Get a user by ID
    pub async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        self.repository.get(id).await
    }
}
