//! User domain
//!
//! This module provides domain types and traits for user accounts,
//! including the user entity and repository trait.

mod entity;
mod repository;

pub use entity::{User, UserId};
pub use repository::UserRepository;

#[cfg(test)]
pub use repository::mock::MockUserRepository;
