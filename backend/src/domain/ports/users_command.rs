//! Driving port for user mutations.

use async_trait::async_trait;

use crate::domain::{Error, NewUser, User, UserId, UserUpdate};

/// Domain use-case port for creating, updating, and removing users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersCommand: Send + Sync {
    /// Register a new user; fails with `conflict` when the email is taken.
    async fn create_user(&self, new_user: NewUser) -> Result<User, Error>;

    /// Apply a partial update; fails with `not_found` when absent.
    async fn update_user(&self, id: UserId, update: UserUpdate) -> Result<User, Error>;

    /// Delete a user and return the removed record.
    async fn delete_user(&self, id: UserId) -> Result<User, Error>;
}
