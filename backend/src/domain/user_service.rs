//! User account services.
//!
//! [`UserService`] implements both user driving ports. Passwords are hashed
//! here before any record reaches the repository, and every repository
//! failure goes through [`map_user_persistence_error`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::ports::{
    PasswordHashError, PasswordHasher, UserRepository, UsersCommand, UsersQuery,
};
use crate::domain::{
    Error, NewUser, NewUserRecord, PasswordHash, PlainPassword, User, UserChangeset, UserId,
    UserUpdate, map_user_persistence_error,
};

/// Service implementing [`UsersQuery`] and [`UsersCommand`].
#[derive(Clone)]
pub struct UserService<R, H> {
    repository: Arc<R>,
    hasher: Arc<H>,
}

impl<R, H> UserService<R, H> {
    /// Create a new service over the given repository and hasher.
    pub fn new(repository: Arc<R>, hasher: Arc<H>) -> Self {
        Self { repository, hasher }
    }
}

impl<R, H> UserService<R, H>
where
    R: UserRepository,
    H: PasswordHasher,
{
    fn map_hash_error(error: PasswordHashError) -> Error {
        Error::internal(format!("password hashing failed: {error}"))
    }

    async fn hash(&self, password: &PlainPassword) -> Result<PasswordHash, Error> {
        self.hasher
            .hash(password)
            .await
            .map_err(Self::map_hash_error)
    }
}

#[async_trait]
impl<R, H> UsersQuery for UserService<R, H>
where
    R: UserRepository,
    H: PasswordHasher,
{
    async fn list_users(&self) -> Result<Vec<User>, Error> {
        self.repository
            .list()
            .await
            .map_err(map_user_persistence_error)
    }

    async fn fetch_user(&self, id: UserId) -> Result<User, Error> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(map_user_persistence_error)
    }
}

#[async_trait]
impl<R, H> UsersCommand for UserService<R, H>
where
    R: UserRepository,
    H: PasswordHasher,
{
    async fn create_user(&self, new_user: NewUser) -> Result<User, Error> {
        let NewUser {
            name,
            email,
            password,
        } = new_user;
        let password_hash = self.hash(&password).await?;
        let record = NewUserRecord {
            name,
            email,
            password_hash,
        };
        let user = self
            .repository
            .insert(&record)
            .await
            .map_err(map_user_persistence_error)?;
        info!(user_id = %user.id(), "user created");
        Ok(user)
    }

    async fn update_user(&self, id: UserId, update: UserUpdate) -> Result<User, Error> {
        if update.is_empty() {
            debug!(user_id = %id, "empty update; returning current record");
            return self.fetch_user(id).await;
        }

        let UserUpdate {
            name,
            email,
            password,
        } = update;
        let password_hash = match password {
            Some(password) => Some(self.hash(&password).await?),
            None => None,
        };
        let changes = UserChangeset {
            name,
            email,
            password_hash,
        };
        let user = self
            .repository
            .update(id, &changes)
            .await
            .map_err(map_user_persistence_error)?;
        info!(user_id = %id, "user updated");
        Ok(user)
    }

    async fn delete_user(&self, id: UserId) -> Result<User, Error> {
        let user = self
            .repository
            .delete(id)
            .await
            .map_err(map_user_persistence_error)?;
        info!(user_id = %id, "user deleted");
        Ok(user)
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
