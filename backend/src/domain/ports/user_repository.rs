//! Port abstraction for user persistence adapters and their errors.
//!
//! Adapters report storage failures through [`UserPersistenceError`]; the
//! variants mirror the error codes the relational store signals (unique
//! violation, missing row) so that a single mapping function can turn them
//! into client-facing errors.

use async_trait::async_trait;

use crate::domain::{EmailAddress, NewUserRecord, User, UserChangeset, UserCredentials, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// A unique constraint rejected the write.
        UniqueViolation { constraint: String } =>
            "user repository unique constraint violated: {constraint}",
        /// The referenced row does not exist.
        NotFound => "user repository row not found",
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed for any other reason.
        Query { message: String } => "user repository query failed: {message}",
    }
}

/// Driven port for user storage.
///
/// Every mutation is a single-row statement; implementations rely on the
/// store's own atomicity.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user and return the stored record.
    ///
    /// Fails with [`UserPersistenceError::UniqueViolation`] when the email is
    /// taken.
    async fn insert(&self, record: &NewUserRecord) -> Result<User, UserPersistenceError>;

    /// Return every user ordered by identifier.
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Fetch a user by identifier, failing with
    /// [`UserPersistenceError::NotFound`] when absent.
    async fn find_by_id(&self, id: UserId) -> Result<User, UserPersistenceError>;

    /// Fetch the stored credentials for an email, if registered.
    async fn find_credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserCredentials>, UserPersistenceError>;

    /// Apply a non-empty changeset and return the updated record.
    async fn update(
        &self,
        id: UserId,
        changes: &UserChangeset,
    ) -> Result<User, UserPersistenceError>;

    /// Delete a user and return the removed record.
    async fn delete(&self, id: UserId) -> Result<User, UserPersistenceError>;
}
