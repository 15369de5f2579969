//! Translation of storage failures into the public error vocabulary.
//!
//! This is the only place persistence error codes become client-facing
//! errors. Services call [`map_user_persistence_error`] on every repository
//! failure; nothing else inspects [`UserPersistenceError`].

use tracing::{debug, warn};

use super::Error;
use super::ports::UserPersistenceError;

/// Message returned when a unique field collides with an existing user.
pub const USER_CONFLICT_MESSAGE: &str = "User already exists";
/// Message returned when the referenced user row is absent.
pub const USER_NOT_FOUND_MESSAGE: &str = "User not found";
/// Message returned for any other persistence failure.
pub const DATABASE_ERROR_MESSAGE: &str = "Database error";

/// Map a user repository failure to a domain error.
pub fn map_user_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::UniqueViolation { constraint } => {
            debug!(%constraint, "unique constraint rejected user write");
            Error::conflict(USER_CONFLICT_MESSAGE)
        }
        UserPersistenceError::NotFound => Error::not_found(USER_NOT_FOUND_MESSAGE),
        UserPersistenceError::Connection { message } => {
            warn!(%message, "user repository unavailable");
            Error::service_unavailable("database unavailable")
        }
        UserPersistenceError::Query { message } => {
            debug!(%message, "user repository query failed");
            Error::invalid_request(DATABASE_ERROR_MESSAGE)
        }
    }
}
