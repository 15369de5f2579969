//! Domain primitives, ports, and services.
//!
//! Purpose: Define strongly typed user entities and the use-case services
//! that the HTTP adapter drives. Keep types immutable and document invariants
//! and serialisation contracts (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - Error (alias to `error::Error`) — API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`) — stable error identifier.
//! - User (alias to `user::User`) — client-facing user record.
//! - UserService / CredentialService — driving port implementations.

pub mod auth;
pub mod credential_service;
pub mod error;
pub mod persistence_error_mapping;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod user_service;

pub use self::auth::{AccessToken, LoginCredentials, LoginValidationError};
pub use self::credential_service::{CredentialService, INVALID_CREDENTIALS_MESSAGE};
pub use self::error::{Error, ErrorCode};
pub use self::persistence_error_mapping::map_user_persistence_error;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    DISPLAY_NAME_MAX, DISPLAY_NAME_MIN, DisplayName, EMAIL_MAX, EmailAddress, NewUser, NewUserRecord,
    PASSWORD_MAX, PASSWORD_MIN, PasswordHash, PlainPassword, User, UserChangeset,
    UserCredentials, UserId, UserUpdate, UserValidationError, is_valid_email,
};
pub use self::user_service::UserService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use user_accounts::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::unauthorized("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
