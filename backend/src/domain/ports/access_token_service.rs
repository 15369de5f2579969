//! Driven port for issuing and verifying signed access tokens.

use crate::domain::{AccessToken, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by access token adapters.
    pub enum AccessTokenError {
        /// Signing a new token failed.
        Issue { message: String } => "failed to issue access token: {message}",
        /// The presented token is malformed, forged, or expired.
        Invalid { message: String } => "access token rejected: {message}",
    }
}

/// Port for the token collaborator shared by sign-in and the authentication
/// middleware.
#[cfg_attr(test, mockall::automock)]
pub trait AccessTokenService: Send + Sync {
    /// Issue a token whose subject is `user_id`.
    fn issue(&self, user_id: UserId) -> Result<AccessToken, AccessTokenError>;

    /// Verify signature and expiry, returning the subject.
    fn verify(&self, token: &str) -> Result<UserId, AccessTokenError>;
}
