//! Driving port for login/authentication use-cases.
//!
//! Inbound adapters call this port to exchange credentials for an access
//! token without knowing the backing infrastructure, so handler tests can
//! substitute a test double instead of wiring persistence.

use async_trait::async_trait;

use crate::domain::{AccessToken, Error, LoginCredentials};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return a freshly signed access token.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<AccessToken, Error>;
}
