//! Sign-in service exchanging credentials for access tokens.
//!
//! An unknown email and a wrong password produce the same
//! [`INVALID_CREDENTIALS_MESSAGE`] after the same amount of hashing work, so
//! callers cannot tell which accounts exist.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    AccessTokenService, LoginService, PasswordHashError, PasswordHasher, UserRepository,
};
use crate::domain::{
    AccessToken, Error, LoginCredentials, PasswordHash, map_user_persistence_error,
};

/// Message returned for every rejected sign-in.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials";

/// Well-formed Argon2id hash at the default cost that matches no password.
///
/// Unknown emails are verified against it so they take as long to reject as
/// a wrong password.
pub(crate) const DECOY_PASSWORD_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8";

/// Service implementing [`LoginService`] over a repository, hasher, and
/// token issuer.
#[derive(Clone)]
pub struct CredentialService<R, H, T> {
    repository: Arc<R>,
    hasher: Arc<H>,
    tokens: Arc<T>,
}

impl<R, H, T> CredentialService<R, H, T> {
    /// Create a new service from its collaborators.
    pub fn new(repository: Arc<R>, hasher: Arc<H>, tokens: Arc<T>) -> Self {
        Self {
            repository,
            hasher,
            tokens,
        }
    }
}

#[async_trait]
impl<R, H, T> LoginService for CredentialService<R, H, T>
where
    R: UserRepository,
    H: PasswordHasher,
    T: AccessTokenService,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<AccessToken, Error> {
        let Some(stored) = self
            .repository
            .find_credentials_by_email(credentials.email())
            .await
            .map_err(map_user_persistence_error)?
        else {
            let decoy = PasswordHash::from_encoded(DECOY_PASSWORD_HASH);
            if let Err(error) = self.hasher.verify(credentials.password(), &decoy).await {
                warn!(%error, "decoy password verification failed");
            }
            debug!("sign-in rejected: unknown email");
            return Err(Error::unauthorized(INVALID_CREDENTIALS_MESSAGE));
        };

        let matches = match self
            .hasher
            .verify(credentials.password(), &stored.password_hash)
            .await
        {
            Ok(matches) => matches,
            Err(PasswordHashError::MalformedHash { message }) => {
                warn!(user_id = %stored.id, %message, "stored password hash unusable");
                false
            }
            Err(error) => {
                return Err(Error::internal(format!(
                    "password verification failed: {error}"
                )));
            }
        };
        if !matches {
            debug!(user_id = %stored.id, "sign-in rejected: password mismatch");
            return Err(Error::unauthorized(INVALID_CREDENTIALS_MESSAGE));
        }

        let token = self
            .tokens
            .issue(stored.id)
            .map_err(|error| Error::internal(format!("token issuance failed: {error}")))?;
        info!(user_id = %stored.id, "user signed in");
        Ok(token)
    }
}
