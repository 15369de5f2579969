//! Builders wiring domain services to their adapters.

use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use mockable::DefaultClock;

use user_accounts::domain::ports::{
    AccessTokenService, LoginService, PasswordHasher, UserRepository, UsersCommand, UsersQuery,
};
use user_accounts::domain::{CredentialService, UserService};
use user_accounts::inbound::http::state::HttpState;
use user_accounts::outbound::security::{JwtAccessTokens, TokenKey};

/// Handler state plus the token verifier the authentication middleware needs.
#[derive(Clone)]
pub(super) struct AppPorts {
    pub(super) http_state: web::Data<HttpState>,
    pub(super) tokens: Arc<dyn AccessTokenService>,
}

/// Token service signing with `key`; the key bytes are dropped afterwards.
pub(super) fn build_token_service(key: TokenKey, ttl: Duration) -> Arc<JwtAccessTokens> {
    Arc::new(JwtAccessTokens::new(
        key.as_bytes(),
        ttl,
        Arc::new(DefaultClock),
    ))
}

/// Share one repository, hasher, and token service between the user and
/// credential services.
pub(super) fn build_ports<R, H, T>(repository: Arc<R>, hasher: Arc<H>, tokens: Arc<T>) -> AppPorts
where
    R: UserRepository + 'static,
    H: PasswordHasher + 'static,
    T: AccessTokenService + 'static,
{
    let users = Arc::new(UserService::new(Arc::clone(&repository), Arc::clone(&hasher)));
    let login: Arc<dyn LoginService> =
        Arc::new(CredentialService::new(repository, hasher, Arc::clone(&tokens)));
    let users_query: Arc<dyn UsersQuery> = users.clone();
    let users_command: Arc<dyn UsersCommand> = users;

    AppPorts {
        http_state: web::Data::new(HttpState::new(login, users_query, users_command)),
        tokens,
    }
}
