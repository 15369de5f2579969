//! HTTP server configuration object.

use std::net::SocketAddr;
use std::time::Duration;

use user_accounts::outbound::persistence::DbPool;
use user_accounts::outbound::security::{HashCost, TokenKey};

/// Everything the server needs to wire its adapters.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) hash_cost: HashCost,
    pub(crate) token_key: TokenKey,
    pub(crate) token_ttl: Duration,
}

impl ServerConfig {
    #[must_use]
    pub fn new(bind_addr: SocketAddr, db_pool: DbPool, token_key: TokenKey) -> Self {
        Self {
            bind_addr,
            db_pool,
            hash_cost: HashCost::default(),
            token_key,
            token_ttl: Duration::from_secs(3600),
        }
    }

    /// Argon2 cost applied to new hashes.
    #[must_use]
    pub fn with_hash_cost(mut self, cost: HashCost) -> Self {
        self.hash_cost = cost;
        self
    }

    /// Lifetime of issued access tokens.
    #[must_use]
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }
}
