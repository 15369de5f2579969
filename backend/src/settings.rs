//! Service configuration loaded via OrthoConfig.
//!
//! Values come from `USER_ACCOUNTS_*` environment variables, configuration
//! files, and command-line flags. Unset values fall back to the defaults
//! exposed by the accessor methods.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::outbound::persistence::PoolConfig;
use crate::outbound::security::HashCost;

const DEFAULT_HOST: &str = "0.0.0.0";

/// Errors raised when settings cannot be turned into runtime configuration.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// No database URL was configured.
    #[error("USER_ACCOUNTS_DATABASE_URL must be set")]
    MissingDatabaseUrl,
    /// Host and port do not form a socket address.
    #[error("invalid bind address {value}: {source}")]
    BindAddress {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

/// Runtime settings for the user accounts service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "USER_ACCOUNTS")]
pub struct AppSettings {
    /// Interface to bind.
    pub host: Option<String>,
    /// Port to bind.
    #[ortho_config(default = 3000)]
    pub port: u16,
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Lifetime of issued access tokens in seconds.
    #[ortho_config(default = 3600)]
    pub token_ttl_secs: u64,
    /// Argon2 memory cost in KiB.
    pub hash_memory_kib: Option<u32>,
    /// Argon2 iteration count.
    pub hash_time_cost: Option<u32>,
    /// Argon2 lanes.
    pub hash_parallelism: Option<u32>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
}

impl AppSettings {
    /// Address the HTTP server binds to.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let host = self.host.as_deref().unwrap_or(DEFAULT_HOST);
        let value = format!("{host}:{}", self.port);
        value
            .parse()
            .map_err(|source| SettingsError::BindAddress { value, source })
    }

    /// Lifetime of issued access tokens.
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    /// Argon2 cost, with unset parameters taken from [`HashCost::default`].
    pub fn hash_cost(&self) -> HashCost {
        let defaults = HashCost::default();
        HashCost {
            memory_kib: self.hash_memory_kib.unwrap_or(defaults.memory_kib),
            time_cost: self.hash_time_cost.unwrap_or(defaults.time_cost),
            parallelism: self.hash_parallelism.unwrap_or(defaults.parallelism),
        }
    }

    /// Pool configuration; fails when no database URL is set.
    pub fn pool_config(&self) -> Result<PoolConfig, SettingsError> {
        let url = self
            .database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)?;
        let config = PoolConfig::new(url);
        Ok(match self.db_max_connections {
            Some(max) => config.with_max_size(max),
            None => config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 8] = [
        "USER_ACCOUNTS_HOST",
        "USER_ACCOUNTS_PORT",
        "USER_ACCOUNTS_DATABASE_URL",
        "USER_ACCOUNTS_TOKEN_TTL_SECS",
        "USER_ACCOUNTS_HASH_MEMORY_KIB",
        "USER_ACCOUNTS_HASH_TIME_COST",
        "USER_ACCOUNTS_HASH_PARALLELISM",
        "USER_ACCOUNTS_DB_MAX_CONNECTIONS",
    ];

    fn load() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("user-accounts")]).expect("settings load")
    }

    fn env_with(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(env_with(&[]));
        let settings = load();
        assert_eq!(
            settings.bind_addr().expect("default address"),
            "0.0.0.0:3000".parse::<SocketAddr>().expect("socket address")
        );
        assert_eq!(settings.port, 3000);
        assert_eq!(settings.token_ttl(), Duration::from_secs(3600));
        assert_eq!(settings.hash_cost(), HashCost::default());
        assert!(settings.database_url.is_none());
        assert!(matches!(
            settings.pool_config(),
            Err(SettingsError::MissingDatabaseUrl)
        ));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(env_with(&[
            ("USER_ACCOUNTS_HOST", "127.0.0.1"),
            ("USER_ACCOUNTS_PORT", "8081"),
            ("USER_ACCOUNTS_DATABASE_URL", "postgres://localhost/users"),
            ("USER_ACCOUNTS_TOKEN_TTL_SECS", "60"),
            ("USER_ACCOUNTS_HASH_MEMORY_KIB", "4096"),
            ("USER_ACCOUNTS_DB_MAX_CONNECTIONS", "4"),
        ]));
        let settings = load();
        assert_eq!(
            settings.bind_addr().expect("address"),
            "127.0.0.1:8081".parse::<SocketAddr>().expect("socket address")
        );
        assert_eq!(settings.token_ttl(), Duration::from_secs(60));
        assert_eq!(settings.hash_cost().memory_kib, 4096);
        assert_eq!(settings.hash_cost().time_cost, HashCost::default().time_cost);
        let pool = settings.pool_config().expect("pool config");
        assert_eq!(pool.database_url(), "postgres://localhost/users");
        assert_eq!(pool.max_size(), 4);
    }

    #[rstest]
    fn blank_database_url_is_rejected() {
        let _guard = lock_env(env_with(&[("USER_ACCOUNTS_DATABASE_URL", "  ")]));
        assert!(matches!(
            load().pool_config(),
            Err(SettingsError::MissingDatabaseUrl)
        ));
    }

    #[rstest]
    fn malformed_host_is_reported() {
        let _guard = lock_env(env_with(&[("USER_ACCOUNTS_HOST", "not a host")]));
        assert!(matches!(
            load().bind_addr(),
            Err(SettingsError::BindAddress { .. })
        ));
    }
}
