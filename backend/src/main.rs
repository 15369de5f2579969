//! Service entry-point: loads configuration, applies migrations, and serves
//! the REST API.

mod server;

use std::ffi::OsString;
use std::io;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, create_server};
use user_accounts::inbound::http::health::HealthState;
use user_accounts::outbound::persistence::{DbPool, run_pending_migrations};
use user_accounts::outbound::security::{BuildMode, token_key_from_env};
use user_accounts::settings::AppSettings;

#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os().collect::<Vec<OsString>>())
        .map_err(|e| io::Error::other(e.to_string()))?;
    let pool_config = settings.pool_config().map_err(io::Error::other)?;
    let bind_addr = settings.bind_addr().map_err(io::Error::other)?;
    let token_key = token_key_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(io::Error::other)?;

    run_pending_migrations(pool_config.database_url())
        .await
        .map_err(io::Error::other)?;
    let pool = DbPool::new(pool_config).await.map_err(io::Error::other)?;
    info!("database ready");

    let config = ServerConfig::new(bind_addr, pool, token_key)
        .with_hash_cost(settings.hash_cost())
        .with_token_ttl(settings.token_ttl());

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    server.await
}
