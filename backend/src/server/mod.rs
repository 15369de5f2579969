//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::{AppPorts, build_ports, build_token_service};

use std::sync::Arc;

use actix_web::body::{BoxBody, EitherBody};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;

#[cfg(debug_assertions)]
use user_accounts::ApiDoc;
use user_accounts::inbound::http::configure;
use user_accounts::inbound::http::health::HealthState;
use user_accounts::middleware::{Authenticate, PublicRoutes, Trace};
use user_accounts::outbound::persistence::DieselUserRepository;
use user_accounts::outbound::security::Argon2PasswordHasher;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

fn build_app(
    health_state: web::Data<HealthState>,
    ports: AppPorts,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<EitherBody<BoxBody>>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppPorts { http_state, tokens } = ports;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Authenticate::new(tokens, PublicRoutes::standard()))
        .wrap(Trace)
        .configure(configure);

    #[cfg(debug_assertions)]
    let app = app.service(
        SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    app
}

/// Construct the HTTP server from `config`.
///
/// `health_state` is marked ready once the listener is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when the hasher rejects its cost parameters
/// or the socket cannot be bound.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let ServerConfig {
        bind_addr,
        db_pool,
        hash_cost,
        token_key,
        token_ttl,
    } = config;

    let hasher = Argon2PasswordHasher::new(hash_cost).map_err(std::io::Error::other)?;
    let ports = build_ports(
        Arc::new(DieselUserRepository::new(db_pool)),
        Arc::new(hasher),
        build_token_service(token_key, token_ttl),
    );

    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || build_app(server_health_state.clone(), ports.clone()))
        .bind(bind_addr)?
        .run();

    info!(%bind_addr, "listening");
    health_state.mark_ready();
    Ok(server)
}
