//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod error;
pub mod health;
pub mod schemas;
pub mod state;
pub mod users;
pub mod validation;

pub use error::ApiResult;

use actix_web::web;

/// Register every API handler and health probe on `cfg`.
///
/// Callers supply [`state::HttpState`] and [`health::HealthState`] as app
/// data and wrap the app with the authentication middleware.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use user_accounts::inbound::http::configure;
///
/// let _app = App::new().configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::login)
        .service(users::create_user)
        .service(users::list_users)
        .service(users::current_user)
        .service(users::update_user)
        .service(users::delete_user)
        .service(health::ready)
        .service(health::live);
}
