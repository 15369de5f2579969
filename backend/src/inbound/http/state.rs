//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{LoginService, UsersCommand, UsersQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Sign-in use case.
    pub login: Arc<dyn LoginService>,
    /// Read-side user operations.
    pub users_query: Arc<dyn UsersQuery>,
    /// Write-side user operations.
    pub users_command: Arc<dyn UsersCommand>,
}

impl HttpState {
    /// Construct state from the driving ports.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use user_accounts::domain::ports::{LoginService, UsersCommand, UsersQuery};
    /// use user_accounts::inbound::http::state::HttpState;
    ///
    /// fn wire(
    ///     login: Arc<dyn LoginService>,
    ///     query: Arc<dyn UsersQuery>,
    ///     command: Arc<dyn UsersCommand>,
    /// ) -> HttpState {
    ///     HttpState::new(login, query, command)
    /// }
    /// ```
    pub fn new(
        login: Arc<dyn LoginService>,
        users_query: Arc<dyn UsersQuery>,
        users_command: Arc<dyn UsersCommand>,
    ) -> Self {
        Self {
            login,
            users_query,
            users_command,
        }
    }
}
