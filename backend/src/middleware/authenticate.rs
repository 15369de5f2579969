//! Bearer token authentication middleware.
//!
//! Every route is protected unless registered in [`PublicRoutes`]. Protected
//! requests must carry `Authorization: Bearer <token>`; the verified subject
//! is attached to the request as an
//! [`AuthenticatedUser`](crate::inbound::http::auth::AuthenticatedUser).
//! Missing, malformed, forged, and expired tokens all produce the same `401`.

use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::{Method, header};
use actix_web::{Error, HttpMessage, ResponseError};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::debug;

use crate::domain::Error as DomainError;
use crate::domain::ports::AccessTokenService;
use crate::inbound::http::auth::{AuthenticatedUser, UNAUTHORIZED_MESSAGE};

const BEARER_PREFIX: &str = "Bearer ";

/// Routes that skip authentication.
///
/// Exact routes match on method and path; prefixes match the prefix itself
/// and anything below it (`/docs` covers `/docs/index.html` but not
/// `/docsearch`).
#[derive(Debug, Clone, Default)]
pub struct PublicRoutes {
    exact: Vec<(Method, String)>,
    prefixes: Vec<String>,
}

impl PublicRoutes {
    /// Routes that are public in this service: sign-in, signup, probes, and
    /// API documentation.
    pub fn standard() -> Self {
        Self::default()
            .allow(Method::POST, "/auth/login")
            .allow(Method::POST, "/users")
            .allow_prefix("/health")
            .allow_prefix("/docs")
            .allow_prefix("/api-docs")
    }

    /// Allow one method and path without a token.
    pub fn allow(mut self, method: Method, path: impl Into<String>) -> Self {
        self.exact.push((method, path.into()));
        self
    }

    /// Allow every method under `prefix` without a token.
    pub fn allow_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.push(prefix.into().trim_end_matches('/').to_owned());
        self
    }

    /// Whether `method path` skips authentication.
    ///
    /// # Examples
    /// ```
    /// use actix_web::http::Method;
    /// use user_accounts::middleware::PublicRoutes;
    ///
    /// let routes = PublicRoutes::standard();
    /// assert!(routes.is_public(&Method::POST, "/users"));
    /// assert!(!routes.is_public(&Method::GET, "/users"));
    /// ```
    pub fn is_public(&self, method: &Method, path: &str) -> bool {
        let exact = self
            .exact
            .iter()
            .any(|(allowed, route)| allowed == method && route == path);
        exact
            || self.prefixes.iter().any(|prefix| {
                path == prefix
                    || path
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            })
    }
}

/// Middleware factory holding the token verifier and the public route table.
///
/// # Examples
/// ```no_run
/// use std::sync::Arc;
///
/// use actix_web::App;
/// use user_accounts::domain::ports::AccessTokenService;
/// use user_accounts::middleware::{Authenticate, PublicRoutes, Trace};
///
/// fn app(tokens: Arc<dyn AccessTokenService>) {
///     let _app = App::new()
///         .wrap(Authenticate::new(tokens, PublicRoutes::standard()))
///         .wrap(Trace);
/// }
/// ```
#[derive(Clone)]
pub struct Authenticate {
    tokens: Arc<dyn AccessTokenService>,
    public: Arc<PublicRoutes>,
}

impl Authenticate {
    /// Verify bearer tokens with `tokens` on every route `public` does not allow.
    pub fn new(tokens: Arc<dyn AccessTokenService>, public: PublicRoutes) -> Self {
        Self {
            tokens,
            public: Arc::new(public),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Authenticate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthenticateMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthenticateMiddleware {
            service,
            tokens: Arc::clone(&self.tokens),
            public: Arc::clone(&self.public),
        }))
    }
}

/// Service produced by [`Authenticate`].
pub struct AuthenticateMiddleware<S> {
    service: S,
    tokens: Arc<dyn AccessTokenService>,
    public: Arc<PublicRoutes>,
}

/// Pull the token out of an `Authorization` header value.
fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix(BEARER_PREFIX)?.trim();
    (!token.is_empty()).then_some(token)
}

impl<S, B> Service<ServiceRequest> for AuthenticateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if self.public.is_public(req.method(), req.path()) {
            let fut = self.service.call(req);
            return Box::pin(async move { Ok(fut.await?.map_into_left_body()) });
        }

        let verified = match bearer_token(&req) {
            Some(token) => self.tokens.verify(token).map_err(|err| {
                debug!(path = %req.path(), error = %err, "rejected access token");
            }),
            None => {
                debug!(path = %req.path(), "missing bearer token");
                Err(())
            }
        };

        match verified {
            Ok(user_id) => {
                req.extensions_mut().insert(AuthenticatedUser::new(user_id));
                let fut = self.service.call(req);
                Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
            }
            // Built inside the future so the error picks up the trace scope.
            Err(()) => Box::pin(async move {
                let response = DomainError::unauthorized(UNAUTHORIZED_MESSAGE).error_response();
                Ok(req.into_response(response).map_into_right_body())
            }),
        }
    }
}
