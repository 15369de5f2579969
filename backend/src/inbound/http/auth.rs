//! Sign-in endpoint and the authenticated-caller extractor.
//!
//! ```text
//! POST /auth/login {"email":"ada@example.com","password":"analytical"}
//! ```

use std::sync::OnceLock;

use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, post, web};
use futures_util::future::{Ready, ready};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, LoginCredentials, LoginValidationError, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldSpec, FieldViolation, Rule, Schema, ValidatedBody, ValidatedJson, validation_error,
};

/// Message returned for every missing, malformed, forged, or expired token.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";

const EMAIL_INVALID: &str = "Invalid email address";

/// Identity of the caller, attached to request extensions by the
/// authentication middleware.
///
/// Extracting it on a request that was never authenticated fails with
/// `401 Unauthorized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(UserId);

impl AuthenticatedUser {
    /// Wrap a verified subject.
    pub fn new(id: UserId) -> Self {
        Self(id)
    }

    /// Identifier of the caller.
    pub fn id(&self) -> UserId {
        self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user = req.extensions().get::<AuthenticatedUser>().copied();
        ready(user.ok_or_else(|| Error::unauthorized(UNAUTHORIZED_MESSAGE).into()))
    }
}

/// Sign-in request body for `POST /auth/login`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LoginRequest {
    /// Registered email address.
    #[schema(example = "ada@example.com", max_length = 320)]
    pub email: String,
    /// Account password.
    #[schema(example = "analytical")]
    pub password: String,
}

impl ValidatedBody for LoginRequest {
    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::new(vec![
                FieldSpec::required("email", EMAIL_INVALID).rule(Rule::Email {
                    message: EMAIL_INVALID,
                }),
                FieldSpec::required("password", "Password is required").rule(Rule::MinLength {
                    min: 1,
                    message: "Password cannot be empty",
                }),
            ])
        })
    }
}

/// Successful sign-in response.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    /// Bearer token for the `Authorization` header.
    pub access_token: String,
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    let field = match err {
        LoginValidationError::InvalidEmail => "email",
        LoginValidationError::EmptyPassword => "password",
    };
    validation_error(&[FieldViolation {
        field: field.to_owned(),
        message: err.to_string(),
    }])
}

/// Exchange email and password for a signed access token.
///
/// Unknown emails and wrong passwords produce the same `401` response.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 400, description = "Validation failed", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 503, description = "Database unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: ValidatedJson<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let LoginRequest { email, password } = payload.into_inner();
    let credentials =
        LoginCredentials::try_from_parts(&email, &password).map_err(map_login_validation_error)?;
    let token = state.login.authenticate(&credentials).await?;
    Ok(web::Json(LoginResponse {
        access_token: token.into(),
    }))
}
