//! Users API handlers.
//!
//! ```text
//! POST   /users     {"name":"Ada Lovelace","email":"ada@example.com","password":"analytical"}
//! GET    /users
//! GET    /users/me
//! PATCH  /users     {"name":"Ada King"}
//! DELETE /users
//! ```
//!
//! Every route except signup acts on the authenticated caller.

use std::sync::OnceLock;

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{
    DISPLAY_NAME_MAX, DISPLAY_NAME_MIN, DisplayName, EMAIL_MAX, EmailAddress, Error, NewUser, PASSWORD_MAX,
    PASSWORD_MIN, PlainPassword, User, UserUpdate, UserValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::schemas::{ErrorSchema, UserSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldSpec, FieldViolation, Rule, Schema, ValidatedBody, ValidatedJson, validation_error,
};

const NAME_TOO_SHORT: &str = "Name must be at least 2 characters";
const NAME_TOO_LONG: &str = "Name must be at most 100 characters";
const EMAIL_INVALID: &str = "Invalid email address";
const EMAIL_TOO_LONG: &str = "Email must be at most 320 characters";
const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters";
const PASSWORD_TOO_LONG: &str = "Password must be at most 50 characters";

fn name_field(field: FieldSpec) -> FieldSpec {
    field
        .rule(Rule::MinLength {
            min: DISPLAY_NAME_MIN,
            message: NAME_TOO_SHORT,
        })
        .rule(Rule::MaxLength {
            max: DISPLAY_NAME_MAX,
            message: NAME_TOO_LONG,
        })
}

fn email_field(field: FieldSpec) -> FieldSpec {
    field
        .rule(Rule::MaxLength {
            max: EMAIL_MAX,
            message: EMAIL_TOO_LONG,
        })
        .rule(Rule::Email {
            message: EMAIL_INVALID,
        })
}

fn password_field(field: FieldSpec) -> FieldSpec {
    field
        .rule(Rule::MinLength {
            min: PASSWORD_MIN,
            message: PASSWORD_TOO_SHORT,
        })
        .rule(Rule::MaxLength {
            max: PASSWORD_MAX,
            message: PASSWORD_TOO_LONG,
        })
}

/// Signup body for `POST /users`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CreateUserRequest {
    /// Display name.
    #[schema(example = "Ada Lovelace", min_length = 2, max_length = 100)]
    pub name: String,
    /// Login email; must not already be registered.
    #[schema(example = "ada@example.com", max_length = 320)]
    pub email: String,
    /// Plaintext password; only its hash is stored.
    #[schema(example = "analytical", min_length = 6, max_length = 50)]
    pub password: String,
}

impl ValidatedBody for CreateUserRequest {
    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::new(vec![
                name_field(FieldSpec::required("name", "Name is required")),
                email_field(FieldSpec::required("email", EMAIL_INVALID)),
                password_field(FieldSpec::required("password", "Password is required")),
            ])
        })
    }
}

/// Partial update body for `PATCH /users`; omitted fields are left as is.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct UpdateUserRequest {
    /// New display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "Ada King", min_length = 2, max_length = 100)]
    pub name: Option<String>,
    /// New login email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(max_length = 320)]
    pub email: Option<String>,
    /// New password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(min_length = 6, max_length = 50)]
    pub password: Option<String>,
}

impl ValidatedBody for UpdateUserRequest {
    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::new(vec![
                name_field(FieldSpec::optional("name")),
                email_field(FieldSpec::optional("email")),
                password_field(FieldSpec::optional("password")),
            ])
        })
    }
}

fn field_error(field: &str) -> impl FnOnce(UserValidationError) -> Error + '_ {
    move |err| {
        validation_error(&[FieldViolation {
            field: field.to_owned(),
            message: err.to_string(),
        }])
    }
}

impl TryFrom<CreateUserRequest> for NewUser {
    type Error = Error;

    fn try_from(value: CreateUserRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: DisplayName::new(value.name).map_err(field_error("name"))?,
            email: EmailAddress::new(value.email).map_err(field_error("email"))?,
            password: PlainPassword::new(value.password).map_err(field_error("password"))?,
        })
    }
}

impl TryFrom<UpdateUserRequest> for UserUpdate {
    type Error = Error;

    fn try_from(value: UpdateUserRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: value
                .name
                .map(DisplayName::new)
                .transpose()
                .map_err(field_error("name"))?,
            email: value
                .email
                .map(EmailAddress::new)
                .transpose()
                .map_err(field_error("email"))?,
            password: value
                .password
                .map(PlainPassword::new)
                .transpose()
                .map_err(field_error("password"))?,
        })
    }
}

/// Register a new user.
#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserSchema),
        (status = 400, description = "Validation failed", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 503, description = "Database unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "createUser",
    security([])
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: ValidatedJson<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let new_user = NewUser::try_from(payload.into_inner())?;
    let user = state.users_command.create_user(new_user).await?;
    Ok(HttpResponse::Created().json(user))
}

/// List every registered user ordered by id.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use user_accounts::inbound::http::users::list_users;
///
/// let app = App::new().service(list_users);
/// ```
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "Users", body = [UserSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Database unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<User>>> {
    let users = state.users_query.list_users().await?;
    Ok(web::Json(users))
}

/// Fetch the caller's own record.
#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = 200, description = "Current user", body = UserSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<User>> {
    let user = state.users_query.fetch_user(caller.id()).await?;
    Ok(web::Json(user))
}

/// Apply a partial update to the caller's record.
#[utoipa::path(
    patch,
    path = "/users",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserSchema),
        (status = 400, description = "Validation failed", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[patch("/users")]
pub async fn update_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: ValidatedJson<UpdateUserRequest>,
) -> ApiResult<web::Json<User>> {
    let update = UserUpdate::try_from(payload.into_inner())?;
    let user = state.users_command.update_user(caller.id(), update).await?;
    Ok(web::Json(user))
}

/// Delete the caller's record and return it.
#[utoipa::path(
    delete,
    path = "/users",
    responses(
        (status = 200, description = "Deleted user", body = UserSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<User>> {
    let user = state.users_command.delete_user(caller.id()).await?;
    Ok(web::Json(user))
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
