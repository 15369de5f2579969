//! Tests for the users API handlers.

use std::sync::Arc;

use actix_web::dev::Service;
use actix_web::http::StatusCode;
use actix_web::{App, HttpMessage, test};
use chrono::{TimeZone, Utc};
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::{MockLoginService, MockUsersCommand, MockUsersQuery};
use crate::domain::{ErrorCode, UserId};

const CALLER: i64 = 7;

fn user(id: i64, name: &str, email: &str) -> User {
    let timestamp = Utc
        .with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp");
    User::new(
        UserId::new(id).expect("valid id"),
        DisplayName::new(name).expect("valid name"),
        EmailAddress::new(email).expect("valid email"),
        timestamp,
        timestamp,
    )
}

fn caller_id() -> UserId {
    UserId::new(CALLER).expect("valid id")
}

async fn call(
    query: MockUsersQuery,
    command: MockUsersCommand,
    request: test::TestRequest,
) -> (StatusCode, Value) {
    let state = web::Data::new(HttpState::new(
        Arc::new(MockLoginService::new()),
        Arc::new(query),
        Arc::new(command),
    ));
    let app = test::init_service(
        App::new()
            .app_data(state)
            .wrap_fn(|req, srv| {
                if req.path() != "/users" || req.method() != actix_web::http::Method::POST {
                    req.extensions_mut()
                        .insert(AuthenticatedUser::new(caller_id()));
                }
                srv.call(req)
            })
            .service(create_user)
            .service(list_users)
            .service(current_user)
            .service(update_user)
            .service(delete_user),
    )
    .await;
    let response = test::call_service(&app, request.to_request()).await;
    let status = response.status();
    let body = test::read_body(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, value)
}

#[actix_web::test]
async fn create_returns_201_without_password_fields() {
    let mut command = MockUsersCommand::new();
    command
        .expect_create_user()
        .withf(|new_user| {
            new_user.name.as_ref() == "Ada Lovelace" && new_user.password.expose() == "analytical"
        })
        .return_once(|_| Ok(user(1, "Ada Lovelace", "ada@example.com")));

    let (status, body) = call(
        MockUsersQuery::new(),
        command,
        test::TestRequest::post().uri("/users").set_json(json!({
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "password": "analytical",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], 1);
    assert_eq!(body["createdAt"], "2024-05-01T12:00:00Z");
    let keys: Vec<&String> = body.as_object().expect("object").keys().collect();
    assert!(keys.iter().all(|key| !key.to_lowercase().contains("password")));
}

#[rstest]
#[case(json!({ "name": "Ada", "email": "ada@example.com", "password": "12345" }),
       vec![("password", "Password must be at least 6 characters")])]
#[case(json!({ "name": "A", "email": "bad", "password": "analytical" }),
       vec![("name", "Name must be at least 2 characters"), ("email", "Invalid email address")])]
#[case(json!({ "email": "ada@example.com" }),
       vec![("name", "Name is required"), ("password", "Password is required")])]
#[case(json!({ "name": "Ada", "email": "ada@example.com", "password": 123456 }),
       vec![("password", "password must be a string")])]
#[case(json!({ "name": "Ada", "email": format!("{}@example.com", "a".repeat(330)), "password": "analytical" }),
       vec![("email", "Email must be at most 320 characters")])]
#[actix_web::test]
async fn create_rejects_invalid_bodies(
    #[case] payload: Value,
    #[case] expected: Vec<(&str, &str)>,
) {
    let mut command = MockUsersCommand::new();
    command.expect_create_user().never();

    let (status, body) = call(
        MockUsersQuery::new(),
        command,
        test::TestRequest::post().uri("/users").set_json(payload),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["message"], "Validation failed");
    let errors: Vec<(String, String)> = body["details"]["errors"]
        .as_array()
        .expect("errors array")
        .iter()
        .map(|e| {
            (
                e["field"].as_str().expect("field").to_owned(),
                e["message"].as_str().expect("message").to_owned(),
            )
        })
        .collect();
    let expected: Vec<(String, String)> = expected
        .into_iter()
        .map(|(f, m)| (f.to_owned(), m.to_owned()))
        .collect();
    assert_eq!(errors, expected);
}

#[actix_web::test]
async fn create_rejects_malformed_json() {
    let mut command = MockUsersCommand::new();
    command.expect_create_user().never();

    let (status, body) = call(
        MockUsersQuery::new(),
        command,
        test::TestRequest::post()
            .uri("/users")
            .insert_header(("content-type", "application/json"))
            .set_payload("{ not json"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
}

#[actix_web::test]
async fn create_surfaces_conflict() {
    let mut command = MockUsersCommand::new();
    command
        .expect_create_user()
        .return_once(|_| Err(Error::conflict("User already exists")));

    let (status, body) = call(
        MockUsersQuery::new(),
        command,
        test::TestRequest::post().uri("/users").set_json(json!({
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "password": "analytical",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "User already exists");
}

#[actix_web::test]
async fn list_returns_all_users() {
    let mut query = MockUsersQuery::new();
    query.expect_list_users().return_once(|| {
        Ok(vec![
            user(1, "Ada Lovelace", "ada@example.com"),
            user(CALLER, "Grace Hopper", "grace@example.com"),
        ])
    });

    let (status, body) = call(
        query,
        MockUsersCommand::new(),
        test::TestRequest::get().uri("/users"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(2));
}

#[actix_web::test]
async fn me_fetches_the_caller() {
    let mut query = MockUsersQuery::new();
    query
        .expect_fetch_user()
        .withf(|id| *id == caller_id())
        .return_once(|_| Ok(user(CALLER, "Grace Hopper", "grace@example.com")));

    let (status, body) = call(
        query,
        MockUsersCommand::new(),
        test::TestRequest::get().uri("/users/me"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "grace@example.com");
}

#[actix_web::test]
async fn me_reports_missing_record() {
    let mut query = MockUsersQuery::new();
    query
        .expect_fetch_user()
        .return_once(|_| Err(Error::not_found("User not found")));

    let (status, body) = call(
        query,
        MockUsersCommand::new(),
        test::TestRequest::get().uri("/users/me"),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[actix_web::test]
async fn patch_passes_only_supplied_fields() {
    let mut command = MockUsersCommand::new();
    command
        .expect_update_user()
        .withf(|id, update| {
            *id == caller_id()
                && update.name.as_ref().is_some_and(|name| name.as_ref() == "Ada King")
                && update.email.is_none()
                && update.password.is_none()
        })
        .return_once(|_, _| Ok(user(CALLER, "Ada King", "ada@example.com")));

    let (status, body) = call(
        MockUsersQuery::new(),
        command,
        test::TestRequest::patch()
            .uri("/users")
            .set_json(json!({ "name": "Ada King", "role": "admin" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ada King");
}

#[actix_web::test]
async fn patch_validates_optional_fields() {
    let mut command = MockUsersCommand::new();
    command.expect_update_user().never();

    let (status, body) = call(
        MockUsersQuery::new(),
        command,
        test::TestRequest::patch()
            .uri("/users")
            .set_json(json!({ "password": "short" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["errors"][0]["field"], "password");
}

#[actix_web::test]
async fn delete_returns_removed_record() {
    let mut command = MockUsersCommand::new();
    command
        .expect_delete_user()
        .withf(|id| *id == caller_id())
        .return_once(|_| Ok(user(CALLER, "Grace Hopper", "grace@example.com")));

    let (status, body) = call(
        MockUsersQuery::new(),
        command,
        test::TestRequest::delete().uri("/users"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], CALLER);
}

#[rstest]
#[case(ErrorCode::ServiceUnavailable, StatusCode::SERVICE_UNAVAILABLE)]
#[case(ErrorCode::InvalidRequest, StatusCode::BAD_REQUEST)]
#[actix_web::test]
async fn delete_maps_service_errors(#[case] code: ErrorCode, #[case] expected: StatusCode) {
    let mut command = MockUsersCommand::new();
    command
        .expect_delete_user()
        .return_once(move |_| Err(Error::new(code, "failure")));

    let (status, _) = call(
        MockUsersQuery::new(),
        command,
        test::TestRequest::delete().uri("/users"),
    )
    .await;

    assert_eq!(status, expected);
}
