//! Request body validation for inbound HTTP adapters.
//!
//! A [`Schema`] lists the fields a JSON body may carry and the rules each
//! must satisfy. Validation reports every failing field at once; a body that
//! passes is reduced to the declared fields before it is deserialised, so
//! unknown keys never reach a handler. Strict schemas report unknown keys as
//! violations instead of dropping them.
//!
//! Handlers receive validated payloads through [`ValidatedJson`].

use std::ops::Deref;

use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::domain::{Error, is_valid_email};

/// Top-level message for every schema failure.
pub const VALIDATION_FAILED: &str = "Validation failed";
/// Message for bodies that are not parseable JSON objects.
pub const MALFORMED_BODY: &str = "Request body must be a JSON object";

/// Single rule applied to a present string field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Minimum length in characters.
    MinLength {
        /// Smallest accepted length.
        min: usize,
        /// Reported when the value is shorter.
        message: &'static str,
    },
    /// Maximum length in characters.
    MaxLength {
        /// Largest accepted length.
        max: usize,
        /// Reported when the value is longer.
        message: &'static str,
    },
    /// Well-formed email address.
    Email {
        /// Reported when the value is not an address.
        message: &'static str,
    },
}

impl Rule {
    fn check(&self, value: &str) -> Option<&'static str> {
        let passes = match *self {
            Self::MinLength { min, .. } => value.chars().count() >= min,
            Self::MaxLength { max, .. } => value.chars().count() <= max,
            Self::Email { .. } => is_valid_email(value),
        };
        if passes { None } else { Some(self.message()) }
    }

    fn message(&self) -> &'static str {
        match *self {
            Self::MinLength { message, .. }
            | Self::MaxLength { message, .. }
            | Self::Email { message } => message,
        }
    }
}

/// Constraints for one string field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    name: &'static str,
    required: Option<&'static str>,
    rules: Vec<Rule>,
}

impl FieldSpec {
    /// A field that must be present; `message` is reported when it is not.
    pub fn required(name: &'static str, message: &'static str) -> Self {
        Self {
            name,
            required: Some(message),
            rules: Vec::new(),
        }
    }

    /// A field that may be omitted or `null`.
    pub fn optional(name: &'static str) -> Self {
        Self {
            name,
            required: None,
            rules: Vec::new(),
        }
    }

    /// Append a rule; rules run in insertion order and the first failure wins.
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    fn check(&self, value: Option<&Value>) -> Option<String> {
        match value {
            None | Some(Value::Null) => self.required.map(str::to_owned),
            Some(Value::String(text)) => self
                .rules
                .iter()
                .find_map(|rule| rule.check(text))
                .map(str::to_owned),
            Some(_) => Some(format!("{} must be a string", self.name)),
        }
    }
}

/// One failing field in a rejected body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// Name of the offending field.
    pub field: String,
    /// Human-readable reason.
    pub message: String,
}

/// Field constraints for one request body shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<FieldSpec>,
    strict: bool,
}

impl Schema {
    /// Build a schema that drops unknown keys.
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self {
            fields,
            strict: false,
        }
    }

    /// Report unknown keys as violations instead of dropping them.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Validate `input`, returning only the declared fields on success.
    ///
    /// # Examples
    /// ```
    /// use serde_json::json;
    /// use user_accounts::inbound::http::validation::{FieldSpec, Rule, Schema};
    ///
    /// let schema = Schema::new(vec![
    ///     FieldSpec::required("name", "Name is required")
    ///         .rule(Rule::MinLength { min: 2, message: "Name must be at least 2 characters" }),
    /// ]);
    /// let cleaned = schema.validate(json!({ "name": "Ada", "role": "admin" })).unwrap();
    /// assert_eq!(cleaned, json!({ "name": "Ada" }));
    /// ```
    pub fn validate(&self, input: Value) -> Result<Value, Vec<FieldViolation>> {
        let Value::Object(mut object) = input else {
            return Err(vec![FieldViolation {
                field: "body".to_owned(),
                message: MALFORMED_BODY.to_owned(),
            }]);
        };

        let mut violations: Vec<FieldViolation> = self
            .fields
            .iter()
            .filter_map(|spec| {
                spec.check(object.get(spec.name)).map(|message| FieldViolation {
                    field: spec.name.to_owned(),
                    message,
                })
            })
            .collect();

        if self.strict {
            violations.extend(
                object
                    .keys()
                    .filter(|key| !self.declares(key))
                    .map(|key| FieldViolation {
                        field: key.clone(),
                        message: format!("Unrecognized key '{key}'"),
                    }),
            );
        }

        if !violations.is_empty() {
            return Err(violations);
        }

        let cleaned: Map<String, Value> = self
            .fields
            .iter()
            .filter_map(|spec| {
                object
                    .remove(spec.name)
                    .filter(|value| !value.is_null())
                    .map(|value| (spec.name.to_owned(), value))
            })
            .collect();
        Ok(Value::Object(cleaned))
    }

    fn declares(&self, key: &str) -> bool {
        self.fields.iter().any(|spec| spec.name == key)
    }
}

/// Build the 400 error for a rejected body.
pub fn validation_error(violations: &[FieldViolation]) -> Error {
    Error::invalid_request(VALIDATION_FAILED).with_details(json!({ "errors": violations }))
}

/// Request bodies with an associated schema.
pub trait ValidatedBody: DeserializeOwned {
    /// Schema applied before deserialisation.
    fn schema() -> &'static Schema;
}

/// JSON extractor that applies `T::schema()` before deserialising.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T> ValidatedJson<T> {
    /// Unwrap the validated payload.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for ValidatedJson<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

fn parse_validated<T: ValidatedBody>(raw: Value) -> Result<T, Error> {
    let cleaned = T::schema().validate(raw).map_err(|violations| {
        debug!(count = violations.len(), "request body failed validation");
        validation_error(&violations)
    })?;
    serde_json::from_value(cleaned).map_err(|err| {
        debug!(error = %err, "validated body did not deserialise");
        Error::invalid_request(VALIDATION_FAILED)
    })
}

impl<T> FromRequest for ValidatedJson<T>
where
    T: ValidatedBody + 'static,
{
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let body = web::Json::<Value>::from_request(req, payload);
        Box::pin(async move {
            let raw = body.await.map_err(|err| {
                debug!(error = %err, "request body is not JSON");
                Error::invalid_request(MALFORMED_BODY)
            })?;
            Ok(ValidatedJson(parse_validated::<T>(raw.into_inner())?))
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn schema() -> Schema {
        Schema::new(vec![
            FieldSpec::required("name", "Name is required").rule(Rule::MinLength {
                min: 2,
                message: "Name must be at least 2 characters",
            }),
            FieldSpec::required("email", "Invalid email address").rule(Rule::Email {
                message: "Invalid email address",
            }),
            FieldSpec::optional("nickname").rule(Rule::MaxLength {
                max: 4,
                message: "Nickname must be at most 4 characters",
            }),
        ])
    }

    fn fields(violations: &[FieldViolation]) -> Vec<&str> {
        violations.iter().map(|v| v.field.as_str()).collect()
    }

    #[rstest]
    fn valid_body_keeps_declared_fields_only(schema: Schema) {
        let cleaned = schema
            .validate(json!({ "name": "Ada", "email": "ada@example.com", "admin": true }))
            .expect("valid body");
        assert_eq!(cleaned, json!({ "name": "Ada", "email": "ada@example.com" }));
    }

    #[rstest]
    fn every_failing_field_is_reported(schema: Schema) {
        let violations = schema
            .validate(json!({ "name": "A", "email": "nope", "nickname": "toolong" }))
            .expect_err("invalid body");
        assert_eq!(fields(&violations), vec!["name", "email", "nickname"]);
        assert_eq!(violations[0].message, "Name must be at least 2 characters");
    }

    #[rstest]
    #[case(json!({ "email": "ada@example.com" }))]
    #[case(json!({ "name": null, "email": "ada@example.com" }))]
    fn missing_required_field_uses_its_message(schema: Schema, #[case] body: Value) {
        let violations = schema.validate(body).expect_err("missing name");
        assert_eq!(
            violations,
            vec![FieldViolation {
                field: "name".to_owned(),
                message: "Name is required".to_owned(),
            }]
        );
    }

    #[rstest]
    fn non_string_values_are_rejected(schema: Schema) {
        let violations = schema
            .validate(json!({ "name": 42, "email": "ada@example.com" }))
            .expect_err("wrong type");
        assert_eq!(violations[0].message, "name must be a string");
    }

    #[rstest]
    fn optional_null_is_dropped(schema: Schema) {
        let cleaned = schema
            .validate(json!({ "name": "Ada", "email": "ada@example.com", "nickname": null }))
            .expect("valid body");
        assert!(cleaned.get("nickname").is_none());
    }

    #[rstest]
    fn strict_schema_reports_unknown_keys(schema: Schema) {
        let violations = schema
            .strict()
            .validate(json!({ "name": "Ada", "email": "ada@example.com", "role": "admin" }))
            .expect_err("unknown key");
        assert_eq!(fields(&violations), vec!["role"]);
    }

    #[rstest]
    #[case(json!([1, 2]))]
    #[case(json!("text"))]
    #[case(Value::Null)]
    fn non_object_bodies_are_rejected(schema: Schema, #[case] body: Value) {
        let violations = schema.validate(body).expect_err("not an object");
        assert_eq!(violations[0].message, MALFORMED_BODY);
    }

    #[rstest]
    fn validation_error_lists_violations() {
        let error = validation_error(&[FieldViolation {
            field: "password".to_owned(),
            message: "Password must be at least 6 characters".to_owned(),
        }]);
        assert_eq!(error.message(), VALIDATION_FAILED);
        assert_eq!(
            error.details(),
            Some(&json!({ "errors": [{
                "field": "password",
                "message": "Password must be at least 6 characters",
            }]}))
        );
    }
}
