//! HS256 JSON Web Token implementation of the `AccessTokenService` port.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};

use crate::domain::ports::{AccessTokenError, AccessTokenService};
use crate::domain::{AccessToken, UserId};

/// Seconds of clock skew tolerated when checking `exp`.
const EXPIRY_LEEWAY_SECS: i64 = 5;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Token issuer and verifier sharing one symmetric key.
#[derive(Clone)]
pub struct JwtAccessTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtAccessTokens {
    /// Create a token service signing with `secret`; tokens expire `ttl`
    /// after issue. Both stamping and expiry checks read `clock`.
    pub fn new(secret: &[u8], ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // `exp` is checked against `clock` in `verify`.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
            clock,
        }
    }
}

impl AccessTokenService for JwtAccessTokens {
    fn issue(&self, user_id: UserId) -> Result<AccessToken, AccessTokenError> {
        let issued_at = self.clock.utc().timestamp();
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            sub: user_id.to_string(),
            iat: issued_at,
            exp: issued_at.saturating_add(ttl),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map(AccessToken::new)
            .map_err(|err| AccessTokenError::issue(err.to_string()))
    }

    fn verify(&self, token: &str) -> Result<UserId, AccessTokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|err| AccessTokenError::invalid(err.to_string()))?;
        let now = self.clock.utc().timestamp();
        if data.claims.exp.saturating_add(EXPIRY_LEEWAY_SECS) < now {
            return Err(AccessTokenError::invalid("token expired"));
        }
        let raw: i64 = data
            .claims
            .sub
            .parse()
            .map_err(|_| AccessTokenError::invalid("subject is not a user id"))?;
        UserId::new(raw).map_err(|err| AccessTokenError::invalid(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::{DateTime, Local, TimeDelta, Utc};
    use rstest::rstest;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn local(&self) -> DateTime<Local> {
            self.0.with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn tokens_at(now: DateTime<Utc>, secret: &[u8]) -> JwtAccessTokens {
        JwtAccessTokens::new(secret, Duration::from_secs(3600), Arc::new(FixedClock(now)))
    }

    fn user(id: i64) -> UserId {
        UserId::new(id).expect("valid id")
    }

    #[rstest]
    fn issued_token_verifies_to_subject() {
        let tokens = tokens_at(Utc::now(), SECRET);
        let token = tokens.issue(user(42)).expect("issue");
        assert_eq!(tokens.verify(token.as_str()).expect("verify"), user(42));
    }

    #[rstest]
    fn expired_token_is_rejected() {
        let two_hours_ago = Utc::now() - TimeDelta::hours(2);
        let token = tokens_at(two_hours_ago, SECRET)
            .issue(user(1))
            .expect("issue");
        let result = tokens_at(Utc::now(), SECRET).verify(token.as_str());
        assert!(matches!(result, Err(AccessTokenError::Invalid { .. })));
    }

    #[rstest]
    #[case(TimeDelta::seconds(3600), true)]
    #[case(TimeDelta::seconds(3600 + 5), true)]
    #[case(TimeDelta::seconds(3600 + 6), false)]
    fn expiry_is_measured_on_the_injected_clock(#[case] elapsed: TimeDelta, #[case] valid: bool) {
        // Far from the system clock, so only the injected clock can decide.
        let issued = Utc::now() - TimeDelta::days(365);
        let token = tokens_at(issued, SECRET).issue(user(3)).expect("issue");
        let result = tokens_at(issued + elapsed, SECRET).verify(token.as_str());
        assert_eq!(result.is_ok(), valid, "{result:?}");
    }

    #[rstest]
    fn token_signed_with_other_key_is_rejected() {
        let token = tokens_at(Utc::now(), b"another-key-another-key-another!")
            .issue(user(1))
            .expect("issue");
        let result = tokens_at(Utc::now(), SECRET).verify(token.as_str());
        assert!(matches!(result, Err(AccessTokenError::Invalid { .. })));
    }

    #[rstest]
    fn tampered_payload_is_rejected() {
        let tokens = tokens_at(Utc::now(), SECRET);
        let token = String::from(tokens.issue(user(1)).expect("issue"));
        let forged_claims = tokens.issue(user(2)).expect("issue");
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged_payload = forged_claims.as_str().split('.').nth(1).expect("payload");
        parts[1] = forged_payload;
        let result = tokens.verify(&parts.join("."));
        assert!(matches!(result, Err(AccessTokenError::Invalid { .. })));
    }

    #[rstest]
    #[case("")]
    #[case("not-a-token")]
    #[case("a.b.c")]
    fn garbage_is_rejected(#[case] raw: &str) {
        let result = tokens_at(Utc::now(), SECRET).verify(raw);
        assert!(matches!(result, Err(AccessTokenError::Invalid { .. })));
    }

    #[rstest]
    #[case("zero")]
    #[case("0")]
    #[case("-4")]
    fn non_user_subjects_are_rejected(#[case] subject: &str) {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.to_owned(),
            iat: now,
            exp: now + 60,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .expect("encode");
        let result = tokens_at(Utc::now(), SECRET).verify(&token);
        assert!(matches!(result, Err(AccessTokenError::Invalid { .. })));
    }
}
