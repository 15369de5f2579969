//! Cryptographic adapters: password hashing, signed access tokens, and the
//! signing key loader.

mod argon2_password_hasher;
mod jwt_access_tokens;
mod token_key;

pub use argon2_password_hasher::{Argon2PasswordHasher, HashCost};
pub use jwt_access_tokens::JwtAccessTokens;
pub use token_key::{BuildMode, TOKEN_KEY_MIN_LEN, TokenKey, TokenKeyError, token_key_from_env};
