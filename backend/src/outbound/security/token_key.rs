//! Loading the access token signing key.
//!
//! The key is read once at startup from the file named by `TOKEN_KEY_FILE`
//! (default `/var/run/secrets/token_key`). Debug builds fall back to a random
//! per-process key when the file is unreadable unless
//! `TOKEN_ALLOW_EPHEMERAL=0`; release builds require a readable key of at
//! least [`TOKEN_KEY_MIN_LEN`] bytes and reject `TOKEN_ALLOW_EPHEMERAL=1`.

use std::fmt;
use std::path::PathBuf;

use mockable::Env;
use rand::RngCore;
use rand::rngs::OsRng;
use tracing::{info, warn};
use zeroize::Zeroizing;

const TOKEN_KEY_DEFAULT_PATH: &str = "/var/run/secrets/token_key";
const KEY_FILE_ENV: &str = "TOKEN_KEY_FILE";
const ALLOW_EPHEMERAL_ENV: &str = "TOKEN_ALLOW_EPHEMERAL";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";

/// Minimum key length accepted in release builds.
pub const TOKEN_KEY_MIN_LEN: usize = 32;

/// Build mode for key validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Tolerates missing keys and short keys with a warning.
    Debug,
    /// Requires a real key file.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Symmetric signing key; wiped from memory on drop.
pub struct TokenKey(Zeroizing<Vec<u8>>);

impl TokenKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Generate a random key valid for this process only.
    pub fn ephemeral() -> Self {
        let mut bytes = vec![0_u8; TOKEN_KEY_MIN_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self::from_bytes(bytes)
    }

    /// Raw key material for the signer.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TokenKey").field(&"<redacted>").finish()
    }
}

/// Errors raised while loading the signing key.
#[derive(thiserror::Error, Debug)]
pub enum TokenKeyError {
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Reading the key file failed.
    #[error("failed to read token key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The key file is shorter than the release minimum.
    #[error("token key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    /// Release builds must not use ephemeral keys.
    #[error("TOKEN_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Load the signing key according to `mode`.
///
/// # Examples
/// ```
/// use mockable::MockEnv;
/// use user_accounts::outbound::security::{BuildMode, token_key_from_env};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let file = tempfile::NamedTempFile::new()?;
/// std::fs::write(file.path(), [7_u8; 32])?;
/// let path = file.path().to_string_lossy().into_owned();
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(move |name| match name {
///     "TOKEN_KEY_FILE" => Some(path.clone()),
///     _ => None,
/// });
///
/// let key = token_key_from_env(&env, BuildMode::Release)?;
/// assert_eq!(key.as_bytes(), &[7_u8; 32]);
/// # Ok(())
/// # }
/// ```
pub fn token_key_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<TokenKey, TokenKeyError> {
    let allow_ephemeral = allow_ephemeral_from_env(env, mode)?;
    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| TOKEN_KEY_DEFAULT_PATH.to_owned()),
    );

    match std::fs::read(&path) {
        Ok(bytes) => {
            let bytes = Zeroizing::new(bytes);
            let length = bytes.len();
            if length < TOKEN_KEY_MIN_LEN {
                if !mode.is_debug() || length == 0 {
                    return Err(TokenKeyError::KeyTooShort {
                        path,
                        length,
                        min_len: TOKEN_KEY_MIN_LEN,
                    });
                }
                warn!(
                    path = %path.display(),
                    length,
                    "token key shorter than release minimum"
                );
            }
            info!(path = %path.display(), "loaded token signing key");
            Ok(TokenKey(bytes))
        }
        Err(error) if allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %error,
                "using ephemeral token key; tokens will not survive a restart"
            );
            Ok(TokenKey::ephemeral())
        }
        Err(error) => Err(TokenKeyError::KeyRead {
            path,
            source: error,
        }),
    }
}

fn allow_ephemeral_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<bool, TokenKeyError> {
    let Some(value) = env.string(ALLOW_EPHEMERAL_ENV) else {
        return Ok(mode.is_debug());
    };
    match (parse_bool(&value), mode) {
        (Some(true), BuildMode::Release) => Err(TokenKeyError::EphemeralNotAllowed),
        (Some(flag), _) => Ok(flag),
        (None, BuildMode::Debug) => {
            warn!(value = %value, "invalid TOKEN_ALLOW_EPHEMERAL; defaulting to enabled");
            Ok(true)
        }
        (None, BuildMode::Release) => Err(TokenKeyError::InvalidEnv {
            name: ALLOW_EPHEMERAL_ENV,
            value,
            expected: BOOL_EXPECTED,
        }),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}
