//! Credential configuration
//!
//! Credentials are captured out-of-band (from a logged-in browser session) and
//! stored as `YS_*` key/value pairs, usually in a `.env` file next to the
//! binary. This module only reads them.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::Value;
use thiserror::Error;

/// Environment variable holding the bearer token
pub const ENV_TOKEN: &str = "YS_TOKEN";
/// Environment variable holding the customer id
pub const ENV_USER_ID: &str = "YS_USER_ID";
/// Environment variable holding the optional customer hash
pub const ENV_CUSTOMER_HASH: &str = "YS_CUSTOMER_HASH";
/// Environment variable holding the session-tracking client id
pub const ENV_PERSEUS_CLIENT_ID: &str = "YS_PERSEUS_CLIENT_ID";
/// Environment variable holding the session-tracking session id
pub const ENV_PERSEUS_SESSION_ID: &str = "YS_PERSEUS_SESSION_ID";

/// Error types for credential loading
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The bearer token is required for every request
    #[error("YS_TOKEN not found. Check your .env file or environment")]
    MissingToken,
}

/// Immutable credential bundle used to authenticate requests
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Credentials {
    pub auth_token: String,
    pub user_id: String,
    /// Not every account has one; sent empty when absent
    pub customer_hash: Option<String>,
    pub perseus_client_id: String,
    pub perseus_session_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("auth_token", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("customer_hash", &self.customer_hash)
            .field("perseus_client_id", &self.perseus_client_id)
            .field("perseus_session_id", &self.perseus_session_id)
            .finish()
    }
}

impl Credentials {
    /// Creates credentials from a bearer token alone
    ///
    /// The user id is recovered from the token's payload when possible.
    pub fn from_token(token: impl Into<String>) -> Self {
        let auth_token = token.into();
        let user_id = user_id_from_token(&auth_token).unwrap_or_default();
        Self {
            auth_token,
            user_id,
            ..Self::default()
        }
    }

    /// Loads credentials from the process environment
    ///
    /// A `.env` file in the working directory (or a parent) is loaded first if
    /// present; variables already set in the environment win.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds credentials from an arbitrary key/value lookup
    ///
    /// # Returns
    /// * `Ok(Credentials)` when a non-empty token is present
    /// * `Err(ConfigError::MissingToken)` otherwise
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let auth_token = read(ENV_TOKEN).ok_or(ConfigError::MissingToken)?;
        let user_id = read(ENV_USER_ID)
            .or_else(|| user_id_from_token(&auth_token))
            .unwrap_or_default();

        Ok(Self {
            user_id,
            customer_hash: read(ENV_CUSTOMER_HASH),
            perseus_client_id: read(ENV_PERSEUS_CLIENT_ID).unwrap_or_default(),
            perseus_session_id: read(ENV_PERSEUS_SESSION_ID).unwrap_or_default(),
            auth_token,
        })
    }
}

/// Extracts the `user_id` claim from a JWT without verifying it
pub fn user_id_from_token(token: &str) -> Option<String> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: Value = serde_json::from_slice(&bytes).ok()?;

    match claims.get("user_id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
