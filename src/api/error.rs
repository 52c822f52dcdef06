//! Error types for the API-access layer

use thiserror::Error;

/// Number of body characters kept on an HTTP error
pub const ERROR_BODY_PREFIX_CHARS: usize = 200;

/// Errors that can occur when talking to the upstream API
#[derive(Debug, Error)]
pub enum ApiError {
    /// The anti-bot system served a challenge on every attempt
    #[error("Blocked by the anti-bot challenge after {attempts} attempts; try again later")]
    ChallengeExhausted { attempts: u32 },

    /// Non-2xx response that is not a challenge
    #[error("API {status}: {body}")]
    Http { status: u16, body: String },

    /// HTTP request could not be completed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Response was not the JSON shape we expected
    #[error("Failed to parse JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// Request URL could not be built
    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A credential could not be encoded as a header value
    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

impl ApiError {
    /// Builds an `Http` error, truncating the body to its first 200 characters
    pub fn http(status: u16, body: &str) -> Self {
        Self::Http {
            status,
            body: body.chars().take(ERROR_BODY_PREFIX_CHARS).collect(),
        }
    }

    /// Whether the failure was caused by the anti-bot system
    pub fn is_challenge(&self) -> bool {
        matches!(self, Self::ChallengeExhausted { .. })
    }

    /// HTTP status code, when the upstream answered with one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
