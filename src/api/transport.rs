//! HTTP transport used by the fetcher
//!
//! The fetcher only needs "GET this URL with these headers and give me the
//! status and body". Keeping that behind a trait lets tests script the
//! upstream without a network.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Client;

/// Status code and body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Something that can issue a GET request
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, headers: &HeaderMap) -> Result<RawResponse, reqwest::Error>;
}

/// Transport backed by a `reqwest::Client`
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a new transport with a default HTTP client
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new transport with a custom HTTP client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, headers: &HeaderMap) -> Result<RawResponse, reqwest::Error> {
        let response = self.client.get(url).headers(headers.clone()).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(RawResponse { status, body })
    }
}
