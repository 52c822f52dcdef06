//! Challenge-aware fetcher with cooldown and bounded retry
//!
//! Every request goes through [`ResilientFetcher::fetch_json`]:
//!
//! 1. wait out the shared cooldown, if one is active
//! 2. issue the request (up to [`MAX_ATTEMPTS`] times)
//! 3. on a 403 challenge page, start the cooldown and back off using
//!    [`RETRY_DELAYS`] before the next attempt
//! 4. any other non-2xx response fails immediately
//!
//! The retry policy is the [`FetchState`] machine below; the fetcher only
//! performs the side effects each state asks for.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::HeaderMap;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::challenge::is_challenge;
use super::cooldown::{Cooldown, CHALLENGE_COOLDOWN};
use super::error::ApiError;
use super::status::StatusSink;
use super::transport::{RawResponse, Transport};

/// Maximum number of requests issued per fetch
pub const MAX_ATTEMPTS: u32 = 4;

/// Backoff after a challenged attempt, indexed by attempt number
pub const RETRY_DELAYS: [Duration; MAX_ATTEMPTS as usize] = [
    Duration::from_secs(3),
    Duration::from_secs(8),
    Duration::from_secs(20),
    Duration::from_secs(45),
];

/// HTTP status the challenge page is served with
const CHALLENGE_STATUS: u16 = 403;

/// Classification of one completed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// 2xx response
    Success,
    /// 403 carrying a challenge page
    Challenged,
    /// Any other non-2xx response
    HttpError,
}

impl AttemptOutcome {
    pub fn classify(response: &RawResponse) -> Self {
        if response.status == CHALLENGE_STATUS && is_challenge(&response.body) {
            Self::Challenged
        } else if response.is_success() {
            Self::Success
        } else {
            Self::HttpError
        }
    }
}

/// Inputs that drive the fetch state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchEvent {
    /// The shared cooldown is not (or no longer) active
    CooldownElapsed,
    /// A request completed with the given outcome
    Completed(AttemptOutcome),
    /// The backoff delay has passed
    DelayElapsed,
}

/// States of a single `fetch_json` call
///
/// ```text
/// Ready --CooldownElapsed--> Attempting(0)
/// Attempting(n) --Success--> Succeeded
/// Attempting(n) --HttpError--> Failed
/// Attempting(n) --Challenged--> Backoff(n, RETRY_DELAYS[n])
/// Backoff(n) --DelayElapsed--> Attempting(n + 1)   if n + 1 < MAX_ATTEMPTS
/// Backoff(n) --DelayElapsed--> Exhausted           otherwise
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Ready,
    Attempting { attempt: u32 },
    Backoff { attempt: u32, delay: Duration },
    Succeeded,
    Failed,
    Exhausted,
}

impl FetchState {
    /// Applies an event; events that do not apply leave the state unchanged
    pub fn next(self, event: FetchEvent) -> Self {
        match (self, event) {
            (Self::Ready, FetchEvent::CooldownElapsed) => Self::Attempting { attempt: 0 },
            (Self::Attempting { .. }, FetchEvent::Completed(AttemptOutcome::Success)) => {
                Self::Succeeded
            }
            (Self::Attempting { .. }, FetchEvent::Completed(AttemptOutcome::HttpError)) => {
                Self::Failed
            }
            (Self::Attempting { attempt }, FetchEvent::Completed(AttemptOutcome::Challenged)) => {
                Self::Backoff {
                    attempt,
                    delay: backoff_delay(attempt),
                }
            }
            (Self::Backoff { attempt, .. }, FetchEvent::DelayElapsed) => {
                if attempt + 1 < MAX_ATTEMPTS {
                    Self::Attempting {
                        attempt: attempt + 1,
                    }
                } else {
                    Self::Exhausted
                }
            }
            (state, _) => state,
        }
    }

    /// Whether no further events are expected
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Exhausted)
    }
}

/// Delay applied after the given (zero-based) challenged attempt
pub fn backoff_delay(attempt: u32) -> Duration {
    let last = RETRY_DELAYS[RETRY_DELAYS.len() - 1];
    RETRY_DELAYS
        .get(attempt as usize)
        .copied()
        .unwrap_or(last)
}

/// Issues requests with challenge detection, shared cooldown and retry
#[derive(Clone)]
pub struct ResilientFetcher {
    transport: Arc<dyn Transport>,
    headers: HeaderMap,
    cooldown: Cooldown,
    status: StatusSink,
}

impl fmt::Debug for ResilientFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResilientFetcher")
            .field("cooldown", &self.cooldown)
            .finish_non_exhaustive()
    }
}

impl ResilientFetcher {
    /// Creates a fetcher that sends `headers` on every request
    pub fn new(
        transport: Arc<dyn Transport>,
        headers: HeaderMap,
        cooldown: Cooldown,
        status: StatusSink,
    ) -> Self {
        Self {
            transport,
            headers,
            cooldown,
            status,
        }
    }

    /// Handle to the shared cooldown this fetcher honours
    pub fn cooldown(&self) -> &Cooldown {
        &self.cooldown
    }

    /// Publishes a status message through the injected sink
    pub fn notify(&self, message: impl Into<String>) {
        self.status.notify(message);
    }

    /// Fetches `url` and parses the body as JSON
    ///
    /// # Returns
    /// * `Ok(Value)` - Parsed body of the first 2xx, non-challenge response
    /// * `Err(ApiError::ChallengeExhausted)` - Every attempt hit the challenge page
    /// * `Err(ApiError::Http)` - A non-2xx response that is not a challenge
    /// * `Err(ApiError::Request)` - The request could not be sent
    pub async fn fetch_json(&self, url: &str) -> Result<Value, ApiError> {
        let mut state = FetchState::Ready;
        let mut last_response: Option<RawResponse> = None;

        loop {
            state = match state {
                FetchState::Ready => {
                    self.wait_for_cooldown().await;
                    state.next(FetchEvent::CooldownElapsed)
                }
                FetchState::Attempting { attempt } => {
                    debug!(url, attempt = attempt + 1, "Issuing request");
                    let response = self.transport.get(url, &self.headers).await?;
                    let outcome = AttemptOutcome::classify(&response);

                    if outcome == AttemptOutcome::Challenged {
                        self.cooldown.trigger(CHALLENGE_COOLDOWN);
                    } else {
                        self.cooldown.clear();
                    }

                    last_response = Some(response);
                    state.next(FetchEvent::Completed(outcome))
                }
                FetchState::Backoff { attempt, delay } => {
                    info!(
                        attempt = attempt + 1,
                        delay_secs = delay.as_secs(),
                        "Challenge detected, backing off"
                    );
                    self.status.notify(format!(
                        "CAPTCHA protection on attempt {}/{}, waiting {}s...",
                        attempt + 1,
                        MAX_ATTEMPTS,
                        delay.as_secs()
                    ));
                    tokio::time::sleep(delay).await;
                    state.next(FetchEvent::DelayElapsed)
                }
                FetchState::Succeeded => {
                    let body = last_response.map(|r| r.body).unwrap_or_default();
                    return Ok(serde_json::from_str(&body)?);
                }
                FetchState::Failed => {
                    let response = last_response.unwrap_or_else(|| RawResponse::new(0, ""));
                    debug!(status = response.status, "Request failed");
                    return Err(ApiError::http(response.status, &response.body));
                }
                FetchState::Exhausted => {
                    warn!(url, attempts = MAX_ATTEMPTS, "Challenge retries exhausted");
                    return Err(ApiError::ChallengeExhausted {
                        attempts: MAX_ATTEMPTS,
                    });
                }
            };
        }
    }

    /// Suspends until the shared cooldown has elapsed
    async fn wait_for_cooldown(&self) {
        let Some(remaining) = self.cooldown.remaining() else {
            return;
        };

        let secs = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
        info!(remaining_secs = secs, "Waiting for challenge cooldown");
        self.status
            .notify(format!("CAPTCHA cooldown, {}s remaining...", secs));
        tokio::time::sleep(remaining).await;
    }
}
