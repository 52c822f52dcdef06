//! Resilient access to the Yemeksepeti API
//!
//! The upstream sits behind a bot-mitigation layer that answers with a 403
//! challenge page instead of data when it gets suspicious. This module detects
//! that page, holds every request back for a shared cooldown, retries with a
//! fixed backoff, caches results, and exposes typed data-access methods.

pub mod challenge;
pub mod client;
pub mod context;
pub mod cooldown;
pub mod error;
pub mod fetcher;
pub mod status;
pub mod transport;

pub use challenge::is_challenge;
pub use client::{ApiClient, RestaurantQuery, SearchHit};
pub use context::ApiContext;
pub use cooldown::Cooldown;
pub use error::ApiError;
pub use fetcher::{ResilientFetcher, MAX_ATTEMPTS, RETRY_DELAYS};
pub use status::{with_printer, StatusSink};
pub use transport::{HttpTransport, RawResponse, Transport};
