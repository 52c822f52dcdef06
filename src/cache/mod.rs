//! Cache module for memoizing API responses
//!
//! This module provides an in-memory keyed store with a fixed time-to-live.
//! Nothing is persisted: the cache lives as long as the client that owns it.

mod ttl;

pub use ttl::{TtlCache, CACHE_TTL};
