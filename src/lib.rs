//! Yemeksepeti CLI Library
//!
//! Resilient access to the Yemeksepeti food-delivery API: challenge detection,
//! shared cooldown, retry with backoff, response caching and typed parsing,
//! plus a single-vendor cart.

pub mod api;
pub mod cache;
pub mod cart;
pub mod cli;
pub mod config;
pub mod data;
pub mod report;
