//! Shared cooldown after a detected challenge
//!
//! The anti-bot system blocks at the network level, so a challenge seen by one
//! request must hold back every other request too. A [`Cooldown`] is a cheap
//! cloneable handle to one shared deadline; every client created from the same
//! context sees the same value.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

/// How long requests are held back after a challenge
pub const CHALLENGE_COOLDOWN: Duration = Duration::from_secs(60);

/// Handle to the shared `cooldown_until` deadline
///
/// Writes are plain stores (last writer wins); the window only ever needs to
/// be at least long enough.
#[derive(Debug, Clone, Default)]
pub struct Cooldown {
    until: Arc<Mutex<Option<Instant>>>,
}

impl Cooldown {
    /// Creates an inactive cooldown
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts (or restarts) the cooldown window from now
    pub fn trigger(&self, duration: Duration) {
        self.set(Some(Instant::now() + duration));
    }

    /// Ends the cooldown immediately
    pub fn clear(&self) {
        self.set(None);
    }

    /// Time left before requests may be issued again
    ///
    /// Returns `None` when the cooldown is inactive or already elapsed.
    pub fn remaining(&self) -> Option<Duration> {
        let until = (*self.until.lock().unwrap_or_else(PoisonError::into_inner))?;
        let remaining = until.saturating_duration_since(Instant::now());
        (!remaining.is_zero()).then_some(remaining)
    }

    /// Whether requests are currently held back
    pub fn is_active(&self) -> bool {
        self.remaining().is_some()
    }

    fn set(&self, value: Option<Instant>) {
        *self.until.lock().unwrap_or_else(PoisonError::into_inner) = value;
    }
}
