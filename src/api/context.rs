//! Process-scoped state shared by every API client

use std::sync::Arc;

use super::cooldown::Cooldown;
use super::status::StatusSink;
use super::transport::{HttpTransport, Transport};

/// The pieces all clients in a process share
///
/// Clients built from the same context share one transport, one cooldown and
/// one status subscriber. Tests build their own context to stay isolated.
#[derive(Clone)]
pub struct ApiContext {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) cooldown: Cooldown,
    pub(crate) status: StatusSink,
}

impl ApiContext {
    /// Creates a context that talks to the real upstream over HTTPS
    pub fn new(status: StatusSink) -> Self {
        Self::with_transport(Arc::new(HttpTransport::new()), status)
    }

    /// Creates a context with a custom transport
    pub fn with_transport(transport: Arc<dyn Transport>, status: StatusSink) -> Self {
        Self {
            transport,
            cooldown: Cooldown::new(),
            status,
        }
    }

    /// Handle to the shared cooldown
    pub fn cooldown(&self) -> &Cooldown {
        &self.cooldown
    }
}

impl std::fmt::Debug for ApiContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiContext")
            .field("cooldown", &self.cooldown)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}
