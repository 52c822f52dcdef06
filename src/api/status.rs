//! Status notifications from the fetch layer
//!
//! The fetch layer never returns progress; it reports cooldown waits, retries
//! and cache hits through a single injected [`StatusSink`]. A UI can either
//! pass a callback or take the receiving end of a channel.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;

type Callback = dyn Fn(String) + Send + Sync;

/// Capability for publishing human-readable status messages
#[derive(Clone)]
pub struct StatusSink {
    callback: Arc<Callback>,
}

impl StatusSink {
    /// Wraps a callback invoked with every status message
    pub fn new(callback: impl Fn(String) + Send + Sync + 'static) -> Self {
        Self {
            callback: Arc::new(callback),
        }
    }

    /// A sink that discards every message
    pub fn silent() -> Self {
        Self::new(|_| {})
    }

    /// Creates a sink that forwards messages into an unbounded channel
    ///
    /// # Returns
    /// The sink and the receiver the caller should drain
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = Self::new(move |msg| {
            // Receiver dropped means nobody is listening any more
            let _ = tx.send(msg);
        });
        (sink, rx)
    }

    /// Publishes a message
    pub fn notify(&self, message: impl Into<String>) {
        (self.callback)(message.into());
    }
}

/// Runs `work` with a channel-backed sink whose messages go to `print`
///
/// Returns once `work` has finished and every message it queued has been
/// printed, whether it succeeded or not. `work` must not leak the sink into
/// its output, or the printer never finishes.
pub async fn with_printer<T, F, Fut>(print: impl Fn(String) + Send + 'static, work: F) -> T
where
    F: FnOnce(StatusSink) -> Fut,
    Fut: Future<Output = T>,
{
    let (sink, mut rx) = StatusSink::channel();
    let printer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            print(message);
        }
    });

    let result = work(sink).await;
    if let Err(e) = printer.await {
        tracing::warn!(error = %e, "Status printer stopped early");
    }
    result
}

impl Default for StatusSink {
    fn default() -> Self {
        Self::silent()
    }
}

impl fmt::Debug for StatusSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusSink").finish_non_exhaustive()
    }
}
