//! Shutdown fan-out from the signal task to the server loop.

use tokio::sync::broadcast;

/// Sending side of graceful shutdown. Clones share one channel.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Hand out a signal for one server loop. Subscribe before triggering.
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal(self.tx.subscribe())
    }

    pub fn trigger(&self) {
        if self.tx.send(()).is_err() {
            tracing::debug!("Shutdown triggered with nothing listening");
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side, consumed by [`crate::HttpServer::run`].
#[derive(Debug)]
pub struct ShutdownSignal(broadcast::Receiver<()>);

impl ShutdownSignal {
    /// Resolve once shutdown is triggered or every [`Shutdown`] handle is gone.
    pub async fn wait(mut self) {
        let _ = self.0.recv().await;
    }
}
