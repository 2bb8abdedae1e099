//! Shutdown coordination for background tasks.

use tokio::sync::watch;

/// Coordinator for stopping long-running tasks.
///
/// Backed by a watch cell rather than a broadcast channel so that a task
/// subscribing *after* the trigger still observes the stop request.
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> ShutdownListener {
        ShutdownListener {
            rx: self.tx.subscribe(),
        }
    }

    /// Request all subscribed tasks to stop.
    pub fn trigger(&self) {
        let _ = self.tx.send(true);
    }

    /// Whether shutdown has been requested.
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side of the shutdown signal, held by a background task.
#[derive(Clone)]
pub struct ShutdownListener {
    rx: watch::Receiver<bool>,
}

impl ShutdownListener {
    /// Resolve once shutdown is requested. Returns immediately if it
    /// already was.
    pub async fn requested(&mut self) {
        // A closed sender means the coordinator is gone; treat as stop.
        let _ = self.rx.wait_for(|stop| *stop).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_late_subscriber_sees_trigger() {
        let shutdown = Shutdown::new();
        shutdown.trigger();

        let mut listener = shutdown.subscribe();
        // Must not hang
        listener.requested().await;
        assert!(shutdown.is_triggered());
    }

    #[tokio::test]
    async fn test_trigger_wakes_waiter() {
        let shutdown = Shutdown::new();
        let mut listener = shutdown.subscribe();

        let waiter = tokio::spawn(async move {
            listener.requested().await;
        });

        shutdown.trigger();
        waiter.await.unwrap();
    }
}
