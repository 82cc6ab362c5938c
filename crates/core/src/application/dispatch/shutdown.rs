// Dispatch Shutdown Token

use tokio::sync::watch;

/// Termination request observed by the dispatch loop
#[derive(Clone)]
pub struct ShutdownToken {
    rx: watch::Receiver<bool>,
}

impl ShutdownToken {
    /// Check if shutdown was requested
    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait for shutdown signal
    ///
    /// Resolves immediately if shutdown was already requested. Never resolves
    /// if the sender is dropped without requesting shutdown.
    pub async fn wait(&mut self) {
        if self.rx.wait_for(|requested| *requested).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Shutdown sender
pub struct ShutdownSender {
    tx: watch::Sender<bool>,
}

impl ShutdownSender {
    /// Ask the dispatch loop to stop taking new paragraphs
    pub fn shutdown(&self) {
        let _ = self.tx.send(true);
    }
}

/// Create a shutdown channel
pub fn shutdown_channel() -> (ShutdownSender, ShutdownToken) {
    let (tx, rx) = watch::channel(false);
    (ShutdownSender { tx }, ShutdownToken { rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_pending, assert_ready, task};

    #[test]
    fn test_shutdown_wakes_waiter() {
        let (tx, mut token) = shutdown_channel();
        assert!(!token.is_shutdown());

        let mut wait = task::spawn(token.wait());
        assert_pending!(wait.poll());

        tx.shutdown();
        assert!(wait.is_woken());
        assert_ready!(wait.poll());
    }

    #[test]
    fn test_wait_after_shutdown_resolves_immediately() {
        let (tx, mut token) = shutdown_channel();
        tx.shutdown();
        drop(tx);

        assert!(token.is_shutdown());
        assert_ready!(task::spawn(token.wait()).poll());
    }

    #[test]
    fn test_dropped_sender_never_resolves() {
        let (tx, mut token) = shutdown_channel();

        let mut wait = task::spawn(token.wait());
        assert_pending!(wait.poll());
        drop(tx);
        assert_pending!(wait.poll());
        drop(wait);

        assert!(!token.is_shutdown());
    }
}
