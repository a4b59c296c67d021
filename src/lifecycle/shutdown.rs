//! Shutdown coordination.

use tokio::sync::broadcast;

/// Broadcasts one shutdown notice to every subscribed task.
#[derive(Debug, Clone)]
pub struct Shutdown {
    notify: broadcast::Sender<()>,
}

/// One task's view of the shutdown notice.
#[derive(Debug)]
pub struct ShutdownSignal {
    rx: broadcast::Receiver<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (notify, _) = broadcast::channel(1);
        Self { notify }
    }

    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.notify.subscribe(),
        }
    }

    /// Notify every subscriber. Subscribers created afterwards are not
    /// notified.
    pub fn trigger(&self) {
        let _ = self.notify.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    /// Resolve once shutdown is triggered or every `Shutdown` handle is
    /// dropped.
    pub async fn recv(mut self) {
        let _ = self.rx.recv().await;
    }
}
