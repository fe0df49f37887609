// External crates
use tokio::sync::broadcast;

/// Process-wide shutdown fan-out, built on top of a broadcast channel.
///
/// Long-running subcommands clone the handle, each interested task calls
/// [`Shutdown::subscribe`] for its own receiver, and [`Shutdown::trigger`]
/// notifies everyone at once. `broadcast` fits here because receivers can be
/// added at runtime, every receiver observes the signal independently, and
/// the receiver integrates cleanly with `tokio::select!`.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    /// Creates a new shutdown channel. A small buffer is enough since only
    /// one message is ever sent.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    /// Returns a fresh receiver for one task.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Notifies all subscribers that the process is shutting down.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Blocks until [`Shutdown::trigger`] is called.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        let _ = rx.recv().await;
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
