//! Change notification

use tokio::sync::watch;

/// A monotonically increasing revision counter.
///
/// Every component of a table bumps the shared revision after mutating
/// state, so a renderer can wait on [`watch::Receiver::changed`] and re-derive
/// its view.
#[derive(Debug)]
pub struct Revision {
    tx: watch::Sender<u64>,
}

impl Revision {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx }
    }

    /// Marks the state as changed.
    pub fn bump(&self) {
        self.tx.send_modify(|revision| *revision = revision.wrapping_add(1));
    }

    /// Returns a receiver notified on every bump.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }
}

impl Default for Revision {
    fn default() -> Self {
        Self::new()
    }
}
