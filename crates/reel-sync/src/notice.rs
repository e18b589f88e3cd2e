//! Notice bus - fan-out of user notices to every UI listener

use reel_core::Notice;
use tokio::sync::broadcast;
use tracing::debug;

/// Broadcast channel carrying [`Notice`]s
#[derive(Debug, Clone)]
pub struct NoticeBus {
    tx: broadcast::Sender<Notice>,
}

impl NoticeBus {
    /// Create a bus buffering up to `capacity` notices per listener
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Listen for notices published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }

    /// Publish a notice; returns how many listeners received it
    ///
    /// Never fails: with nobody listening the notice is dropped.
    pub fn publish(&self, notice: Notice) -> usize {
        match self.tx.send(notice) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(notice)) => {
                debug!(subject = %notice.subject, "Notice dropped, no listeners");
                0
            }
        }
    }
}

impl Default for NoticeBus {
    fn default() -> Self {
        Self::new(64)
    }
}
