//! Per-subject ordering of remote calls
//!
//! Each mutation takes a ticket chained behind the previous one. A ticket's
//! remote call starts only after the previous ticket has been dropped, so
//! backend writes land in the order the user made them.

use parking_lot::Mutex;
use tokio::sync::oneshot;

#[derive(Debug, Default)]
pub(crate) struct SyncLane {
    tail: Mutex<Option<oneshot::Receiver<()>>>,
}

impl SyncLane {
    /// Run `apply` and, if it produced something, queue a ticket for it
    ///
    /// `apply` runs under the lane lock so ticket order matches the order in
    /// which local changes were applied.
    pub(crate) fn enqueue<T, F>(&self, apply: F) -> Option<(T, LaneTicket)>
    where
        F: FnOnce() -> Option<T>,
    {
        let mut tail = self.tail.lock();
        let applied = apply()?;

        let (done, next) = oneshot::channel();
        let ticket = LaneTicket {
            previous: tail.replace(next),
            _done: done,
        };
        Some((applied, ticket))
    }
}

/// Place in a subject's lane; dropping it lets the next ticket through
#[derive(Debug)]
pub(crate) struct LaneTicket {
    previous: Option<oneshot::Receiver<()>>,
    _done: oneshot::Sender<()>,
}

impl LaneTicket {
    /// Wait until every earlier ticket is dropped
    pub(crate) async fn wait_turn(&mut self) {
        if let Some(previous) = self.previous.as_mut() {
            // Err means the sender was dropped, which is the signal
            let _ = previous.await;
            self.previous = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_first_ticket_goes_immediately() {
        let lane = SyncLane::default();
        let (_, mut ticket) = lane.enqueue(|| Some(())).unwrap();
        tokio::time::timeout(Duration::from_millis(50), ticket.wait_turn())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_second_ticket_waits_for_first() {
        let lane = SyncLane::default();
        let (_, first) = lane.enqueue(|| Some(1)).unwrap();
        let (_, mut second) = lane.enqueue(|| Some(2)).unwrap();

        let waited = tokio::time::timeout(Duration::from_millis(20), second.wait_turn()).await;
        assert!(waited.is_err());

        drop(first);
        tokio::time::timeout(Duration::from_millis(50), second.wait_turn())
            .await
            .unwrap();
    }

    #[test]
    fn test_declined_apply_takes_no_ticket() {
        let lane = SyncLane::default();
        assert!(lane.enqueue(|| None::<()>).is_none());
        assert!(lane.tail.lock().is_none());
    }
}
