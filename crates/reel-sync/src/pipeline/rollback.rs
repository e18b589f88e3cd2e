use reel_core::{Notice, SubjectKey};
use tracing::{debug, warn};

use crate::error::SyncFailure;
use crate::notice::NoticeBus;
use crate::store::{LocalStateStore, Snapshot};

/// Restores the pre-mutation snapshot after a failed sync and tells the user
#[derive(Debug, Clone)]
pub struct RollbackHandler {
    notices: NoticeBus,
}

impl RollbackHandler {
    pub fn new(notices: NoticeBus) -> Self {
        Self { notices }
    }

    /// Roll back the mutation that took `snapshot`
    ///
    /// Does nothing when a newer mutation has started on the subject; that
    /// mutation owns the state now. Otherwise restores the last confirmed
    /// projection and publishes exactly one notice. Returns whether a
    /// rollback happened.
    pub fn rollback<S>(
        &self,
        subject: &SubjectKey,
        store: &LocalStateStore<S>,
        snapshot: &Snapshot<S>,
        failure: &SyncFailure,
    ) -> bool
    where
        S: Clone + PartialEq + Send + Sync,
    {
        if !store.rollback_if_current(snapshot) {
            debug!(
                subject = %subject,
                seq = snapshot.seq(),
                error = %failure,
                "Stale sync failure ignored"
            );
            return false;
        }

        warn!(
            subject = %subject,
            seq = snapshot.seq(),
            code = failure.cause().code(),
            error = %failure,
            "Remote sync failed, optimistic change rolled back"
        );
        self.notices.publish(Notice::sync_failed(subject.clone()));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Projection;
    use reel_core::{CounterDelta, CounterSnapshot, DomainError, NoticeKind, Transition, UserId};

    fn apply(store: &LocalStateStore<bool>, next: bool, delta: CounterDelta) -> Snapshot<bool> {
        store
            .transition(|_| Some(Transition::new(next, delta)))
            .unwrap()
            .0
    }

    fn failure() -> SyncFailure {
        SyncFailure::from(DomainError::Network("connection reset".into()))
    }

    #[test]
    fn test_rollback_restores_and_notifies_once() {
        let bus = NoticeBus::new(8);
        let mut rx = bus.subscribe();
        let handler = RollbackHandler::new(bus);
        let subject = SubjectKey::follow(&UserId::new("creator"));

        let store = LocalStateStore::new(Projection::new(false, CounterSnapshot::followers(100)));
        let snapshot = apply(&store, true, CounterDelta::followers(1));

        assert!(handler.rollback(&subject, &store, &snapshot, &failure()));
        assert_eq!(store.current(), Projection::new(false, CounterSnapshot::followers(100)));

        let notice = rx.try_recv().unwrap();
        assert_eq!(notice.kind, NoticeKind::SyncFailed);
        assert_eq!(notice.subject, subject);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_superseded_failure_is_silent() {
        let bus = NoticeBus::new(8);
        let mut rx = bus.subscribe();
        let handler = RollbackHandler::new(bus);
        let subject = SubjectKey::follow(&UserId::new("creator"));

        let store = LocalStateStore::new(Projection::new(false, CounterSnapshot::followers(100)));
        let first = apply(&store, true, CounterDelta::followers(1));
        apply(&store, false, CounterDelta::followers(-1));

        assert!(!handler.rollback(&subject, &store, &first, &failure()));
        assert!(!store.current().state);
        assert!(rx.try_recv().is_err());
    }
}
