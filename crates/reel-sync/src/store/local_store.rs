//! Local state store
//!
//! Holds the current projection of one subject for one actor. Every optimistic
//! apply bumps a monotonically increasing sequence number; results of remote
//! calls are only honored while their sequence number is still the latest.
//! Alongside the shown projection the store keeps the last one the backend is
//! known to hold, which is what a rollback goes back to.
//! All operations are synchronous and never await while holding the lock.

use parking_lot::Mutex;
use reel_core::{CounterDelta, CounterSnapshot, Transition};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

/// State plus counts, as rendered by the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Projection<S> {
    pub state: S,
    pub counts: CounterSnapshot,
}

impl<S> Projection<S> {
    pub fn new(state: S, counts: CounterSnapshot) -> Self {
        Self { state, counts }
    }
}

/// Projection captured right before an optimistic apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<S> {
    previous: Projection<S>,
    applied: Projection<S>,
    seq: u64,
}

impl<S> Snapshot<S> {
    /// Projection shown before the mutation
    pub fn projection(&self) -> &Projection<S> {
        &self.previous
    }

    /// Projection the mutation put in place
    pub fn applied(&self) -> &Projection<S> {
        &self.applied
    }

    /// Sequence number of the mutation that took this snapshot
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Sequence number and in-flight count at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreVersion {
    pub seq: u64,
    pub pending: usize,
}

impl StoreVersion {
    /// No mutation is waiting on the backend
    pub fn is_settled(&self) -> bool {
        self.pending == 0
    }
}

#[derive(Debug)]
struct StoreInner<S> {
    projection: Projection<S>,
    /// Last projection the backend confirmed or a settled read returned
    confirmed: Projection<S>,
    seq: u64,
    pending: usize,
}

/// Single-writer projection store for one subject
#[derive(Debug)]
pub struct LocalStateStore<S> {
    inner: Mutex<StoreInner<S>>,
    tx: watch::Sender<Projection<S>>,
}

impl<S> LocalStateStore<S>
where
    S: Clone + PartialEq + Send + Sync,
{
    pub fn new(initial: Projection<S>) -> Self {
        let (tx, _) = watch::channel(initial.clone());
        Self {
            inner: Mutex::new(StoreInner {
                confirmed: initial.clone(),
                projection: initial,
                seq: 0,
                pending: 0,
            }),
            tx,
        }
    }

    /// Current projection
    pub fn current(&self) -> Projection<S> {
        self.inner.lock().projection.clone()
    }

    pub fn version(&self) -> StoreVersion {
        let inner = self.inner.lock();
        StoreVersion {
            seq: inner.seq,
            pending: inner.pending,
        }
    }

    /// Watch the projection; the receiver sees every change
    pub fn subscribe(&self) -> watch::Receiver<Projection<S>> {
        self.tx.subscribe()
    }

    /// Compute a transition from the current state and apply it atomically
    ///
    /// Returns `None` (and changes nothing) when `dispatch` declines the action.
    /// Otherwise returns the snapshot for rollback and the applied projection.
    /// The mutation counts as in flight until [`settle`](Self::settle).
    pub(crate) fn transition<F>(&self, dispatch: F) -> Option<(Snapshot<S>, Projection<S>)>
    where
        F: FnOnce(&S) -> Option<Transition<S>>,
    {
        let mut inner = self.inner.lock();
        let transition = dispatch(&inner.projection.state)?;
        let snapshot = self.apply_locked(&mut inner, transition.next, transition.delta);
        Some((snapshot, inner.projection.clone()))
    }

    fn apply_locked(&self, inner: &mut StoreInner<S>, next: S, delta: CounterDelta) -> Snapshot<S> {
        let previous = inner.projection.clone();
        inner.seq += 1;
        inner.pending += 1;
        inner.projection = Projection::new(next, previous.counts.apply(delta));
        self.publish(&inner.projection);

        debug!(seq = inner.seq, pending = inner.pending, "Optimistic state applied");

        Snapshot {
            previous,
            applied: inner.projection.clone(),
            seq: inner.seq,
        }
    }

    /// Record that the backend accepted the mutation that took `snapshot`
    ///
    /// Remote calls of one subject resolve in sequence order, so the latest
    /// confirmation is what the backend holds.
    pub(crate) fn confirm(&self, snapshot: &Snapshot<S>) {
        let mut inner = self.inner.lock();
        inner.confirmed = snapshot.applied.clone();
    }

    /// Last projection known to match the backend
    pub fn confirmed(&self) -> Projection<S> {
        self.inner.lock().confirmed.clone()
    }

    /// Roll the mutation that took `snapshot` back, unless a newer one started
    ///
    /// Goes back to the last confirmed projection. That is the snapshot itself
    /// when every earlier mutation went through, and something older when an
    /// earlier, superseded mutation failed too.
    pub fn rollback_if_current(&self, snapshot: &Snapshot<S>) -> bool {
        let mut inner = self.inner.lock();
        if inner.seq != snapshot.seq {
            return false;
        }
        inner.projection = inner.confirmed.clone();
        self.publish(&inner.projection);
        true
    }

    /// Check if `seq` is still the latest mutation
    pub fn is_current(&self, seq: u64) -> bool {
        self.inner.lock().seq == seq
    }

    /// Mark one in-flight mutation as finished
    pub(crate) fn settle(&self) {
        let mut inner = self.inner.lock();
        inner.pending = inner.pending.saturating_sub(1);
    }

    /// Replace the projection with an authoritative read
    pub fn reconcile(&self, fresh: Projection<S>) {
        let mut inner = self.inner.lock();
        inner.confirmed = fresh.clone();
        inner.projection = fresh;
        self.publish(&inner.projection);
    }

    /// Replace the projection with an authoritative read taken at `observed`
    ///
    /// Skipped when a mutation was in flight when the read started or has
    /// started since; the read may predate that write.
    pub fn reconcile_if_settled(&self, observed: StoreVersion, fresh: Projection<S>) -> bool {
        let mut inner = self.inner.lock();
        if !observed.is_settled() || inner.seq != observed.seq || inner.pending != 0 {
            debug!(
                observed_seq = observed.seq,
                seq = inner.seq,
                "Authoritative read discarded, newer local mutation"
            );
            return false;
        }
        inner.confirmed = fresh.clone();
        inner.projection = fresh;
        self.publish(&inner.projection);
        true
    }

    fn publish(&self, projection: &Projection<S>) {
        self.tx.send_if_modified(|shown| {
            if shown == projection {
                false
            } else {
                shown.clone_from(projection);
                true
            }
        });
    }
}
