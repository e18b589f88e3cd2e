//! Subject handle - the observer and `invoke` surface for one subject

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reel_core::{Action, DomainError, SubjectKey, UserId};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use super::lane::{LaneTicket, SyncLane};
use super::rollback::RollbackHandler;
use super::state::SubjectState;
use crate::error::SyncFailure;
use crate::notice::NoticeBus;
use crate::remote::RemoteSync;
use crate::store::{LocalStateStore, Projection, Snapshot};

const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(10);

/// How a mutation ended
#[derive(Debug, Clone)]
pub enum MutationOutcome {
    /// The backend accepted it and it is still the latest intent
    Confirmed,
    /// The backend rejected it; the pre-mutation state was restored
    RolledBack(SyncFailure),
    /// A newer mutation started before this one resolved; its result was ignored
    Superseded,
    /// The sync task did not run to completion (runtime shut down)
    Aborted,
}

impl MutationOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed)
    }

    pub fn is_rolled_back(&self) -> bool {
        matches!(self, Self::RolledBack(_))
    }
}

/// A mutation that has been applied locally and is syncing in the background
#[derive(Debug)]
pub struct PendingMutation<S> {
    seq: u64,
    optimistic: Projection<S>,
    join: JoinHandle<MutationOutcome>,
}

impl<S> PendingMutation<S> {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Projection shown right after the optimistic apply
    pub fn optimistic(&self) -> &Projection<S> {
        &self.optimistic
    }

    /// Wait for the remote call to resolve
    ///
    /// Dropping the pending mutation instead does not cancel the sync.
    pub async fn outcome(self) -> MutationOutcome {
        match self.join.await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(seq = self.seq, error = %err, "Sync task aborted");
                MutationOutcome::Aborted
            }
        }
    }
}

/// Decrements the store's in-flight count however the sync task ends
struct SettleGuard<'a, S>
where
    S: Clone + PartialEq + Send + Sync,
{
    store: &'a LocalStateStore<S>,
}

impl<S> Drop for SettleGuard<'_, S>
where
    S: Clone + PartialEq + Send + Sync,
{
    fn drop(&mut self) {
        self.store.settle();
    }
}

/// One subject (a video's reaction, a creator's follow) as seen by one actor
pub struct SubjectHandle<S: SubjectState> {
    key: SubjectKey,
    actor: Option<UserId>,
    store: LocalStateStore<S>,
    remote: Arc<dyn RemoteSync<S>>,
    rollback: RollbackHandler,
    lane: SyncLane,
    timeout: Duration,
    closed: Arc<AtomicBool>,
    released: AtomicBool,
}

impl<S: SubjectState> SubjectHandle<S> {
    pub fn new(
        key: SubjectKey,
        actor: Option<UserId>,
        remote: Arc<dyn RemoteSync<S>>,
        notices: NoticeBus,
    ) -> Self {
        Self {
            key,
            actor,
            store: LocalStateStore::new(Projection::default()),
            remote,
            rollback: RollbackHandler::new(notices),
            lane: SyncLane::default(),
            timeout: DEFAULT_REMOTE_TIMEOUT,
            closed: Arc::new(AtomicBool::new(false)),
            released: AtomicBool::new(false),
        }
    }

    /// Start from a known projection instead of the empty one
    pub fn with_initial(mut self, initial: Projection<S>) -> Self {
        self.store = LocalStateStore::new(initial);
        self
    }

    /// Bound every remote call
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Share a shutdown flag with the owning context
    pub fn with_closed_flag(mut self, closed: Arc<AtomicBool>) -> Self {
        self.closed = closed;
        self
    }

    /// Stop accepting mutations on this handle
    ///
    /// Called when the owner drops it from its registry, so a caller still
    /// holding it cannot grow a second store next to the new handle. Syncs
    /// already in flight still resolve.
    pub fn release(&self) {
        self.released.store(true, Ordering::Release);
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    pub fn key(&self) -> &SubjectKey {
        &self.key
    }

    pub fn actor(&self) -> Option<&UserId> {
        self.actor.as_ref()
    }

    pub fn current(&self) -> Projection<S> {
        self.store.current()
    }

    /// Observe the projection; fires on every change
    pub fn subscribe(&self) -> watch::Receiver<Projection<S>> {
        self.store.subscribe()
    }

    /// Check if any mutation is still waiting on the backend
    pub fn is_settled(&self) -> bool {
        self.store.version().is_settled()
    }

    /// Replace the projection with one read elsewhere (a page load)
    ///
    /// Ignored while a mutation is in flight.
    pub fn seed(&self, projection: Projection<S>) -> bool {
        let observed = self.store.version();
        self.store.reconcile_if_settled(observed, projection)
    }

    /// Read the authoritative projection from the backend
    ///
    /// The read is applied only when no mutation started while it was in
    /// flight. Returns the projection shown afterwards.
    #[instrument(skip(self), fields(subject = %self.key))]
    pub async fn load(&self) -> Result<Projection<S>, DomainError> {
        let observed = self.store.version();

        let fresh = tokio::time::timeout(self.timeout, self.remote.fetch(self.actor.as_ref()))
            .await
            .map_err(|_| DomainError::Timeout(self.timeout))?
            .map_err(SyncFailure::into_cause)?;

        if self.store.reconcile_if_settled(observed, fresh) {
            debug!("Projection loaded");
        }
        Ok(self.store.current())
    }

    /// Apply `action` locally now and sync it in the background
    ///
    /// Validation happens before any local change; a rejected action leaves
    /// the projection untouched. Must be called within a tokio runtime.
    pub fn invoke(self: &Arc<Self>, action: Action) -> Result<PendingMutation<S>, DomainError> {
        let runtime = Handle::try_current()
            .map_err(|e| DomainError::InternalError(format!("No async runtime: {e}")))?;

        if self.closed.load(Ordering::Acquire) {
            return Err(DomainError::ContextClosed);
        }
        if self.is_released() {
            return Err(DomainError::HandleReleased);
        }

        let actor = self.actor.clone().ok_or(DomainError::Unauthenticated)?;
        self.remote.validate(&actor)?;

        let ((snapshot, optimistic), ticket) = self
            .lane
            .enqueue(|| self.store.transition(|state| state.dispatch(action)))
            .ok_or(DomainError::UnsupportedAction {
                action,
                kind: self.key.kind,
            })?;

        let seq = snapshot.seq();
        debug!(
            subject = %self.key,
            %action,
            seq,
            state = ?optimistic.state,
            "Optimistic mutation applied"
        );

        let handle = Arc::clone(self);
        let desired = optimistic.state.clone();
        let join = runtime.spawn(async move { handle.run_sync(actor, desired, snapshot, ticket).await });

        Ok(PendingMutation {
            seq,
            optimistic,
            join,
        })
    }

    async fn run_sync(
        self: Arc<Self>,
        actor: UserId,
        desired: S,
        snapshot: Snapshot<S>,
        mut ticket: LaneTicket,
    ) -> MutationOutcome {
        let _settle = SettleGuard { store: &self.store };
        let seq = snapshot.seq();

        ticket.wait_turn().await;

        let result = match tokio::time::timeout(self.timeout, self.remote.sync(&actor, &desired)).await {
            Ok(result) => result,
            Err(_) => Err(SyncFailure::new(DomainError::Timeout(self.timeout))),
        };
        // Recorded before the next call on this subject may start
        if result.is_ok() {
            self.store.confirm(&snapshot);
        }
        drop(ticket);

        match result {
            Ok(()) if self.store.is_current(seq) => {
                debug!(subject = %self.key, seq, "Mutation confirmed");
                MutationOutcome::Confirmed
            }
            Ok(()) => {
                debug!(subject = %self.key, seq, "Mutation confirmed but superseded");
                MutationOutcome::Superseded
            }
            Err(failure) => {
                if self.rollback.rollback(&self.key, &self.store, &snapshot, &failure) {
                    MutationOutcome::RolledBack(failure)
                } else {
                    MutationOutcome::Superseded
                }
            }
        }
    }
}

impl<S: SubjectState> std::fmt::Debug for SubjectHandle<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubjectHandle")
            .field("key", &self.key)
            .field("actor", &self.actor)
            .field("projection", &self.store.current())
            .finish_non_exhaustive()
    }
}
