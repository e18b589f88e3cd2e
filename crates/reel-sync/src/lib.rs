//! # reel-sync
//!
//! Application layer: optimistic mutations with compensating rollback.
//!
//! A user action is dispatched to a next state, applied to the subject's local
//! store immediately, and synced to the backend in the background. A failed sync
//! restores the pre-mutation snapshot and raises a notice; a sync whose mutation
//! has since been superseded is ignored.

pub mod comments;
pub mod context;
pub mod error;
pub mod notice;
pub mod pipeline;
pub mod remote;
pub mod session;
pub mod store;

pub use comments::{CommentEntry, CommentOutcome, CommentThread, PendingComment};
pub use context::{SyncContext, SyncContextBuilder};
pub use error::SyncFailure;
pub use notice::NoticeBus;
pub use pipeline::{
    MutationOutcome, PendingMutation, RollbackHandler, SubjectHandle, SubjectState,
};
pub use remote::{ReactionSync, RelationshipBackend, RelationshipSync, RemoteSync};
pub use session::{Session, SessionUser};
pub use store::{LocalStateStore, Projection, Snapshot, StoreVersion};
