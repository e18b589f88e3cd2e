//! Remote sync - translate a desired final state into backend writes
//!
//! Every implementation looks up the actor's existing record first and then
//! creates, updates or deletes it. Calling `sync` twice with the same desired
//! state leaves the backend unchanged the second time.

mod reaction;
mod relationship;

use async_trait::async_trait;
use reel_core::{DomainError, UserId};

use crate::error::SyncFailure;
use crate::store::Projection;

pub use reaction::ReactionSync;
pub use relationship::{RelationshipBackend, RelationshipSync};

/// Backend side of one subject
#[async_trait]
pub trait RemoteSync<S>: Send + Sync
where
    S: Send + Sync,
{
    /// Reject an actor before any local change is made
    fn validate(&self, _actor: &UserId) -> Result<(), DomainError> {
        Ok(())
    }

    /// Make the backend hold `desired` for `actor`
    async fn sync(&self, actor: &UserId, desired: &S) -> Result<(), SyncFailure>;

    /// Read the authoritative projection, as seen by `actor` if signed in
    async fn fetch(&self, actor: Option<&UserId>) -> Result<Projection<S>, SyncFailure>;
}
