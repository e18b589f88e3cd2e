//! Remote sync for follows and channel subscriptions

use std::sync::Arc;

use async_trait::async_trait;
use reel_core::{
    CounterSnapshot, DomainError, FollowCollaborator, FollowFilter, NewFollow, NewSubscription,
    RecordId, RelationshipKind, RelationshipState, SubscriptionCollaborator, SubscriptionFilter,
    UserId,
};
use tracing::{debug, info, instrument};

use super::RemoteSync;
use crate::error::SyncFailure;
use crate::store::Projection;

/// Record store backing a relationship kind
#[derive(Clone)]
pub enum RelationshipBackend {
    Follow(Arc<dyn FollowCollaborator>),
    Subscription(Arc<dyn SubscriptionCollaborator>),
}

impl RelationshipBackend {
    pub fn kind(&self) -> RelationshipKind {
        match self {
            Self::Follow(_) => RelationshipKind::Follow,
            Self::Subscription(_) => RelationshipKind::Subscription,
        }
    }

    /// Ids of records linking follower to followed
    async fn existing(&self, follower: &UserId, followed: &UserId) -> Result<Vec<RecordId>, DomainError> {
        Ok(match self {
            Self::Follow(follows) => follows
                .filter(&FollowFilter::pair(follower, followed))
                .await?
                .into_iter()
                .map(|r| r.id)
                .collect(),
            Self::Subscription(subs) => subs
                .filter(&SubscriptionFilter::pair(follower, followed))
                .await?
                .into_iter()
                .map(|r| r.id)
                .collect(),
        })
    }

    async fn create(&self, follower: &UserId, followed: &UserId) -> Result<RecordId, DomainError> {
        Ok(match self {
            Self::Follow(follows) => {
                follows
                    .create(NewFollow {
                        follower_id: follower.clone(),
                        following_id: followed.clone(),
                    })
                    .await?
                    .id
            }
            Self::Subscription(subs) => {
                subs.create(NewSubscription::free(follower.clone(), followed.clone()))
                    .await?
                    .id
            }
        })
    }

    async fn delete(&self, id: &RecordId) -> Result<(), DomainError> {
        match self {
            Self::Follow(follows) => follows.delete(id).await,
            Self::Subscription(subs) => subs.delete(id).await,
        }
    }

    /// Follower ids of `followed`
    async fn followers(&self, followed: &UserId) -> Result<Vec<UserId>, DomainError> {
        Ok(match self {
            Self::Follow(follows) => follows
                .filter(&FollowFilter::followers_of(followed))
                .await?
                .into_iter()
                .map(|r| r.follower_id)
                .collect(),
            Self::Subscription(subs) => subs
                .filter(&SubscriptionFilter::subscribers_of(followed))
                .await?
                .into_iter()
                .map(|r| r.subscriber_id)
                .collect(),
        })
    }
}

/// Syncs one user's follow (or subscription) relationship to a creator
#[derive(Clone)]
pub struct RelationshipSync {
    followed_id: UserId,
    backend: RelationshipBackend,
}

impl RelationshipSync {
    pub fn new(followed_id: UserId, backend: RelationshipBackend) -> Self {
        Self {
            followed_id,
            backend,
        }
    }

    pub fn kind(&self) -> RelationshipKind {
        self.backend.kind()
    }

    async fn write(&self, desired: &RelationshipState) -> Result<(), SyncFailure> {
        let existing = self
            .backend
            .existing(&desired.follower_id, &desired.followed_id)
            .await?;

        match (desired.active, existing.split_first()) {
            (true, None) => {
                let id = self
                    .backend
                    .create(&desired.follower_id, &desired.followed_id)
                    .await?;
                info!(kind = ?desired.kind, record_id = %id, followed_id = %desired.followed_id, "Relationship created");
            }
            (true, Some((_, duplicates))) => {
                for id in duplicates {
                    self.backend.delete(id).await?;
                }
                debug!(kind = ?desired.kind, followed_id = %desired.followed_id, "Relationship already active");
            }
            (false, Some(_)) => {
                for id in &existing {
                    self.backend.delete(id).await?;
                }
                info!(kind = ?desired.kind, followed_id = %desired.followed_id, "Relationship removed");
            }
            (false, None) => {
                debug!(kind = ?desired.kind, followed_id = %desired.followed_id, "Relationship already inactive");
            }
        }

        Ok(())
    }
}

#[async_trait]
impl RemoteSync<bool> for RelationshipSync {
    fn validate(&self, actor: &UserId) -> Result<(), DomainError> {
        if *actor == self.followed_id {
            return Err(DomainError::SelfRelationship);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(followed_id = %self.followed_id))]
    async fn sync(&self, actor: &UserId, desired: &bool) -> Result<(), SyncFailure> {
        let state = RelationshipState::new(
            self.kind(),
            actor.clone(),
            self.followed_id.clone(),
            *desired,
        );
        self.write(&state).await
    }

    #[instrument(skip(self), fields(followed_id = %self.followed_id))]
    async fn fetch(&self, actor: Option<&UserId>) -> Result<Projection<bool>, SyncFailure> {
        let followers = self.backend.followers(&self.followed_id).await?;
        let active = actor.is_some_and(|actor| followers.contains(actor));

        Ok(Projection::new(
            active,
            CounterSnapshot::followers(followers.len() as u64),
        ))
    }
}
