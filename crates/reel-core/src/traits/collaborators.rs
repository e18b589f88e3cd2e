//! Entity collaborator traits (ports)
//!
//! The backend owns every durable record. The client core only needs
//! filter/create/update/delete per record kind, and every operation may fail.
//! `create` and `update` return the authoritative post-write record.

use async_trait::async_trait;

use crate::entities::{
    CommentRecord, CounterDelta, FollowRecord, NewComment, NewFollow, NewReaction,
    NewSubscription, ReactionPatch, ReactionRecord, SubscriptionRecord, VideoCounters,
};
use crate::error::DomainError;
use crate::value_objects::{RecordId, UserId, VideoId};

/// Result type for collaborator operations
pub type CollabResult<T> = Result<T, DomainError>;

// ============================================================================
// Reactions
// ============================================================================

/// Filter for reaction records; `None` fields match anything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReactionFilter {
    pub video_id: Option<VideoId>,
    pub user_id: Option<UserId>,
}

impl ReactionFilter {
    /// Records of one user on one video
    pub fn by_actor(video_id: &VideoId, user_id: &UserId) -> Self {
        Self {
            video_id: Some(video_id.clone()),
            user_id: Some(user_id.clone()),
        }
    }

    pub fn matches(&self, record: &ReactionRecord) -> bool {
        self.video_id.as_ref().is_none_or(|id| *id == record.video_id)
            && self.user_id.as_ref().is_none_or(|id| *id == record.user_id)
    }
}

#[async_trait]
pub trait ReactionCollaborator: Send + Sync {
    /// Find reaction records matching the filter
    async fn filter(&self, filter: &ReactionFilter) -> CollabResult<Vec<ReactionRecord>>;

    /// Create a reaction record
    async fn create(&self, reaction: NewReaction) -> CollabResult<ReactionRecord>;

    /// Change the reaction on an existing record
    async fn update(&self, id: &RecordId, patch: ReactionPatch) -> CollabResult<ReactionRecord>;

    /// Delete a reaction record
    async fn delete(&self, id: &RecordId) -> CollabResult<()>;
}

// ============================================================================
// Follows
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FollowFilter {
    pub follower_id: Option<UserId>,
    pub following_id: Option<UserId>,
}

impl FollowFilter {
    pub fn pair(follower_id: &UserId, following_id: &UserId) -> Self {
        Self {
            follower_id: Some(follower_id.clone()),
            following_id: Some(following_id.clone()),
        }
    }

    /// All followers of a user
    pub fn followers_of(following_id: &UserId) -> Self {
        Self {
            follower_id: None,
            following_id: Some(following_id.clone()),
        }
    }

    pub fn matches(&self, record: &FollowRecord) -> bool {
        self.follower_id.as_ref().is_none_or(|id| *id == record.follower_id)
            && self.following_id.as_ref().is_none_or(|id| *id == record.following_id)
    }
}

#[async_trait]
pub trait FollowCollaborator: Send + Sync {
    async fn filter(&self, filter: &FollowFilter) -> CollabResult<Vec<FollowRecord>>;

    async fn create(&self, follow: NewFollow) -> CollabResult<FollowRecord>;

    async fn delete(&self, id: &RecordId) -> CollabResult<()>;
}

// ============================================================================
// Subscriptions
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionFilter {
    pub subscriber_id: Option<UserId>,
    pub channel_id: Option<UserId>,
}

impl SubscriptionFilter {
    pub fn pair(subscriber_id: &UserId, channel_id: &UserId) -> Self {
        Self {
            subscriber_id: Some(subscriber_id.clone()),
            channel_id: Some(channel_id.clone()),
        }
    }

    /// All subscribers of a channel
    pub fn subscribers_of(channel_id: &UserId) -> Self {
        Self {
            subscriber_id: None,
            channel_id: Some(channel_id.clone()),
        }
    }

    pub fn matches(&self, record: &SubscriptionRecord) -> bool {
        self.subscriber_id.as_ref().is_none_or(|id| *id == record.subscriber_id)
            && self.channel_id.as_ref().is_none_or(|id| *id == record.channel_id)
    }
}

#[async_trait]
pub trait SubscriptionCollaborator: Send + Sync {
    async fn filter(&self, filter: &SubscriptionFilter) -> CollabResult<Vec<SubscriptionRecord>>;

    async fn create(&self, subscription: NewSubscription) -> CollabResult<SubscriptionRecord>;

    async fn delete(&self, id: &RecordId) -> CollabResult<()>;
}

// ============================================================================
// Video counters (counter-bearing parent record)
// ============================================================================

#[async_trait]
pub trait VideoCounterCollaborator: Send + Sync {
    /// Read the authoritative counters of a video
    async fn get(&self, video_id: &VideoId) -> CollabResult<VideoCounters>;

    /// Apply a like/dislike delta and return the post-write counters
    async fn adjust(&self, video_id: &VideoId, delta: CounterDelta) -> CollabResult<VideoCounters>;
}

// ============================================================================
// Comments
// ============================================================================

#[async_trait]
pub trait CommentCollaborator: Send + Sync {
    /// Comments on a video, newest first
    async fn filter(&self, video_id: &VideoId) -> CollabResult<Vec<CommentRecord>>;

    async fn create(&self, comment: NewComment) -> CollabResult<CommentRecord>;
}
