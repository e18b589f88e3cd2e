//! Relationship entities - follows and channel subscriptions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{RecordId, UserId};

/// Tier assigned to every subscription created from the client
pub const DEFAULT_SUBSCRIPTION_TIER: &str = "free";

/// Which relationship record backs a toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipKind {
    Follow,
    Subscription,
}

/// Projection of one follower's relationship with one user
///
/// Idempotent: following twice has no additional effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipState {
    pub kind: RelationshipKind,
    pub follower_id: UserId,
    pub followed_id: UserId,
    pub active: bool,
}

impl RelationshipState {
    pub fn new(kind: RelationshipKind, follower_id: UserId, followed_id: UserId, active: bool) -> Self {
        Self {
            kind,
            follower_id,
            followed_id,
            active,
        }
    }
}

/// Stored follow record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowRecord {
    pub id: RecordId,
    pub follower_id: UserId,
    pub following_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a follow record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFollow {
    pub follower_id: UserId,
    pub following_id: UserId,
}

/// Stored subscription record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    pub id: RecordId,
    pub subscriber_id: UserId,
    pub channel_id: UserId,
    pub tier: String,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a subscription record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubscription {
    pub subscriber_id: UserId,
    pub channel_id: UserId,
    pub tier: String,
}

impl NewSubscription {
    /// Subscription on the default tier
    pub fn free(subscriber_id: UserId, channel_id: UserId) -> Self {
        Self {
            subscriber_id,
            channel_id,
            tier: DEFAULT_SUBSCRIPTION_TIER.to_string(),
        }
    }
}
