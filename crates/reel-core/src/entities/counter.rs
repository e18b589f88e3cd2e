//! Counters - cached like/dislike/follower counts and the deltas applied to them

use serde::{Deserialize, Serialize};

use super::reaction::Reaction;
use crate::value_objects::VideoId;

/// Client-side cached counts for one subject
///
/// Superseded whenever a fresh authoritative read arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CounterSnapshot {
    pub likes: u64,
    pub dislikes: u64,
    pub followers: u64,
}

impl CounterSnapshot {
    pub fn reactions(likes: u64, dislikes: u64) -> Self {
        Self {
            likes,
            dislikes,
            followers: 0,
        }
    }

    pub fn followers(followers: u64) -> Self {
        Self {
            followers,
            ..Self::default()
        }
    }

    /// Apply a delta, saturating every count at zero
    #[must_use]
    pub fn apply(self, delta: CounterDelta) -> Self {
        Self {
            likes: self.likes.saturating_add_signed(delta.likes),
            dislikes: self.dislikes.saturating_add_signed(delta.dislikes),
            followers: self.followers.saturating_add_signed(delta.followers),
        }
    }
}

/// Signed change to a [`CounterSnapshot`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CounterDelta {
    pub likes: i64,
    pub dislikes: i64,
    pub followers: i64,
}

impl CounterDelta {
    pub const ZERO: Self = Self {
        likes: 0,
        dislikes: 0,
        followers: 0,
    };

    pub fn followers(n: i64) -> Self {
        Self {
            followers: n,
            ..Self::ZERO
        }
    }

    /// Contribution of a single reaction to the counts (`sign` is +1 or -1)
    pub fn reaction(reaction: Reaction, sign: i64) -> Self {
        match reaction {
            Reaction::None => Self::ZERO,
            Reaction::Like => Self {
                likes: sign,
                ..Self::ZERO
            },
            Reaction::Dislike => Self {
                dislikes: sign,
                ..Self::ZERO
            },
        }
    }

    /// Delta that moves counts from `previous` to `next` in one step
    pub fn between(previous: Reaction, next: Reaction) -> Self {
        if previous == next {
            return Self::ZERO;
        }
        Self::reaction(previous, -1).plus(Self::reaction(next, 1))
    }

    #[must_use]
    pub fn plus(self, other: Self) -> Self {
        Self {
            likes: self.likes + other.likes,
            dislikes: self.dislikes + other.dislikes,
            followers: self.followers + other.followers,
        }
    }

    #[must_use]
    pub fn inverse(self) -> Self {
        Self {
            likes: -self.likes,
            dislikes: -self.dislikes,
            followers: -self.followers,
        }
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

/// Authoritative like/dislike counts stored on a video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoCounters {
    pub video_id: VideoId,
    pub likes: u64,
    pub dislikes: u64,
}

impl VideoCounters {
    pub fn new(video_id: VideoId, likes: u64, dislikes: u64) -> Self {
        Self {
            video_id,
            likes,
            dislikes,
        }
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot::reactions(self.likes, self.dislikes)
    }
}
