//! Subject keys - identify the entity a reaction or relationship targets

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{UserId, VideoId};

/// Kind of subject a local store slot tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectKind {
    /// Likes/dislikes on a video
    Video,
    /// Followers of a creator
    Follow,
    /// Subscribers of a channel
    Subscription,
}

impl fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Follow => write!(f, "follow"),
            Self::Subscription => write!(f, "subscription"),
        }
    }
}

/// Identifies exactly one subject
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectKey {
    pub kind: SubjectKind,
    pub id: String,
}

impl SubjectKey {
    pub fn video(id: &VideoId) -> Self {
        Self {
            kind: SubjectKind::Video,
            id: id.to_string(),
        }
    }

    pub fn follow(creator: &UserId) -> Self {
        Self {
            kind: SubjectKind::Follow,
            id: creator.to_string(),
        }
    }

    pub fn subscription(channel: &UserId) -> Self {
        Self {
            kind: SubjectKind::Subscription,
            id: channel.to_string(),
        }
    }
}

impl fmt::Display for SubjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}
