//! Reaction entity - a user's like or dislike on a video

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value_objects::{RecordId, UserId, VideoId};

/// A user's reaction to a video
///
/// At most one non-`None` reaction exists per (video, user) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reaction {
    #[default]
    None,
    Like,
    Dislike,
}

impl Reaction {
    /// Check if any reaction is set
    #[inline]
    pub fn is_set(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Like => write!(f, "like"),
            Self::Dislike => write!(f, "dislike"),
        }
    }
}

/// Projection of one actor's reaction to one video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionState {
    pub subject_id: VideoId,
    pub actor_id: UserId,
    pub reaction: Reaction,
}

impl ReactionState {
    pub fn new(subject_id: VideoId, actor_id: UserId, reaction: Reaction) -> Self {
        Self {
            subject_id,
            actor_id,
            reaction,
        }
    }
}

/// Stored reaction record
///
/// Records only ever hold `Like` or `Dislike`; clearing a reaction deletes the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionRecord {
    pub id: RecordId,
    pub video_id: VideoId,
    pub user_id: UserId,
    pub reaction: Reaction,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a reaction record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReaction {
    pub video_id: VideoId,
    pub user_id: UserId,
    pub reaction: Reaction,
}

impl From<&ReactionState> for NewReaction {
    fn from(state: &ReactionState) -> Self {
        Self {
            video_id: state.subject_id.clone(),
            user_id: state.actor_id.clone(),
            reaction: state.reaction,
        }
    }
}

/// Partial update for a reaction record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionPatch {
    pub reaction: Reaction,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_none() {
        assert_eq!(Reaction::default(), Reaction::None);
        assert!(!Reaction::None.is_set());
        assert!(Reaction::Like.is_set());
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Reaction::Dislike).unwrap(), "\"dislike\"");
        let parsed: Reaction = serde_json::from_str("\"like\"").unwrap();
        assert_eq!(parsed, Reaction::Like);
    }

    #[test]
    fn test_new_reaction_from_state() {
        let state = ReactionState::new(VideoId::new("v"), UserId::new("u"), Reaction::Like);
        let payload = NewReaction::from(&state);
        assert_eq!(payload.video_id.as_str(), "v");
        assert_eq!(payload.user_id.as_str(), "u");
        assert_eq!(payload.reaction, Reaction::Like);
    }
}
