//! User-initiated toggle actions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Action on a video's reaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionAction {
    Like,
    Dislike,
}

/// Action on a follow or subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipAction {
    Follow,
    Unfollow,
    /// Flip whatever the current relationship is
    Toggle,
}

/// Any action a subject handle can be asked to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Like,
    Dislike,
    Follow,
    Unfollow,
    ToggleFollow,
}

impl Action {
    /// The reaction form of this action, if it is one
    pub fn as_reaction(self) -> Option<ReactionAction> {
        match self {
            Self::Like => Some(ReactionAction::Like),
            Self::Dislike => Some(ReactionAction::Dislike),
            _ => None,
        }
    }

    /// The relationship form of this action, if it is one
    pub fn as_relationship(self) -> Option<RelationshipAction> {
        match self {
            Self::Follow => Some(RelationshipAction::Follow),
            Self::Unfollow => Some(RelationshipAction::Unfollow),
            Self::ToggleFollow => Some(RelationshipAction::Toggle),
            _ => None,
        }
    }
}

impl From<ReactionAction> for Action {
    fn from(action: ReactionAction) -> Self {
        match action {
            ReactionAction::Like => Self::Like,
            ReactionAction::Dislike => Self::Dislike,
        }
    }
}

impl From<RelationshipAction> for Action {
    fn from(action: RelationshipAction) -> Self {
        match action {
            RelationshipAction::Follow => Self::Follow,
            RelationshipAction::Unfollow => Self::Unfollow,
            RelationshipAction::Toggle => Self::ToggleFollow,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Like => write!(f, "like"),
            Self::Dislike => write!(f, "dislike"),
            Self::Follow => write!(f, "follow"),
            Self::Unfollow => write!(f, "unfollow"),
            Self::ToggleFollow => write!(f, "toggle_follow"),
        }
    }
}
