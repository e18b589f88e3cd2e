//! Notices - transient, non-blocking messages for the user
//!
//! A notice never changes navigation state; the UI shows it and moves on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{SubjectKey, SubjectKind};

/// Why a notice was raised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoticeKind {
    /// A remote write failed and the optimistic change was rolled back
    SyncFailed,
    /// A comment could not be posted
    CommentFailed,
}

/// Transient message for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub subject: SubjectKey,
    pub kind: NoticeKind,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl Notice {
    pub const REACTION_FAILED: &'static str = "Could not save your reaction. Please try again.";
    pub const RELATIONSHIP_FAILED: &'static str =
        "Failed to update subscription. Please try again.";
    pub const COMMENT_FAILED: &'static str = "Failed to post comment.";

    pub fn new(subject: SubjectKey, kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            subject,
            kind,
            message: message.into(),
            raised_at: Utc::now(),
        }
    }

    /// Rollback notice with the canonical message for the subject kind
    pub fn sync_failed(subject: SubjectKey) -> Self {
        let message = match subject.kind {
            SubjectKind::Video => Self::REACTION_FAILED,
            SubjectKind::Follow | SubjectKind::Subscription => Self::RELATIONSHIP_FAILED,
        };
        Self::new(subject, NoticeKind::SyncFailed, message)
    }

    pub fn comment_failed(subject: SubjectKey) -> Self {
        Self::new(subject, NoticeKind::CommentFailed, Self::COMMENT_FAILED)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
