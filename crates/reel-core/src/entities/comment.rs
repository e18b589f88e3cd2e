//! Comment entity - a user's comment on a video

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::value_objects::{RecordId, UserId, VideoId};

/// Longest comment the client will submit
pub const COMMENT_MAX_LENGTH: u64 = 10_000;

/// Stored comment record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub id: RecordId,
    pub video_id: VideoId,
    pub user_id: UserId,
    pub content: String,
    pub commenter_username: String,
    pub commenter_full_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a comment record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    pub video_id: VideoId,
    pub user_id: UserId,
    pub content: String,
    pub commenter_username: String,
    pub commenter_full_name: Option<String>,
}

/// Comment text as typed by the user
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CommentDraft {
    #[validate(length(min = 1, max = 10000, message = "Comment must be 1-10000 characters"))]
    pub content: String,
}

impl CommentDraft {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Check if the draft has nothing but whitespace
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}
