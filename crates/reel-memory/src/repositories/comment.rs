//! In-memory implementation of CommentCollaborator

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::instrument;

use reel_core::{CollabResult, CommentCollaborator, CommentRecord, NewComment, RecordId, VideoId};

use crate::faults::FaultPlan;

const RESOURCE: &str = "Comment";

/// Comments in insertion order
#[derive(Debug)]
pub struct MemoryComments {
    records: RwLock<Vec<CommentRecord>>,
    faults: Arc<FaultPlan>,
}

impl MemoryComments {
    pub fn new(faults: Arc<FaultPlan>) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            faults,
        }
    }

    pub fn all(&self) -> Vec<CommentRecord> {
        self.records.read().clone()
    }

    /// Seed a comment, bypassing the fault plan
    pub fn insert(&self, comment: NewComment) -> CommentRecord {
        let record = CommentRecord {
            id: RecordId::generate(),
            video_id: comment.video_id,
            user_id: comment.user_id,
            content: comment.content,
            commenter_username: comment.commenter_username,
            commenter_full_name: comment.commenter_full_name,
            created_at: Utc::now(),
        };
        self.records.write().push(record.clone());
        record
    }
}

#[async_trait]
impl CommentCollaborator for MemoryComments {
    #[instrument(skip(self))]
    async fn filter(&self, video_id: &VideoId) -> CollabResult<Vec<CommentRecord>> {
        self.faults.check(RESOURCE, "filter").await?;
        // Later inserts are newer, timestamps can tie
        Ok(self
            .records
            .read()
            .iter()
            .rev()
            .filter(|c| c.video_id == *video_id)
            .cloned()
            .collect())
    }

    #[instrument(skip(self))]
    async fn create(&self, comment: NewComment) -> CollabResult<CommentRecord> {
        self.faults.check(RESOURCE, "create").await?;
        Ok(self.insert(comment))
    }
}
