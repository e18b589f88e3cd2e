//! In-memory implementation of VideoCounterCollaborator

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::instrument;

use reel_core::{CollabResult, CounterDelta, DomainError, VideoCounterCollaborator, VideoCounters, VideoId};

use crate::faults::FaultPlan;

const RESOURCE: &str = "Video";

/// Like/dislike counters per video
#[derive(Debug)]
pub struct MemoryVideos {
    counters: RwLock<HashMap<VideoId, VideoCounters>>,
    faults: Arc<FaultPlan>,
}

impl MemoryVideos {
    pub fn new(faults: Arc<FaultPlan>) -> Self {
        Self {
            counters: RwLock::new(HashMap::new()),
            faults,
        }
    }

    /// Register a video with starting counters
    pub fn insert(&self, video_id: VideoId, likes: u64, dislikes: u64) {
        self.counters
            .write()
            .insert(video_id.clone(), VideoCounters::new(video_id, likes, dislikes));
    }

    /// Counters of a video, bypassing the fault plan
    pub fn counters(&self, video_id: &VideoId) -> Option<VideoCounters> {
        self.counters.read().get(video_id).cloned()
    }
}

#[async_trait]
impl VideoCounterCollaborator for MemoryVideos {
    #[instrument(skip(self))]
    async fn get(&self, video_id: &VideoId) -> CollabResult<VideoCounters> {
        self.faults.check(RESOURCE, "get").await?;
        self.counters(video_id)
            .ok_or_else(|| DomainError::not_found(RESOURCE, video_id.as_str()))
    }

    #[instrument(skip(self))]
    async fn adjust(&self, video_id: &VideoId, delta: CounterDelta) -> CollabResult<VideoCounters> {
        self.faults.check(RESOURCE, "adjust").await?;
        let mut counters = self.counters.write();
        let entry = counters
            .get_mut(video_id)
            .ok_or_else(|| DomainError::not_found(RESOURCE, video_id.as_str()))?;

        let next = entry.snapshot().apply(delta);
        entry.likes = next.likes;
        entry.dislikes = next.dislikes;
        Ok(entry.clone())
    }
}
