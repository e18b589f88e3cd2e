//! Backend - one set of tables sharing a fault plan

use std::sync::Arc;

use crate::faults::FaultPlan;
use crate::repositories::{
    MemoryComments, MemoryFollows, MemoryReactions, MemorySubscriptions, MemoryVideos,
};

/// In-process stand-in for the hosted backend
///
/// Clones share the same tables.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    faults: Arc<FaultPlan>,
    reactions: Arc<MemoryReactions>,
    follows: Arc<MemoryFollows>,
    subscriptions: Arc<MemorySubscriptions>,
    videos: Arc<MemoryVideos>,
    comments: Arc<MemoryComments>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        let faults = Arc::new(FaultPlan::new());
        Self {
            reactions: Arc::new(MemoryReactions::new(Arc::clone(&faults))),
            follows: Arc::new(MemoryFollows::new(Arc::clone(&faults))),
            subscriptions: Arc::new(MemorySubscriptions::new(Arc::clone(&faults))),
            videos: Arc::new(MemoryVideos::new(Arc::clone(&faults))),
            comments: Arc::new(MemoryComments::new(Arc::clone(&faults))),
            faults,
        }
    }

    pub fn faults(&self) -> &FaultPlan {
        &self.faults
    }

    pub fn reactions(&self) -> Arc<MemoryReactions> {
        Arc::clone(&self.reactions)
    }

    pub fn follows(&self) -> Arc<MemoryFollows> {
        Arc::clone(&self.follows)
    }

    pub fn subscriptions(&self) -> Arc<MemorySubscriptions> {
        Arc::clone(&self.subscriptions)
    }

    pub fn videos(&self) -> Arc<MemoryVideos> {
        Arc::clone(&self.videos)
    }

    pub fn comments(&self) -> Arc<MemoryComments> {
        Arc::clone(&self.comments)
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_core::{FollowCollaborator, FollowFilter, UserId};

    #[tokio::test]
    async fn test_tables_share_fault_plan() {
        let backend = MemoryBackend::new();
        backend.follows().insert(UserId::new("a"), UserId::new("b"));
        backend.faults().fail_next(1, crate::FaultKind::Network);

        let follows = backend.follows();
        assert!(follows.filter(&FollowFilter::default()).await.is_err());
        assert_eq!(follows.filter(&FollowFilter::default()).await.unwrap().len(), 1);
        assert_eq!(backend.faults().calls(), 2);
    }
}
