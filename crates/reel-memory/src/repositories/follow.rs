//! In-memory implementation of FollowCollaborator

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::instrument;

use reel_core::{
    CollabResult, DomainError, FollowCollaborator, FollowFilter, FollowRecord, NewFollow, RecordId,
    UserId,
};

use crate::faults::FaultPlan;

const RESOURCE: &str = "Follow";

#[derive(Debug)]
pub struct MemoryFollows {
    records: RwLock<Vec<FollowRecord>>,
    faults: Arc<FaultPlan>,
}

impl MemoryFollows {
    pub fn new(faults: Arc<FaultPlan>) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            faults,
        }
    }

    pub fn all(&self) -> Vec<FollowRecord> {
        self.records.read().clone()
    }

    /// Seed a follow, bypassing the fault plan
    pub fn insert(&self, follower_id: UserId, following_id: UserId) -> FollowRecord {
        let record = FollowRecord {
            id: RecordId::generate(),
            follower_id,
            following_id,
            created_at: Utc::now(),
        };
        self.records.write().push(record.clone());
        record
    }
}

#[async_trait]
impl FollowCollaborator for MemoryFollows {
    #[instrument(skip(self))]
    async fn filter(&self, filter: &FollowFilter) -> CollabResult<Vec<FollowRecord>> {
        self.faults.check(RESOURCE, "filter").await?;
        Ok(self
            .records
            .read()
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    #[instrument(skip(self))]
    async fn create(&self, follow: NewFollow) -> CollabResult<FollowRecord> {
        self.faults.check(RESOURCE, "create").await?;
        Ok(self.insert(follow.follower_id, follow.following_id))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &RecordId) -> CollabResult<()> {
        self.faults.check(RESOURCE, "delete").await?;
        let mut records = self.records.write();
        let before = records.len();
        records.retain(|r| r.id != *id);
        if records.len() == before {
            return Err(DomainError::not_found(RESOURCE, id.as_str()));
        }
        Ok(())
    }
}
