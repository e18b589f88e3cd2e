//! In-memory implementation of ReactionCollaborator

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::instrument;

use reel_core::{
    CollabResult, DomainError, NewReaction, ReactionCollaborator, ReactionFilter, ReactionPatch,
    ReactionRecord, RecordId,
};

use crate::faults::FaultPlan;

const RESOURCE: &str = "Reaction";

/// Reaction records held in memory
#[derive(Debug)]
pub struct MemoryReactions {
    records: RwLock<Vec<ReactionRecord>>,
    faults: Arc<FaultPlan>,
}

impl MemoryReactions {
    pub fn new(faults: Arc<FaultPlan>) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            faults,
        }
    }

    /// Every stored record, bypassing the fault plan
    pub fn all(&self) -> Vec<ReactionRecord> {
        self.records.read().clone()
    }

    /// Store a record directly, bypassing the fault plan
    pub fn insert(&self, reaction: NewReaction) -> ReactionRecord {
        let record = ReactionRecord {
            id: RecordId::generate(),
            video_id: reaction.video_id,
            user_id: reaction.user_id,
            reaction: reaction.reaction,
            created_at: Utc::now(),
        };
        self.records.write().push(record.clone());
        record
    }
}

#[async_trait]
impl ReactionCollaborator for MemoryReactions {
    #[instrument(skip(self))]
    async fn filter(&self, filter: &ReactionFilter) -> CollabResult<Vec<ReactionRecord>> {
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
    async fn create(&self, reaction: NewReaction) -> CollabResult<ReactionRecord> {
        self.faults.check(RESOURCE, "create").await?;
        Ok(self.insert(reaction))
    }

    #[instrument(skip(self))]
    async fn update(&self, id: &RecordId, patch: ReactionPatch) -> CollabResult<ReactionRecord> {
        self.faults.check(RESOURCE, "update").await?;
        let mut records = self.records.write();
        let record = records
            .iter_mut()
            .find(|r| r.id == *id)
            .ok_or_else(|| DomainError::not_found(RESOURCE, id.as_str()))?;
        record.reaction = patch.reaction;
        Ok(record.clone())
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
