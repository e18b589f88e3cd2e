//! In-memory implementation of SubscriptionCollaborator

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::instrument;

use reel_core::{
    CollabResult, DomainError, NewSubscription, RecordId, SubscriptionCollaborator,
    SubscriptionFilter, SubscriptionRecord,
};

use crate::faults::FaultPlan;

const RESOURCE: &str = "Subscription";

#[derive(Debug)]
pub struct MemorySubscriptions {
    records: RwLock<Vec<SubscriptionRecord>>,
    faults: Arc<FaultPlan>,
}

impl MemorySubscriptions {
    pub fn new(faults: Arc<FaultPlan>) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            faults,
        }
    }

    pub fn all(&self) -> Vec<SubscriptionRecord> {
        self.records.read().clone()
    }

    /// Seed a subscription, bypassing the fault plan
    pub fn insert(&self, subscription: NewSubscription) -> SubscriptionRecord {
        let record = SubscriptionRecord {
            id: RecordId::generate(),
            subscriber_id: subscription.subscriber_id,
            channel_id: subscription.channel_id,
            tier: subscription.tier,
            created_at: Utc::now(),
        };
        self.records.write().push(record.clone());
        record
    }
}

#[async_trait]
impl SubscriptionCollaborator for MemorySubscriptions {
    #[instrument(skip(self))]
    async fn filter(&self, filter: &SubscriptionFilter) -> CollabResult<Vec<SubscriptionRecord>> {
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
    async fn create(&self, subscription: NewSubscription) -> CollabResult<SubscriptionRecord> {
        self.faults.check(RESOURCE, "create").await?;
        Ok(self.insert(subscription))
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
