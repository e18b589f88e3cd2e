//! Remote sync for video reactions

use std::sync::Arc;

use async_trait::async_trait;
use reel_core::{
    CounterDelta, NewReaction, Reaction, ReactionCollaborator, ReactionFilter, ReactionPatch,
    ReactionRecord, ReactionState, UserId, VideoCounterCollaborator, VideoId,
};
use tracing::{debug, error, info, instrument};

use super::RemoteSync;
use crate::error::SyncFailure;
use crate::store::Projection;

/// Syncs one video's reaction records and its like/dislike counters
#[derive(Clone)]
pub struct ReactionSync {
    video_id: VideoId,
    reactions: Arc<dyn ReactionCollaborator>,
    counters: Arc<dyn VideoCounterCollaborator>,
}

impl ReactionSync {
    pub fn new(
        video_id: VideoId,
        reactions: Arc<dyn ReactionCollaborator>,
        counters: Arc<dyn VideoCounterCollaborator>,
    ) -> Self {
        Self {
            video_id,
            reactions,
            counters,
        }
    }

    pub fn video_id(&self) -> &VideoId {
        &self.video_id
    }

    async fn write(&self, desired: &ReactionState) -> Result<(), SyncFailure> {
        let filter = ReactionFilter::by_actor(&desired.subject_id, &desired.actor_id);
        let existing = self.reactions.filter(&filter).await?;
        let previous = existing.first().map_or(Reaction::None, |r| r.reaction);

        // Extra records break the one-reaction-per-actor invariant; drop them
        for duplicate in existing.iter().skip(1) {
            self.reactions.delete(&duplicate.id).await?;
        }

        if previous == desired.reaction {
            debug!(video_id = %self.video_id, reaction = %previous, "Remote reaction already matches");
            return Ok(());
        }

        let written = match (existing.first(), desired.reaction) {
            (Some(record), Reaction::None) => {
                self.reactions.delete(&record.id).await?;
                Written::Deleted(record)
            }
            (Some(record), reaction) => {
                self.reactions
                    .update(&record.id, ReactionPatch { reaction })
                    .await?;
                Written::Updated(record)
            }
            (None, _) => Written::Created(self.reactions.create(NewReaction::from(desired)).await?),
        };

        // The delta comes from the remote record, not the local projection,
        // so a retried sync never double counts.
        let delta = CounterDelta::between(previous, desired.reaction);
        let counters = match self.counters.adjust(&self.video_id, delta).await {
            Ok(counters) => counters,
            Err(err) => {
                // Record and counter must move together or a retry sees a
                // matching record and skips the counter for good
                self.undo(written, previous).await;
                return Err(err.into());
            }
        };

        info!(
            video_id = %self.video_id,
            actor_id = %desired.actor_id,
            from = %previous,
            to = %desired.reaction,
            likes = counters.likes,
            dislikes = counters.dislikes,
            "Reaction synced"
        );

        Ok(())
    }

    /// Put the record back the way it was before a write whose counter
    /// adjust failed
    async fn undo(&self, written: Written<'_>, previous: Reaction) {
        let undone = match written {
            Written::Deleted(record) => self
                .reactions
                .create(NewReaction {
                    video_id: record.video_id.clone(),
                    user_id: record.user_id.clone(),
                    reaction: previous,
                })
                .await
                .map(drop),
            Written::Updated(record) => self
                .reactions
                .update(&record.id, ReactionPatch { reaction: previous })
                .await
                .map(drop),
            Written::Created(record) => self.reactions.delete(&record.id).await,
        };

        match undone {
            Ok(()) => debug!(video_id = %self.video_id, reaction = %previous, "Reaction record restored"),
            Err(err) => error!(
                video_id = %self.video_id,
                reaction = %previous,
                error = %err,
                "Reaction record could not be restored, counters may drift until reload"
            ),
        }
    }
}

/// The record change made before the counter adjust
enum Written<'a> {
    Created(ReactionRecord),
    Updated(&'a ReactionRecord),
    Deleted(&'a ReactionRecord),
}

#[async_trait]
impl RemoteSync<Reaction> for ReactionSync {
    #[instrument(skip(self), fields(video_id = %self.video_id))]
    async fn sync(&self, actor: &UserId, desired: &Reaction) -> Result<(), SyncFailure> {
        let state = ReactionState::new(self.video_id.clone(), actor.clone(), *desired);
        self.write(&state).await
    }

    #[instrument(skip(self), fields(video_id = %self.video_id))]
    async fn fetch(&self, actor: Option<&UserId>) -> Result<Projection<Reaction>, SyncFailure> {
        let counters = self.counters.get(&self.video_id).await?;

        let reaction = match actor {
            Some(actor) => self
                .reactions
                .filter(&ReactionFilter::by_actor(&self.video_id, actor))
                .await?
                .first()
                .map_or(Reaction::None, |r| r.reaction),
            None => Reaction::None,
        };

        Ok(Projection::new(reaction, counters.snapshot()))
    }
}
