//! Sync context - the injected container behind every subject handle
//!
//! Holds the collaborators, the session, the notice bus and a registry of
//! live handles. Asking twice for the same subject (as the same actor) yields
//! the same handle, so one subject never has two competing stores.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use reel_common::{AppError, AppResult, SyncConfig};
use reel_core::{
    CommentCollaborator, FollowCollaborator, Reaction, ReactionCollaborator, SubjectKey,
    SubscriptionCollaborator, UserId, VideoCounterCollaborator, VideoId,
};
use tracing::{debug, info};

use crate::comments::CommentThread;
use crate::notice::NoticeBus;
use crate::pipeline::{SubjectHandle, SubjectState};
use crate::remote::{ReactionSync, RelationshipBackend, RelationshipSync, RemoteSync};
use crate::session::{Session, SessionUser};

type HandleKey<K> = (K, Option<UserId>);

struct ContextInner {
    config: SyncConfig,
    session: Arc<Session>,
    notices: NoticeBus,

    // Collaborators
    reactions: Arc<dyn ReactionCollaborator>,
    follows: Arc<dyn FollowCollaborator>,
    subscriptions: Arc<dyn SubscriptionCollaborator>,
    videos: Arc<dyn VideoCounterCollaborator>,
    comments: Arc<dyn CommentCollaborator>,

    // Live handles
    videos_open: DashMap<HandleKey<VideoId>, Arc<SubjectHandle<Reaction>>>,
    relationships_open: DashMap<HandleKey<SubjectKey>, Arc<SubjectHandle<bool>>>,
    threads_open: DashMap<VideoId, Arc<CommentThread>>,

    closed: Arc<AtomicBool>,
}

/// Application context for optimistic mutations
///
/// Cheap to clone; all clones share the same session and registry.
#[derive(Clone)]
pub struct SyncContext {
    inner: Arc<ContextInner>,
}

impl SyncContext {
    pub fn builder() -> SyncContextBuilder {
        SyncContextBuilder::new()
    }

    pub fn config(&self) -> &SyncConfig {
        &self.inner.config
    }

    // === Session ===

    /// Sign a user in
    ///
    /// Handles opened for a different previous user are released and dropped
    /// from the registry; their in-flight syncs still finish.
    pub fn sign_in(&self, user: SessionUser) {
        let id = user.id.clone();
        if let Some(previous) = self.inner.session.sign_in(user) {
            if previous.id != id {
                self.forget_actor(&previous.id);
            }
        }
        info!(user_id = %id, "Signed in");
    }

    pub fn sign_out(&self) -> Option<SessionUser> {
        let previous = self.inner.session.sign_out()?;
        self.forget_actor(&previous.id);
        info!(user_id = %previous.id, "Signed out");
        Some(previous)
    }

    pub fn current_user(&self) -> Option<SessionUser> {
        self.inner.session.user()
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.inner.session
    }

    fn forget_actor(&self, actor: &UserId) {
        let owned = |owner: &Option<UserId>| owner.as_ref() == Some(actor);
        self.inner.videos_open.retain(|(_, owner), handle| {
            if owned(owner) {
                handle.release();
            }
            !owned(owner)
        });
        self.inner.relationships_open.retain(|(_, owner), handle| {
            if owned(owner) {
                handle.release();
            }
            !owned(owner)
        });
        debug!(user_id = %actor, "Handles released");
    }

    // === Handles ===

    /// Reaction handle of a video for the current user
    pub fn video(&self, video_id: &VideoId) -> Arc<SubjectHandle<Reaction>> {
        let actor = self.inner.session.actor();
        let key = (video_id.clone(), actor.clone());

        self.inner
            .videos_open
            .entry(key)
            .or_insert_with(|| {
                let remote: Arc<dyn RemoteSync<Reaction>> = Arc::new(ReactionSync::new(
                    video_id.clone(),
                    Arc::clone(&self.inner.reactions),
                    Arc::clone(&self.inner.videos),
                ));
                self.open_handle(SubjectKey::video(video_id), actor, remote)
            })
            .clone()
    }

    /// Follow handle of a creator for the current user
    pub fn follow(&self, creator_id: &UserId) -> Arc<SubjectHandle<bool>> {
        self.relationship(
            SubjectKey::follow(creator_id),
            creator_id,
            RelationshipBackend::Follow(Arc::clone(&self.inner.follows)),
        )
    }

    /// Subscription handle of a channel for the current user
    pub fn subscription(&self, channel_id: &UserId) -> Arc<SubjectHandle<bool>> {
        self.relationship(
            SubjectKey::subscription(channel_id),
            channel_id,
            RelationshipBackend::Subscription(Arc::clone(&self.inner.subscriptions)),
        )
    }

    fn relationship(
        &self,
        subject: SubjectKey,
        followed_id: &UserId,
        backend: RelationshipBackend,
    ) -> Arc<SubjectHandle<bool>> {
        let actor = self.inner.session.actor();

        self.inner
            .relationships_open
            .entry((subject.clone(), actor.clone()))
            .or_insert_with(|| {
                let remote: Arc<dyn RemoteSync<bool>> =
                    Arc::new(RelationshipSync::new(followed_id.clone(), backend));
                self.open_handle(subject, actor, remote)
            })
            .clone()
    }

    fn open_handle<S: SubjectState>(
        &self,
        subject: SubjectKey,
        actor: Option<UserId>,
        remote: Arc<dyn RemoteSync<S>>,
    ) -> Arc<SubjectHandle<S>> {
        debug!(subject = %subject, actor = ?actor, "Opening subject handle");
        Arc::new(
            SubjectHandle::new(subject, actor, remote, self.inner.notices.clone())
                .with_timeout(self.inner.config.remote_timeout())
                .with_closed_flag(Arc::clone(&self.inner.closed)),
        )
    }

    /// Comment thread of a video
    pub fn comments(&self, video_id: &VideoId) -> Arc<CommentThread> {
        self.inner
            .threads_open
            .entry(video_id.clone())
            .or_insert_with(|| {
                Arc::new(
                    CommentThread::new(
                        video_id.clone(),
                        Arc::clone(&self.inner.session),
                        Arc::clone(&self.inner.comments),
                        self.inner.notices.clone(),
                    )
                    .with_timeout(self.inner.config.remote_timeout())
                    .with_closed_flag(Arc::clone(&self.inner.closed)),
                )
            })
            .clone()
    }

    // === Notices ===

    pub fn notices(&self) -> &NoticeBus {
        &self.inner.notices
    }

    // === Lifecycle ===

    /// Stop accepting mutations and release every handle
    ///
    /// Syncs already in flight still resolve (and may still roll back).
    pub fn shutdown(&self) {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.inner.videos_open.clear();
        self.inner.relationships_open.clear();
        self.inner.threads_open.clear();
        info!("Sync context shut down");
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for SyncContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncContext")
            .field("config", &self.inner.config)
            .field("signed_in", &self.inner.session.is_signed_in())
            .field("videos_open", &self.inner.videos_open.len())
            .field("relationships_open", &self.inner.relationships_open.len())
            .field("collaborators", &"...")
            .finish()
    }
}

/// Builder for creating a SyncContext
pub struct SyncContextBuilder {
    config: SyncConfig,
    session: Option<Arc<Session>>,
    reactions: Option<Arc<dyn ReactionCollaborator>>,
    follows: Option<Arc<dyn FollowCollaborator>>,
    subscriptions: Option<Arc<dyn SubscriptionCollaborator>>,
    videos: Option<Arc<dyn VideoCounterCollaborator>>,
    comments: Option<Arc<dyn CommentCollaborator>>,
}

impl SyncContextBuilder {
    pub fn new() -> Self {
        Self {
            config: SyncConfig::default(),
            session: None,
            reactions: None,
            follows: None,
            subscriptions: None,
            videos: None,
            comments: None,
        }
    }

    pub fn config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Share an existing session instead of starting signed out
    pub fn session(mut self, session: Arc<Session>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn reactions(mut self, collaborator: Arc<dyn ReactionCollaborator>) -> Self {
        self.reactions = Some(collaborator);
        self
    }

    pub fn follows(mut self, collaborator: Arc<dyn FollowCollaborator>) -> Self {
        self.follows = Some(collaborator);
        self
    }

    pub fn subscriptions(mut self, collaborator: Arc<dyn SubscriptionCollaborator>) -> Self {
        self.subscriptions = Some(collaborator);
        self
    }

    pub fn videos(mut self, collaborator: Arc<dyn VideoCounterCollaborator>) -> Self {
        self.videos = Some(collaborator);
        self
    }

    pub fn comments(mut self, collaborator: Arc<dyn CommentCollaborator>) -> Self {
        self.comments = Some(collaborator);
        self
    }

    /// Build the SyncContext
    ///
    /// # Errors
    /// Returns `AppError::Config` if any collaborator is missing
    pub fn build(self) -> AppResult<SyncContext> {
        let missing = |name: &str| AppError::Config(format!("{name} is required"));

        let inner = ContextInner {
            notices: NoticeBus::new(self.config.notice_capacity),
            session: self.session.unwrap_or_default(),
            reactions: self.reactions.ok_or_else(|| missing("reactions"))?,
            follows: self.follows.ok_or_else(|| missing("follows"))?,
            subscriptions: self.subscriptions.ok_or_else(|| missing("subscriptions"))?,
            videos: self.videos.ok_or_else(|| missing("videos"))?,
            comments: self.comments.ok_or_else(|| missing("comments"))?,
            config: self.config,
            videos_open: DashMap::new(),
            relationships_open: DashMap::new(),
            threads_open: DashMap::new(),
            closed: Arc::new(AtomicBool::new(false)),
        };

        Ok(SyncContext {
            inner: Arc::new(inner),
        })
    }
}

impl Default for SyncContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
