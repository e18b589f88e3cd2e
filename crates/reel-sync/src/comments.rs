//! Comment threads - newest-first comments with optimistic submission
//!
//! A submitted comment shows up at the head of the thread right away, marked
//! pending. When the backend answers, the pending entry is swapped for the
//! stored record, or removed with a notice if the create failed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use reel_core::{
    CommentCollaborator, CommentDraft, CommentRecord, DomainError, NewComment, Notice, RecordId,
    SubjectKey, VideoId, COMMENT_MAX_LENGTH,
};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::error::SyncFailure;
use crate::notice::NoticeBus;
use crate::session::{Session, SessionUser};

/// One comment as shown in a thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentEntry {
    pub record: CommentRecord,
    /// Still waiting on the backend
    pub pending: bool,
}

/// How a comment submission ended
#[derive(Debug, Clone)]
pub enum CommentOutcome {
    Posted(CommentRecord),
    Failed(SyncFailure),
    Aborted,
}

impl CommentOutcome {
    pub fn is_posted(&self) -> bool {
        matches!(self, Self::Posted(_))
    }
}

/// A comment shown locally and being created in the background
#[derive(Debug)]
pub struct PendingComment {
    local_id: RecordId,
    join: JoinHandle<CommentOutcome>,
}

impl PendingComment {
    /// Id of the placeholder entry until the backend assigns one
    pub fn local_id(&self) -> &RecordId {
        &self.local_id
    }

    pub async fn outcome(self) -> CommentOutcome {
        match self.join.await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(local_id = %self.local_id, error = %err, "Comment task aborted");
                CommentOutcome::Aborted
            }
        }
    }
}

/// Comments of one video
pub struct CommentThread {
    video_id: VideoId,
    key: SubjectKey,
    session: Arc<Session>,
    comments: Arc<dyn CommentCollaborator>,
    notices: NoticeBus,
    timeout: Duration,
    closed: Arc<AtomicBool>,
    entries: Mutex<Vec<CommentEntry>>,
    tx: watch::Sender<Vec<CommentEntry>>,
}

impl CommentThread {
    pub fn new(
        video_id: VideoId,
        session: Arc<Session>,
        comments: Arc<dyn CommentCollaborator>,
        notices: NoticeBus,
    ) -> Self {
        let (tx, _) = watch::channel(Vec::new());
        Self {
            key: SubjectKey::video(&video_id),
            video_id,
            session,
            comments,
            notices,
            timeout: Duration::from_secs(10),
            closed: Arc::new(AtomicBool::new(false)),
            entries: Mutex::new(Vec::new()),
            tx,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_closed_flag(mut self, closed: Arc<AtomicBool>) -> Self {
        self.closed = closed;
        self
    }

    pub fn video_id(&self) -> &VideoId {
        &self.video_id
    }

    /// Entries newest first, pending ones included
    pub fn entries(&self) -> Vec<CommentEntry> {
        self.entries.lock().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<CommentEntry>> {
        self.tx.subscribe()
    }

    /// Fetch the thread from the backend
    ///
    /// Comments still pending stay on top of the fetched list.
    #[instrument(skip(self), fields(video_id = %self.video_id))]
    pub async fn load(&self) -> Result<Vec<CommentEntry>, DomainError> {
        let fetched = tokio::time::timeout(self.timeout, self.comments.filter(&self.video_id))
            .await
            .map_err(|_| DomainError::Timeout(self.timeout))??;

        let mut entries = self.entries.lock();
        let mut next: Vec<CommentEntry> = entries.iter().filter(|e| e.pending).cloned().collect();
        next.extend(fetched.into_iter().map(|record| CommentEntry {
            record,
            pending: false,
        }));
        *entries = next;
        self.publish(&entries);

        debug!(count = entries.len(), "Comments loaded");
        Ok(entries.clone())
    }

    /// Show `draft` at the head of the thread and create it remotely
    pub fn submit(self: &Arc<Self>, draft: CommentDraft) -> Result<PendingComment, DomainError> {
        let runtime = Handle::try_current()
            .map_err(|e| DomainError::InternalError(format!("No async runtime: {e}")))?;

        if self.closed.load(Ordering::Acquire) {
            return Err(DomainError::ContextClosed);
        }

        let user = self.session.user().ok_or(DomainError::Unauthenticated)?;
        if draft.is_blank() {
            return Err(DomainError::EmptyComment);
        }
        draft
            .validate()
            .map_err(|_| DomainError::CommentTooLong {
                max: COMMENT_MAX_LENGTH,
            })?;

        let new_comment = self.new_comment(&user, draft.content);
        let local_id = RecordId::generate();
        let placeholder = CommentEntry {
            record: CommentRecord {
                id: local_id.clone(),
                video_id: new_comment.video_id.clone(),
                user_id: new_comment.user_id.clone(),
                content: new_comment.content.clone(),
                commenter_username: new_comment.commenter_username.clone(),
                commenter_full_name: new_comment.commenter_full_name.clone(),
                created_at: Utc::now(),
            },
            pending: true,
        };

        {
            let mut entries = self.entries.lock();
            entries.insert(0, placeholder);
            self.publish(&entries);
        }
        debug!(video_id = %self.video_id, %local_id, "Pending comment shown");

        let thread = Arc::clone(self);
        let id = local_id.clone();
        let join = runtime.spawn(async move { thread.run_create(id, new_comment).await });

        Ok(PendingComment { local_id, join })
    }

    fn new_comment(&self, user: &SessionUser, content: String) -> NewComment {
        NewComment {
            video_id: self.video_id.clone(),
            user_id: user.id.clone(),
            content,
            commenter_username: user.display_name(),
            commenter_full_name: user.full_name.clone(),
        }
    }

    async fn run_create(self: Arc<Self>, local_id: RecordId, comment: NewComment) -> CommentOutcome {
        let result = match tokio::time::timeout(self.timeout, self.comments.create(comment)).await {
            Ok(result) => result.map_err(SyncFailure::from),
            Err(_) => Err(SyncFailure::new(DomainError::Timeout(self.timeout))),
        };

        let mut entries = self.entries.lock();
        let position = entries.iter().position(|e| e.pending && e.record.id == local_id);

        match result {
            Ok(record) => {
                if let Some(position) = position {
                    entries[position] = CommentEntry {
                        record: record.clone(),
                        pending: false,
                    };
                    self.publish(&entries);
                }
                info!(video_id = %self.video_id, comment_id = %record.id, "Comment posted");
                CommentOutcome::Posted(record)
            }
            Err(failure) => {
                if let Some(position) = position {
                    entries.remove(position);
                    self.publish(&entries);
                }
                drop(entries);

                warn!(
                    video_id = %self.video_id,
                    %local_id,
                    code = failure.cause().code(),
                    error = %failure,
                    "Comment create failed, pending entry removed"
                );
                self.notices.publish(Notice::comment_failed(self.key.clone()));
                CommentOutcome::Failed(failure)
            }
        }
    }

    fn publish(&self, entries: &[CommentEntry]) {
        self.tx.send_replace(entries.to_vec());
    }
}

impl std::fmt::Debug for CommentThread {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommentThread")
            .field("video_id", &self.video_id)
            .field("entries", &self.entries.lock().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_core::NoticeKind;
    use reel_memory::{FaultKind, MemoryBackend};

    fn thread(backend: &MemoryBackend, session: Arc<Session>, bus: &NoticeBus) -> Arc<CommentThread> {
        Arc::new(CommentThread::new(
            VideoId::new("v1"),
            session,
            backend.comments(),
            bus.clone(),
        ))
    }

    fn signed_in() -> Arc<Session> {
        let session = Arc::new(Session::new());
        session.sign_in(SessionUser::new("u1", "maria@example.com").with_full_name("Maria"));
        session
    }

    #[tokio::test]
    async fn test_submit_shows_pending_then_posted() {
        let backend = MemoryBackend::new();
        let bus = NoticeBus::new(8);
        let thread = thread(&backend, signed_in(), &bus);

        let pending = thread.submit(CommentDraft::new("first!")).unwrap();
        let shown = thread.entries();
        assert_eq!(shown.len(), 1);
        assert!(shown[0].pending);
        assert_eq!(shown[0].record.commenter_username, "maria");
        assert_eq!(shown[0].record.id, *pending.local_id());

        let CommentOutcome::Posted(record) = pending.outcome().await else {
            panic!("comment was not posted");
        };
        let shown = thread.entries();
        assert_eq!(shown.len(), 1);
        assert!(!shown[0].pending);
        assert_eq!(shown[0].record, record);
        assert_eq!(record.commenter_full_name.as_deref(), Some("Maria"));
    }

    #[tokio::test]
    async fn test_failed_submit_removes_entry_and_notifies() {
        let backend = MemoryBackend::new();
        let bus = NoticeBus::new(8);
        let mut notices = bus.subscribe();
        let thread = thread(&backend, signed_in(), &bus);
        backend.faults().fail_next(1, FaultKind::Network);

        let outcome = thread.submit(CommentDraft::new("hello")).unwrap().outcome().await;
        assert!(matches!(outcome, CommentOutcome::Failed(_)));
        assert!(thread.entries().is_empty());

        let notice = notices.try_recv().unwrap();
        assert_eq!(notice.kind, NoticeKind::CommentFailed);
        assert_eq!(notice.message, "Failed to post comment.");
    }

    #[tokio::test]
    async fn test_submit_validation() {
        let backend = MemoryBackend::new();
        let bus = NoticeBus::new(8);

        let anonymous = thread(&backend, Arc::new(Session::new()), &bus);
        assert!(matches!(
            anonymous.submit(CommentDraft::new("hi")),
            Err(DomainError::Unauthenticated)
        ));

        let thread = thread(&backend, signed_in(), &bus);
        assert!(matches!(
            thread.submit(CommentDraft::new("  \n ")),
            Err(DomainError::EmptyComment)
        ));

        let too_long = "x".repeat(usize::try_from(COMMENT_MAX_LENGTH).unwrap() + 1);
        assert!(matches!(
            thread.submit(CommentDraft::new(too_long)),
            Err(DomainError::CommentTooLong { max: 10_000 })
        ));
        assert!(thread.entries().is_empty());
    }

    #[tokio::test]
    async fn test_load_is_newest_first() {
        let backend = MemoryBackend::new();
        let bus = NoticeBus::new(8);
        let thread = thread(&backend, signed_in(), &bus);

        for text in ["one", "two", "three"] {
            thread.submit(CommentDraft::new(text)).unwrap().outcome().await;
        }

        let loaded = thread.load().await.unwrap();
        let texts: Vec<_> = loaded.iter().map(|e| e.record.content.as_str()).collect();
        assert_eq!(texts, vec!["three", "two", "one"]);
    }
}
