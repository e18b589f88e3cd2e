//! Test fixtures and data generators

use std::sync::atomic::{AtomicU64, Ordering};

use reel_core::{UserId, VideoId};
use reel_sync::SessionUser;

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

pub fn unique_video_id() -> VideoId {
    VideoId::new(format!("video-{}", unique_suffix()))
}

pub fn unique_user_id(prefix: &str) -> UserId {
    UserId::new(format!("{prefix}-{}", unique_suffix()))
}

/// Signed-in user with an email but no username
pub fn viewer() -> SessionUser {
    let suffix = unique_suffix();
    SessionUser::new(format!("viewer-{suffix}"), format!("viewer{suffix}@example.com"))
}
