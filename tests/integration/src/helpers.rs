//! Test helpers - context construction and notice draining

use std::time::Duration;

use anyhow::Result;
use reel_common::{try_init_tracing_with_config, AppConfig, SyncConfig, TracingConfig};
use reel_core::{Notice, UserId, VideoId};
use reel_memory::MemoryBackend;
use reel_sync::{SessionUser, SyncContext};
use tokio::sync::broadcast;

use crate::fixtures::{unique_user_id, unique_video_id, viewer};

/// A sync context wired to a fresh in-memory backend
pub struct TestApp {
    pub ctx: SyncContext,
    pub backend: MemoryBackend,
}

impl TestApp {
    /// Context configured from the environment (and `.env`, if present)
    pub fn new() -> Result<Self> {
        Self::with_config(AppConfig::from_env()?)
    }

    pub fn with_sync_config(sync: SyncConfig) -> Result<Self> {
        Self::with_config(AppConfig {
            sync,
            ..AppConfig::default()
        })
    }

    pub fn with_config(config: AppConfig) -> Result<Self> {
        // Another test may have installed the subscriber already
        let _ = try_init_tracing_with_config(TracingConfig::from_settings(&config.telemetry));

        let backend = MemoryBackend::new();
        let ctx = SyncContext::builder()
            .config(config.sync)
            .reactions(backend.reactions())
            .follows(backend.follows())
            .subscriptions(backend.subscriptions())
            .videos(backend.videos())
            .comments(backend.comments())
            .build()?;

        Ok(Self { ctx, backend })
    }

    /// Sign in a fresh viewer and return them
    pub fn sign_in(&self) -> SessionUser {
        let user = viewer();
        self.ctx.sign_in(user.clone());
        user
    }

    /// Register a video with starting counters
    pub fn seed_video(&self, likes: u64, dislikes: u64) -> VideoId {
        let video_id = unique_video_id();
        self.backend.videos().insert(video_id.clone(), likes, dislikes);
        video_id
    }

    /// Create a creator that already has `followers` followers
    pub fn seed_creator(&self, followers: usize) -> UserId {
        let creator = unique_user_id("creator");
        for _ in 0..followers {
            self.backend
                .follows()
                .insert(unique_user_id("fan"), creator.clone());
        }
        creator
    }
}

/// Collect every notice already delivered to `rx`
pub fn drain_notices(rx: &mut broadcast::Receiver<Notice>) -> Vec<Notice> {
    let mut notices = Vec::new();
    while let Ok(notice) = rx.try_recv() {
        notices.push(notice);
    }
    notices
}

/// Short config for tests that exercise timeouts
pub fn fast_timeout_config(timeout: Duration) -> SyncConfig {
    SyncConfig {
        remote_timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        ..SyncConfig::default()
    }
}
