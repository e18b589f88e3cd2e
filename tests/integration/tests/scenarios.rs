//! Optimistic mutation scenarios, end to end over the in-memory backend
//!
//! Run with: cargo test -p integration-tests --test scenarios

use std::time::Duration;

use futures::future::join_all;
use integration_tests::{drain_notices, fast_timeout_config, TestApp};
use reel_core::{
    Action, CommentDraft, CounterSnapshot, DomainError, NoticeKind, Reaction, SubjectKind,
};
use reel_memory::FaultKind;
use reel_sync::{MutationOutcome, Projection};

// ============================================================================
// Reactions
// ============================================================================

#[tokio::test]
async fn test_like_confirmed() {
    let app = TestApp::new().unwrap();
    app.sign_in();
    let video_id = app.seed_video(10, 0);
    let handle = app.ctx.video(&video_id);
    handle.load().await.unwrap();
    assert_eq!(handle.current(), Projection::new(Reaction::None, CounterSnapshot::reactions(10, 0)));

    let pending = handle.invoke(Action::Like).unwrap();
    let liked = Projection::new(Reaction::Like, CounterSnapshot::reactions(11, 0));
    assert_eq!(*pending.optimistic(), liked);
    assert_eq!(handle.current(), liked);

    assert!(pending.outcome().await.is_confirmed());
    assert_eq!(handle.current(), liked);
    assert_eq!(app.backend.videos().counters(&video_id).unwrap().likes, 11);
}

#[tokio::test]
async fn test_like_again_clears() {
    let app = TestApp::new().unwrap();
    app.sign_in();
    let video_id = app.seed_video(10, 0);
    let handle = app.ctx.video(&video_id);
    handle.load().await.unwrap();

    handle.invoke(Action::Like).unwrap().outcome().await;
    assert_eq!(handle.current(), Projection::new(Reaction::Like, CounterSnapshot::reactions(11, 0)));

    let pending = handle.invoke(Action::Like).unwrap();
    let cleared = Projection::new(Reaction::None, CounterSnapshot::reactions(10, 0));
    assert_eq!(*pending.optimistic(), cleared);

    assert!(pending.outcome().await.is_confirmed());
    assert_eq!(handle.current(), cleared);
    assert!(app.backend.reactions().all().is_empty());
    assert_eq!(app.backend.videos().counters(&video_id).unwrap().likes, 10);
}

#[tokio::test]
async fn test_dislike_while_liked_is_one_step() {
    let app = TestApp::new().unwrap();
    app.sign_in();
    let video_id = app.seed_video(10, 4);
    let handle = app.ctx.video(&video_id);
    handle.load().await.unwrap();
    handle.invoke(Action::Like).unwrap().outcome().await;

    let mut rx = handle.subscribe();
    rx.mark_unchanged();

    let pending = handle.invoke(Action::Dislike).unwrap();
    // Exactly one change observed, with both counters moved together
    assert!(rx.has_changed().unwrap());
    let seen = *rx.borrow_and_update();
    assert_eq!(seen, Projection::new(Reaction::Dislike, CounterSnapshot::reactions(10, 5)));

    assert!(pending.outcome().await.is_confirmed());
    let counters = app.backend.videos().counters(&video_id).unwrap();
    assert_eq!((counters.likes, counters.dislikes), (10, 5));

    let records = app.backend.reactions().all();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].reaction, Reaction::Dislike);
}

#[tokio::test]
async fn test_failed_reaction_restores_exact_projection() {
    let app = TestApp::new().unwrap();
    app.sign_in();
    let video_id = app.seed_video(7, 3);
    let handle = app.ctx.video(&video_id);
    let before = handle.load().await.unwrap();
    let mut notices = app.ctx.notices().subscribe();

    app.backend.faults().fail_next(1, FaultKind::Unauthorized);
    let outcome = handle.invoke(Action::Dislike).unwrap().outcome().await;

    assert!(outcome.is_rolled_back());
    assert_eq!(handle.current(), before);

    let notices = drain_notices(&mut notices);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].message, "Could not save your reaction. Please try again.");
}

#[tokio::test]
async fn test_counter_failure_after_record_write_is_retryable() {
    let app = TestApp::new().unwrap();
    app.sign_in();
    let video_id = app.seed_video(10, 0);
    let handle = app.ctx.video(&video_id);
    let before = handle.load().await.unwrap();
    let mut notices = app.ctx.notices().subscribe();

    // Record create goes through, the counter adjust after it does not
    app.backend.faults().fail_call("Video", "adjust", FaultKind::Network);
    assert!(handle.invoke(Action::Like).unwrap().outcome().await.is_rolled_back());
    assert_eq!(handle.current(), before);
    assert!(app.backend.reactions().all().is_empty());
    assert_eq!(app.backend.videos().counters(&video_id).unwrap().likes, 10);
    assert_eq!(drain_notices(&mut notices).len(), 1);

    assert!(handle.invoke(Action::Like).unwrap().outcome().await.is_confirmed());
    let liked = Projection::new(Reaction::Like, CounterSnapshot::reactions(11, 0));
    assert_eq!(handle.current(), liked);
    assert_eq!(handle.load().await.unwrap(), liked);
}

#[tokio::test]
async fn test_rapid_reactions_settle_on_last_intent() {
    let app = TestApp::new().unwrap();
    app.sign_in();
    let video_id = app.seed_video(10, 0);
    let handle = app.ctx.video(&video_id);
    handle.load().await.unwrap();
    app.backend
        .faults()
        .set_latency(Duration::from_millis(1), Duration::from_millis(4));

    let pending: Vec<_> = [Action::Like, Action::Dislike, Action::Like, Action::Like, Action::Dislike]
        .into_iter()
        .map(|action| handle.invoke(action).unwrap())
        .collect();
    let outcomes = join_all(pending.into_iter().map(|p| p.outcome())).await;

    assert!(outcomes.last().unwrap().is_confirmed());
    let expected = Projection::new(Reaction::Dislike, CounterSnapshot::reactions(10, 1));
    assert_eq!(handle.current(), expected);

    let counters = app.backend.videos().counters(&video_id).unwrap();
    assert_eq!((counters.likes, counters.dislikes), (10, 1));
    assert_eq!(handle.load().await.unwrap(), expected);
}

// ============================================================================
// Relationships
// ============================================================================

#[tokio::test]
async fn test_follow_failure_rolls_back_with_one_notice() {
    let app = TestApp::new().unwrap();
    app.sign_in();
    let creator = app.seed_creator(100);
    let handle = app.ctx.follow(&creator);
    handle.load().await.unwrap();
    let mut notices = app.ctx.notices().subscribe();

    app.backend.faults().fail_next(1, FaultKind::Network);
    let pending = handle.invoke(Action::Follow).unwrap();
    assert_eq!(*pending.optimistic(), Projection::new(true, CounterSnapshot::followers(101)));

    assert!(pending.outcome().await.is_rolled_back());
    assert_eq!(handle.current(), Projection::new(false, CounterSnapshot::followers(100)));

    let notices = drain_notices(&mut notices);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::SyncFailed);
    assert_eq!(notices[0].message, "Failed to update subscription. Please try again.");
}

#[tokio::test]
async fn test_follow_then_unfollow_ends_inactive() {
    let app = TestApp::new().unwrap();
    app.sign_in();
    let creator = app.seed_creator(100);
    let handle = app.ctx.follow(&creator);
    handle.load().await.unwrap();

    app.backend.faults().hold();
    let follow = handle.invoke(Action::Follow).unwrap();
    let unfollow = handle.invoke(Action::Unfollow).unwrap();
    assert_eq!(handle.current(), Projection::new(false, CounterSnapshot::followers(100)));
    app.backend.faults().release();

    assert!(matches!(follow.outcome().await, MutationOutcome::Superseded));
    assert!(unfollow.outcome().await.is_confirmed());

    let inactive = Projection::new(false, CounterSnapshot::followers(100));
    assert_eq!(handle.current(), inactive);
    assert_eq!(app.backend.follows().all().len(), 100);
    assert_eq!(handle.load().await.unwrap(), inactive);
}

#[tokio::test]
async fn test_superseded_failure_does_not_touch_newer_state() {
    let app = TestApp::new().unwrap();
    app.sign_in();
    let creator = app.seed_creator(100);
    let handle = app.ctx.follow(&creator);
    handle.load().await.unwrap();
    let mut notices = app.ctx.notices().subscribe();

    app.backend.faults().hold();
    let follow = handle.invoke(Action::Follow).unwrap();
    let unfollow = handle.invoke(Action::Unfollow).unwrap();
    // The follow's first call fails once released; the unfollow's calls succeed
    app.backend.faults().fail_next(1, FaultKind::Network);
    app.backend.faults().release();

    assert!(matches!(follow.outcome().await, MutationOutcome::Superseded));
    assert!(unfollow.outcome().await.is_confirmed());
    assert_eq!(handle.current(), Projection::new(false, CounterSnapshot::followers(100)));
    assert!(drain_notices(&mut notices).is_empty());
}

#[tokio::test]
async fn test_superseded_and_latest_both_failing_restore_backend_state() {
    let app = TestApp::new().unwrap();
    app.sign_in();
    let creator = app.seed_creator(100);
    let handle = app.ctx.follow(&creator);
    let before = handle.load().await.unwrap();
    let mut notices = app.ctx.notices().subscribe();

    app.backend.faults().hold();
    let follow = handle.invoke(Action::Follow).unwrap();
    let unfollow = handle.invoke(Action::Unfollow).unwrap();
    app.backend.faults().fail_next(2, FaultKind::Network);
    app.backend.faults().release();

    assert!(matches!(follow.outcome().await, MutationOutcome::Superseded));
    assert!(unfollow.outcome().await.is_rolled_back());

    // Neither write landed, so neither optimistic state may stay on screen
    assert_eq!(handle.current(), before);
    assert_eq!(app.backend.follows().all().len(), 100);
    assert_eq!(handle.load().await.unwrap(), before);
    assert_eq!(drain_notices(&mut notices).len(), 1);
}

#[tokio::test]
async fn test_follow_twice_is_idempotent() {
    let app = TestApp::new().unwrap();
    let fan = app.sign_in();
    let creator = app.seed_creator(0);
    let handle = app.ctx.follow(&creator);
    handle.load().await.unwrap();

    handle.invoke(Action::Follow).unwrap().outcome().await;
    let again = handle.invoke(Action::Follow).unwrap();
    assert_eq!(*again.optimistic(), Projection::new(true, CounterSnapshot::followers(1)));
    assert!(again.outcome().await.is_confirmed());

    let records = app.backend.follows().all();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].follower_id, fan.id);
}

#[tokio::test]
async fn test_subscribe_toggle() {
    let app = TestApp::new().unwrap();
    app.sign_in();
    let channel = app.seed_creator(0);
    let handle = app.ctx.subscription(&channel);
    assert_eq!(handle.key().kind, SubjectKind::Subscription);

    let subscribed = handle.invoke(Action::ToggleFollow).unwrap();
    assert!(subscribed.outcome().await.is_confirmed());
    assert_eq!(app.backend.subscriptions().all().len(), 1);
    assert!(app.backend.follows().all().is_empty());

    handle.invoke(Action::ToggleFollow).unwrap().outcome().await;
    assert!(app.backend.subscriptions().all().is_empty());
    assert_eq!(handle.current(), Projection::new(false, CounterSnapshot::followers(0)));
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_signed_out_is_rejected_without_remote_calls() {
    let app = TestApp::new().unwrap();
    let video_id = app.seed_video(10, 0);
    let handle = app.ctx.video(&video_id);
    let calls = app.backend.faults().calls();

    assert!(matches!(handle.invoke(Action::Like), Err(DomainError::Unauthenticated)));
    assert_eq!(handle.current(), Projection::default());
    assert_eq!(app.backend.faults().calls(), calls);
}

#[tokio::test]
async fn test_self_follow_is_rejected() {
    let app = TestApp::new().unwrap();
    let me = app.sign_in();
    let handle = app.ctx.follow(&me.id);

    let err = handle.invoke(Action::Follow).unwrap_err();
    assert!(err.is_validation());
    assert!(matches!(err, DomainError::SelfRelationship));
    assert!(!handle.current().state);
    assert!(app.backend.follows().all().is_empty());
}

#[tokio::test]
async fn test_timeout_counts_as_sync_failure() {
    let app = TestApp::with_sync_config(fast_timeout_config(Duration::from_millis(30))).unwrap();
    app.sign_in();
    let creator = app.seed_creator(5);
    let handle = app.ctx.follow(&creator);
    handle.load().await.unwrap();

    app.backend.faults().hold();
    let outcome = handle.invoke(Action::Follow).unwrap().outcome().await;
    app.backend.faults().release();

    match outcome {
        MutationOutcome::RolledBack(failure) => {
            assert!(matches!(failure.cause(), DomainError::Timeout(_)));
        }
        other => panic!("expected rollback, got {other:?}"),
    }
    assert_eq!(handle.current(), Projection::new(false, CounterSnapshot::followers(5)));
}

// ============================================================================
// Comments
// ============================================================================

#[tokio::test]
async fn test_comment_posted_on_top() {
    let app = TestApp::new().unwrap();
    let viewer = app.sign_in();
    let video_id = app.seed_video(0, 0);
    let thread = app.ctx.comments(&video_id);

    thread
        .submit(CommentDraft::new("older"))
        .unwrap()
        .outcome()
        .await;
    let pending = thread.submit(CommentDraft::new("newer")).unwrap();
    let shown = thread.entries();
    assert_eq!(shown[0].record.content, "newer");
    assert!(shown[0].pending);

    assert!(pending.outcome().await.is_posted());
    let loaded = thread.load().await.unwrap();
    let texts: Vec<_> = loaded.iter().map(|e| e.record.content.as_str()).collect();
    assert_eq!(texts, vec!["newer", "older"]);
    assert!(loaded.iter().all(|e| !e.pending));

    let expected_name = viewer.email.split('@').next().unwrap().to_string();
    assert_eq!(loaded[0].record.commenter_username, expected_name);
}

#[tokio::test]
async fn test_comment_failure_notice() {
    let app = TestApp::new().unwrap();
    app.sign_in();
    let video_id = app.seed_video(0, 0);
    let thread = app.ctx.comments(&video_id);
    let mut notices = app.ctx.notices().subscribe();

    app.backend.faults().fail_next(1, FaultKind::Network);
    let outcome = thread.submit(CommentDraft::new("hello")).unwrap().outcome().await;

    assert!(!outcome.is_posted());
    assert!(thread.entries().is_empty());
    let notices = drain_notices(&mut notices);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::CommentFailed);
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn test_sign_out_gives_fresh_handles() {
    let app = TestApp::new().unwrap();
    app.sign_in();
    let video_id = app.seed_video(10, 0);
    let signed_in = app.ctx.video(&video_id);
    signed_in.invoke(Action::Like).unwrap().outcome().await;

    app.ctx.sign_out();
    assert!(matches!(
        signed_in.invoke(Action::Like),
        Err(DomainError::HandleReleased)
    ));
    let anonymous = app.ctx.video(&video_id);
    let seen = anonymous.load().await.unwrap();
    assert_eq!(seen, Projection::new(Reaction::None, CounterSnapshot::reactions(11, 0)));
    assert!(anonymous.invoke(Action::Like).is_err());
}
