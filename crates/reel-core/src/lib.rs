//! # reel-core
//!
//! Domain layer for the reel client core: client-side projections of reactions,
//! relationships and counters, the pure mutation dispatcher, collaborator traits
//! (ports) and user notices.
//! This crate has zero dependencies on a runtime or a concrete backend.

pub mod entities;
pub mod error;
pub mod events;
pub mod mutation;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    CommentDraft, CommentRecord, CounterDelta, CounterSnapshot, FollowRecord, NewComment,
    NewFollow, NewReaction, NewSubscription, Reaction, ReactionPatch, ReactionRecord,
    ReactionState, RelationshipKind, RelationshipState, SubscriptionRecord, VideoCounters,
    COMMENT_MAX_LENGTH, DEFAULT_SUBSCRIPTION_TIER,
};
pub use error::DomainError;
pub use events::{Notice, NoticeKind};
pub use mutation::{
    dispatch_reaction, dispatch_relationship, Action, ReactionAction, RelationshipAction,
    Transition,
};
pub use traits::{
    CollabResult, CommentCollaborator, FollowCollaborator, FollowFilter, ReactionCollaborator,
    ReactionFilter, SubscriptionCollaborator, SubscriptionFilter, VideoCounterCollaborator,
};
pub use value_objects::{RecordId, SubjectKey, SubjectKind, UserId, VideoId};
