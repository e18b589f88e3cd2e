//! Domain entities - client projections and the records the backend stores

mod comment;
mod counter;
mod reaction;
mod relationship;

pub use comment::{CommentDraft, CommentRecord, NewComment, COMMENT_MAX_LENGTH};
pub use counter::{CounterDelta, CounterSnapshot, VideoCounters};
pub use reaction::{NewReaction, Reaction, ReactionPatch, ReactionRecord, ReactionState};
pub use relationship::{
    FollowRecord, NewFollow, NewSubscription, RelationshipKind, RelationshipState,
    SubscriptionRecord, DEFAULT_SUBSCRIPTION_TIER,
};
