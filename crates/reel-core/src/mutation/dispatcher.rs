//! Mutation dispatcher
//!
//! Computes the next local state and the counter delta for a toggle action
//! without touching the network. Both functions are total over their inputs.

use serde::{Deserialize, Serialize};

use super::action::{ReactionAction, RelationshipAction};
use crate::entities::{CounterDelta, Reaction};

/// Result of dispatching an action against a current state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition<S> {
    pub next: S,
    pub delta: CounterDelta,
}

impl<S> Transition<S> {
    pub fn new(next: S, delta: CounterDelta) -> Self {
        Self { next, delta }
    }
}

/// Dispatch a like/dislike against the current reaction
///
/// Repeating the active reaction clears it. Switching from one reaction to the
/// other removes the old contribution and adds the new one in a single delta.
pub fn dispatch_reaction(current: Reaction, action: ReactionAction) -> Transition<Reaction> {
    let requested = match action {
        ReactionAction::Like => Reaction::Like,
        ReactionAction::Dislike => Reaction::Dislike,
    };

    let next = if current == requested {
        Reaction::None
    } else {
        requested
    };

    Transition::new(next, CounterDelta::between(current, next))
}

/// Dispatch a follow/unfollow against the current relationship
///
/// `Follow` while active and `Unfollow` while inactive leave the state as is
/// with a zero delta.
pub fn dispatch_relationship(active: bool, action: RelationshipAction) -> Transition<bool> {
    let next = match action {
        RelationshipAction::Follow => true,
        RelationshipAction::Unfollow => false,
        RelationshipAction::Toggle => !active,
    };

    let delta = match (active, next) {
        (false, true) => CounterDelta::followers(1),
        (true, false) => CounterDelta::followers(-1),
        _ => CounterDelta::ZERO,
    };

    Transition::new(next, delta)
}
