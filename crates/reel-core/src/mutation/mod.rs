//! Mutation dispatcher - pure next-state computation for toggle actions

mod action;
mod dispatcher;

pub use action::{Action, ReactionAction, RelationshipAction};
pub use dispatcher::{dispatch_reaction, dispatch_relationship, Transition};
