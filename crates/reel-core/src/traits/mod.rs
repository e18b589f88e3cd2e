//! Collaborator traits - ports to the external backend

mod collaborators;

pub use collaborators::{
    CollabResult, CommentCollaborator, FollowCollaborator, FollowFilter, ReactionCollaborator,
    ReactionFilter, SubscriptionCollaborator, SubscriptionFilter, VideoCounterCollaborator,
};
