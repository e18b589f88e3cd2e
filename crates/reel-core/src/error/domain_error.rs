//! Domain errors - error types for the domain layer

use std::time::Duration;
use thiserror::Error;

use crate::mutation::Action;
use crate::value_objects::SubjectKind;

/// Domain layer errors
#[derive(Debug, Clone, Error)]
pub enum DomainError {
    // =========================================================================
    // Validation Errors (rejected before any local change)
    // =========================================================================
    #[error("Sign in to continue")]
    Unauthenticated,

    #[error("Cannot follow or subscribe to yourself")]
    SelfRelationship,

    #[error("Action {action} is not supported on a {kind} subject")]
    UnsupportedAction { action: Action, kind: SubjectKind },

    #[error("Comment is empty")]
    EmptyComment,

    #[error("Comment too long: max {max} characters")]
    CommentTooLong { max: u64 },

    // =========================================================================
    // Collaborator Errors (reported as sync failures)
    // =========================================================================
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error("Sync context is shut down")]
    ContextClosed,

    #[error("Subject handle was released; open it again")]
    HandleReleased,

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// Get an error code string for the UI layer
    pub fn code(&self) -> &'static str {
        match self {
            // Validation
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::SelfRelationship => "SELF_RELATIONSHIP",
            Self::UnsupportedAction { .. } => "UNSUPPORTED_ACTION",
            Self::EmptyComment => "EMPTY_COMMENT",
            Self::CommentTooLong { .. } => "COMMENT_TOO_LONG",

            // Collaborator
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Network(_) => "NETWORK_ERROR",
            Self::Timeout(_) => "TIMEOUT",

            // Internal
            Self::ContextClosed => "CONTEXT_CLOSED",
            Self::HandleReleased => "HANDLE_RELEASED",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this error is raised before any optimistic change
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Unauthenticated
                | Self::SelfRelationship
                | Self::UnsupportedAction { .. }
                | Self::EmptyComment
                | Self::CommentTooLong { .. }
        )
    }

    /// Check if this error came from the remote collaborator
    pub fn is_sync_failure(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Unauthorized(_) | Self::Network(_) | Self::Timeout(_)
        )
    }
}
