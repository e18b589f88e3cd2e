//! Sync failure type
//!
//! Network, authorization and not-found errors from the backend all collapse
//! into one failure. Callers roll back the same way regardless of the cause.

use reel_core::DomainError;

/// A remote sync call did not complete
#[derive(Debug, Clone, thiserror::Error)]
#[error("Sync failed: {cause}")]
pub struct SyncFailure {
    cause: DomainError,
}

impl SyncFailure {
    pub fn new(cause: DomainError) -> Self {
        Self { cause }
    }

    /// The underlying collaborator error (for logs only)
    pub fn cause(&self) -> &DomainError {
        &self.cause
    }

    pub fn into_cause(self) -> DomainError {
        self.cause
    }
}

impl From<DomainError> for SyncFailure {
    fn from(err: DomainError) -> Self {
        Self::new(err)
    }
}
