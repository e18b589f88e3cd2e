//! Optimistic mutation pipeline
//!
//! dispatch -> apply -> sync -> (confirm | rollback), one subject at a time.

mod lane;
mod rollback;
mod state;
mod subject;

pub use rollback::RollbackHandler;
pub use state::SubjectState;
pub use subject::{MutationOutcome, PendingMutation, SubjectHandle};
