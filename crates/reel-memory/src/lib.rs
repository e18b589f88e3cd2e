//! # reel-memory
//!
//! In-process implementations of every collaborator trait defined in
//! `reel-core`. Used by tests and local development in place of the hosted
//! backend.
//!
//! All tables of one [`MemoryBackend`] share a [`FaultPlan`], which can fail
//! the next calls, add latency, or hold every call until released.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use reel_memory::{FaultKind, MemoryBackend};
//!
//! let backend = MemoryBackend::new();
//! backend.videos().insert(VideoId::new("v1"), 10, 0);
//! backend.faults().fail_next(1, FaultKind::Network);
//! ```

pub mod backend;
pub mod faults;
pub mod repositories;

pub use backend::MemoryBackend;
pub use faults::{FaultKind, FaultPlan};
pub use repositories::{
    MemoryComments, MemoryFollows, MemoryReactions, MemorySubscriptions, MemoryVideos,
};
