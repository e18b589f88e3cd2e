//! In-memory collaborator implementations

mod comment;
mod follow;
mod reaction;
mod subscription;
mod video;

pub use comment::MemoryComments;
pub use follow::MemoryFollows;
pub use reaction::MemoryReactions;
pub use subscription::MemorySubscriptions;
pub use video::MemoryVideos;
