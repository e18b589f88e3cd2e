//! Value objects - immutable types that represent domain concepts

mod ids;
mod subject;

pub use ids::{RecordId, UserId, VideoId};
pub use subject::{SubjectKey, SubjectKind};
