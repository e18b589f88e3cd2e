//! User-facing events emitted by the mutation pipeline

mod notice;

pub use notice::{Notice, NoticeKind};
