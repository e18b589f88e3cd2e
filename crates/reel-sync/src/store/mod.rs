//! Local state store - the projection the UI renders from

mod local_store;

pub use local_store::{LocalStateStore, Projection, Snapshot, StoreVersion};
