//! Integration test utilities for the reel client core
//!
//! Builds a full sync context over the in-memory backend so the mutation
//! pipeline can be driven end to end.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
