//! Persistence layer: snapshot the full store state to disk after every
//! mutation, restore it once at startup.

pub mod serialization;
pub mod snapshot;
