//! Infrastructure layer: storage boundary and the in-memory store
//!
//! This layer defines the sibling store traits and implements them over a
//! generational arena.

pub mod arena;
pub mod error;
pub mod traits;

pub use arena::ArenaStore;
pub use error::{StoreError, StoreResult};
pub use traits::{SiblingStore, TreeStore};
