//! Application layer: ordering engine and tree collaborator
//!
//! This layer applies the ordering rules of the domain through the storage
//! traits of the infrastructure layer.

pub mod engine;
pub mod error;
pub mod outline;
pub mod tree;

pub use engine::OrderingEngine;
pub use error::{
    ApplicationError, ApplicationResult, OrderingError, OrderingResult, WriteStage,
};
pub use outline::{Outline, OutlineBuilder};
pub use tree::{DestroyStrategy, OrderedTree};
