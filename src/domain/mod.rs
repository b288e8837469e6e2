//! Domain layer: entities and ordering rules
//!
//! This layer is independent of external concerns (no storage, no config loading).

pub mod entities;
pub mod error;
pub mod plan;

pub use entities::*;
pub use error::DomainError;
pub use plan::{Placement, RelocationPhase, ShiftPlan, ShiftRange};
