//! Shift planning for same-group reordering
//!
//! A move is modeled as removing the node from its slot (closing the gap by
//! shifting the block behind it) and reinserting it next to the target
//! (opening a slot by shifting the block on the other side). Both shifts
//! collapse into one contiguous range of siblings moving by one step in a
//! single direction, plus an optional step for the target itself.

use std::fmt;

use crate::domain::DomainError;

/// Where the moved node lands relative to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Above,
    Below,
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placement::Above => write!(f, "above"),
            Placement::Below => write!(f, "below"),
        }
    }
}

/// Siblings strictly between two positions, shifted by `delta`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftRange {
    /// Exclusive lower bound
    pub after: u32,
    /// Exclusive upper bound
    pub before: u32,
    pub delta: i32,
}

impl ShiftRange {
    pub fn contains(&self, position: u32) -> bool {
        position > self.after && position < self.before
    }
}

/// Writes needed to move a node from `current` next to a target at `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftPlan {
    pub new_position: u32,
    pub range: ShiftRange,
    /// Step applied to the target itself, 0 when it stays put
    pub target_delta: i32,
}

impl ShiftPlan {
    pub fn new(placement: Placement, current: u32, target: u32) -> Result<Self, DomainError> {
        if current == target {
            return Err(DomainError::CoincidentPositions { position: current });
        }
        let moving_up = current > target;
        let plan = match (placement, moving_up) {
            // target and everything up to the old slot slide one later
            (Placement::Above, true) => ShiftPlan {
                new_position: target,
                range: ShiftRange { after: target, before: current, delta: 1 },
                target_delta: 1,
            },
            // old slot closes; target keeps its slot, node takes the one before
            (Placement::Above, false) => ShiftPlan {
                new_position: target - 1,
                range: ShiftRange { after: current, before: target, delta: -1 },
                target_delta: 0,
            },
            (Placement::Below, true) => ShiftPlan {
                new_position: target + 1,
                range: ShiftRange { after: target, before: current, delta: 1 },
                target_delta: 0,
            },
            (Placement::Below, false) => ShiftPlan {
                new_position: target,
                range: ShiftRange { after: current, before: target, delta: -1 },
                target_delta: -1,
            },
        };
        Ok(plan)
    }
}

/// Phases of a relocation. Same-group moves start at `Reorder`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelocationPhase {
    /// Close the gap the node leaves in its old group
    CompactOrigin,
    /// Persist the new parent and append the node to the new group
    Reparent,
    /// Reorder within the now shared group
    Reorder,
}

impl fmt::Display for RelocationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RelocationPhase::CompactOrigin => "compact-origin",
            RelocationPhase::Reparent => "reparent",
            RelocationPhase::Reorder => "reorder",
        };
        write!(f, "{}", name)
    }
}
