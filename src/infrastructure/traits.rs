//! Storage boundary traits
//!
//! The ordering engine only talks to storage through these traits, so it can
//! run against the in-memory arena, a database adapter, or a test double that
//! injects failures.

use crate::domain::{GroupKey, Node, NodeData, NodeId};
use crate::infrastructure::StoreResult;

/// Reads and persists the ordering fields of nodes.
pub trait SiblingStore {
    /// Fetch a snapshot of one node.
    fn node(&self, id: NodeId) -> StoreResult<Node>;

    /// All members of a sibling group, in no guaranteed order.
    ///
    /// Fails with `NotFound` when the group's parent does not exist.
    fn group(&self, key: GroupKey) -> StoreResult<Vec<Node>>;

    /// Persist a node's position (`None` unsets it). Clears `parent_changed`.
    fn set_position(&mut self, id: NodeId, position: Option<u32>) -> StoreResult<()>;

    /// Atomically add `delta` to a node's position.
    ///
    /// Fails when the position is unset or would drop below zero.
    fn inc_position(&mut self, id: NodeId, delta: i32) -> StoreResult<()>;

    /// Persist a parent change. Sets `parent_changed` when the parent differs.
    fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) -> StoreResult<()>;

    /// Group members other than `id`.
    fn siblings(&self, id: NodeId) -> StoreResult<Vec<Node>> {
        let node = self.node(id)?;
        Ok(self
            .group(node.group())?
            .into_iter()
            .filter(|n| n.id != id)
            .collect())
    }

    /// Group members including `id`.
    fn siblings_and_self(&self, id: NodeId) -> StoreResult<Vec<Node>> {
        let node = self.node(id)?;
        self.group(node.group())
    }
}

/// Node lifecycle operations needed by the tree collaborator.
pub trait TreeStore: SiblingStore {
    /// Create a node with an unset position.
    fn insert(&mut self, data: NodeData, parent: Option<NodeId>) -> StoreResult<NodeId>;

    /// Delete a childless node and return its last snapshot.
    fn remove(&mut self, id: NodeId) -> StoreResult<Node>;

    /// Every stored node, in no guaranteed order.
    fn nodes(&self) -> Vec<Node>;

    fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_ok()
    }
}
