//! Domain entities: core data structures

use std::fmt;

use generational_arena::Index;

/// Stable identity of a node for its whole lifetime.
///
/// Wraps an arena index, so an id of a removed node never resolves to a
/// node inserted later in the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(Index);

impl NodeId {
    pub fn from_index(index: Index) -> Self {
        Self(index)
    }

    pub fn index(self) -> Index {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "#{}v{}", slot, generation)
    }
}

/// Key of a sibling group. All roots share one canonical group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Root,
    Children(NodeId),
}


impl From<Option<NodeId>> for GroupKey {
    fn from(parent: Option<NodeId>) -> Self {
        parent.map_or(GroupKey::Root, GroupKey::Children)
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Root => write!(f, "roots"),
            GroupKey::Children(parent) => write!(f, "children of {}", parent),
        }
    }
}

/// Caller payload carried by every node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    /// Display name, unique only by convention
    pub name: String,
}

impl NodeData {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Snapshot of a stored node as read from a sibling store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    /// Parent reference, None for roots
    pub parent_id: Option<NodeId>,
    /// Rank within the sibling group, None until assigned
    pub position: Option<u32>,
    /// Set when `parent_id` was written and no position has been written since
    pub parent_changed: bool,
    pub data: NodeData,
}

impl Node {
    pub fn group(&self) -> GroupKey {
        GroupKey::from(self.parent_id)
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }
}

/// Sorts nodes ascending by position; unset positions go last, keeping
/// their relative input order.
pub fn sort_by_position(nodes: &mut [Node]) {
    nodes.sort_by_key(|n| (n.position.is_none(), n.position));
}
