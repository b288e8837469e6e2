use generational_arena::Arena;
use tracing::{instrument, trace};

use crate::domain::{GroupKey, Node, NodeData, NodeId};
use crate::infrastructure::traits::{SiblingStore, TreeStore};
use crate::infrastructure::{StoreError, StoreResult};

/// Node record in the arena.
#[derive(Debug)]
struct ArenaNode {
    data: NodeData,
    /// Parent node, None for roots
    parent: Option<NodeId>,
    position: Option<u32>,
    parent_changed: bool,
    /// Child ids in insertion order, not position order
    children: Vec<NodeId>,
}

/// In-memory sibling store backed by a generational arena.
///
/// Stale ids of removed nodes resolve to `NotFound`. Every successful
/// mutation bumps a write counter so callers can observe write-free paths.
#[derive(Debug, Default)]
pub struct ArenaStore {
    arena: Arena<ArenaNode>,
    /// Root ids in insertion order
    roots: Vec<NodeId>,
    writes: usize,
}

impl ArenaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Number of successful mutations since creation.
    pub fn writes(&self) -> usize {
        self.writes
    }

    fn get(&self, id: NodeId) -> StoreResult<&ArenaNode> {
        self.arena.get(id.index()).ok_or(StoreError::NotFound(id))
    }

    fn get_mut(&mut self, id: NodeId) -> StoreResult<&mut ArenaNode> {
        self.arena.get_mut(id.index()).ok_or(StoreError::NotFound(id))
    }

    fn snapshot(id: NodeId, node: &ArenaNode) -> Node {
        Node {
            id,
            parent_id: node.parent,
            position: node.position,
            parent_changed: node.parent_changed,
            data: node.data.clone(),
        }
    }

    fn members(&self, key: GroupKey) -> StoreResult<&Vec<NodeId>> {
        match key {
            GroupKey::Root => Ok(&self.roots),
            GroupKey::Children(parent) => Ok(&self.get(parent)?.children),
        }
    }

    fn members_mut(&mut self, key: GroupKey) -> StoreResult<&mut Vec<NodeId>> {
        match key {
            GroupKey::Root => Ok(&mut self.roots),
            GroupKey::Children(parent) => Ok(&mut self.get_mut(parent)?.children),
        }
    }
}

impl SiblingStore for ArenaStore {
    #[instrument(level = "trace", skip(self))]
    fn node(&self, id: NodeId) -> StoreResult<Node> {
        self.get(id).map(|node| Self::snapshot(id, node))
    }

    #[instrument(level = "trace", skip(self))]
    fn group(&self, key: GroupKey) -> StoreResult<Vec<Node>> {
        self.members(key)?
            .iter()
            .map(|&id| self.node(id))
            .collect()
    }

    #[instrument(level = "trace", skip(self))]
    fn set_position(&mut self, id: NodeId, position: Option<u32>) -> StoreResult<()> {
        let node = self.get_mut(id)?;
        node.position = position;
        node.parent_changed = false;
        self.writes += 1;
        Ok(())
    }

    #[instrument(level = "trace", skip(self))]
    fn inc_position(&mut self, id: NodeId, delta: i32) -> StoreResult<()> {
        let node = self.get_mut(id)?;
        let current = node
            .position
            .ok_or_else(|| StoreError::rejected(id, "cannot increment an unset position"))?;
        let next = current
            .checked_add_signed(delta)
            .ok_or_else(|| StoreError::rejected(id, format!("position {} {:+} out of range", current, delta)))?;
        node.position = Some(next);
        self.writes += 1;
        Ok(())
    }

    #[instrument(level = "trace", skip(self))]
    fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) -> StoreResult<()> {
        if parent == Some(id) {
            return Err(StoreError::rejected(id, "node cannot be its own parent"));
        }
        if let Some(parent_id) = parent {
            self.get(parent_id)?;
        }
        let old_parent = self.get(id)?.parent;
        if old_parent == parent {
            return Ok(());
        }

        self.members_mut(GroupKey::from(old_parent))?
            .retain(|&member| member != id);
        self.members_mut(GroupKey::from(parent))?.push(id);

        let node = self.get_mut(id)?;
        node.parent = parent;
        node.parent_changed = true;
        self.writes += 1;
        trace!("set_parent: {} moved from {:?} to {:?}", id, old_parent, parent);
        Ok(())
    }
}

impl TreeStore for ArenaStore {
    #[instrument(level = "trace", skip(self))]
    fn insert(&mut self, data: NodeData, parent: Option<NodeId>) -> StoreResult<NodeId> {
        if let Some(parent_id) = parent {
            self.get(parent_id)?;
        }
        let node = ArenaNode {
            data,
            parent,
            position: None,
            parent_changed: false,
            children: Vec::new(),
        };
        let id = NodeId::from_index(self.arena.insert(node));
        self.members_mut(GroupKey::from(parent))?.push(id);
        self.writes += 1;
        Ok(id)
    }

    #[instrument(level = "trace", skip(self))]
    fn remove(&mut self, id: NodeId) -> StoreResult<Node> {
        let node = self.get(id)?;
        if !node.children.is_empty() {
            return Err(StoreError::rejected(
                id,
                format!("node still has {} children", node.children.len()),
            ));
        }
        let key = GroupKey::from(node.parent);
        self.members_mut(key)?.retain(|&member| member != id);
        let removed = self
            .arena
            .remove(id.index())
            .ok_or(StoreError::NotFound(id))?;
        self.writes += 1;
        Ok(Self::snapshot(id, &removed))
    }

    fn nodes(&self) -> Vec<Node> {
        self.arena
            .iter()
            .map(|(idx, node)| Self::snapshot(NodeId::from_index(idx), node))
            .collect()
    }

    fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id.index())
    }
}
