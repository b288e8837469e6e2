//! Ordered tree: parent/child lifecycle on top of the ordering engine
//!
//! Owns every `parent_id` transition and fires the engine's rearrange hook
//! after each one, so sibling groups stay dense across inserts, reparenting
//! and removal.

use tracing::{debug, instrument};

use crate::application::engine::OrderingEngine;
use crate::application::error::{OrderingError, OrderingResult, WriteStage};
use crate::config::Settings;
use crate::domain::{GroupKey, Node, NodeData, NodeId, RelocationPhase};
use crate::infrastructure::TreeStore;

/// What happens to a node's children when the node is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DestroyStrategy {
    /// Children are appended, in order, to the node's own group
    #[default]
    MoveChildrenToParent,
    /// Children become roots, appended to the root group
    NullifyChildren,
    /// The whole subtree is removed
    DestroyChildren,
}

#[derive(Debug)]
pub struct OrderedTree<S> {
    engine: OrderingEngine<S>,
}

impl<S: TreeStore> OrderedTree<S> {
    pub fn new(store: S) -> Self {
        Self {
            engine: OrderingEngine::new(store),
        }
    }

    pub fn with_settings(store: S, settings: Settings) -> Self {
        Self {
            engine: OrderingEngine::with_settings(store, settings),
        }
    }

    pub fn engine(&self) -> &OrderingEngine<S> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut OrderingEngine<S> {
        &mut self.engine
    }

    pub fn store(&self) -> &S {
        self.engine.store()
    }

    pub fn node(&self, id: NodeId) -> OrderingResult<Node> {
        Ok(self.store().node(id)?)
    }

    /// Create a node at the end of its parent's list.
    #[instrument(level = "debug", skip(self))]
    pub fn insert(&mut self, data: NodeData, parent: Option<NodeId>) -> OrderingResult<NodeId> {
        let id = self.engine.store_mut().insert(data, parent)?;
        self.engine.assign_default_position(id)?;
        Ok(id)
    }

    /// Move a node under a new parent, appending it to that parent's list.
    ///
    /// The group it leaves is compacted first. Reparenting under the current
    /// parent is a no-op.
    #[instrument(level = "debug", skip(self))]
    pub fn reparent(&mut self, id: NodeId, parent: Option<NodeId>) -> OrderingResult<()> {
        let node = self.node(id)?;
        if node.parent_id == parent {
            return Ok(());
        }
        if let Some(parent_id) = parent {
            self.node(parent_id)?;
        }
        self.engine.ensure_not_within(id, parent)?;
        self.engine
            .close_gap(id, WriteStage::Relocation(RelocationPhase::CompactOrigin))?;
        self.engine.rearrange(id, parent)?;
        Ok(())
    }

    /// Children in list order.
    pub fn children(&self, id: NodeId) -> OrderingResult<Vec<Node>> {
        self.engine.list(GroupKey::Children(id))
    }

    /// Roots in list order.
    pub fn roots(&self) -> OrderingResult<Vec<Node>> {
        self.engine.list(GroupKey::Root)
    }

    pub fn is_leaf(&self, id: NodeId) -> OrderingResult<bool> {
        Ok(self.children(id)?.is_empty())
    }

    /// The node and all its descendants, children before parents.
    pub fn subtree_postorder(&self, id: NodeId) -> OrderingResult<Vec<NodeId>> {
        let mut out = Vec::new();
        let mut stack = vec![(id, false)];
        while let Some((current, visited)) = stack.pop() {
            if visited {
                out.push(current);
            } else {
                stack.push((current, true));
                for child in self.children(current)?.iter().rev() {
                    stack.push((child.id, false));
                }
            }
        }
        Ok(out)
    }

    /// Append all children, in order, to the end of the node's own list.
    #[instrument(level = "debug", skip(self))]
    pub fn move_children_to_parent(&mut self, id: NodeId) -> OrderingResult<()> {
        let parent = self.node(id)?.parent_id;
        for child in self.children(id)? {
            self.reparent(child.id, parent)?;
        }
        Ok(())
    }

    /// Turn all children into roots, appended in order.
    #[instrument(level = "debug", skip(self))]
    pub fn nullify_children(&mut self, id: NodeId) -> OrderingResult<()> {
        for child in self.children(id)? {
            self.reparent(child.id, None)?;
        }
        Ok(())
    }

    /// Remove every descendant of the node.
    #[instrument(level = "debug", skip(self))]
    pub fn destroy_children(&mut self, id: NodeId) -> OrderingResult<()> {
        for child in self.children(id)? {
            for victim in self.subtree_postorder(child.id)? {
                self.engine
                    .store_mut()
                    .remove(victim)
                    .map_err(|e| OrderingError::persist(WriteStage::Destroy, e))?;
            }
        }
        Ok(())
    }

    /// Handle the children per `strategy`, then remove the node and compact its group.
    #[instrument(level = "debug", skip(self))]
    pub fn destroy(&mut self, id: NodeId, strategy: DestroyStrategy) -> OrderingResult<Node> {
        match strategy {
            DestroyStrategy::MoveChildrenToParent => self.move_children_to_parent(id)?,
            DestroyStrategy::NullifyChildren => self.nullify_children(id)?,
            DestroyStrategy::DestroyChildren => self.destroy_children(id)?,
        }
        self.engine.close_gap(id, WriteStage::Destroy)?;
        let removed = self
            .engine
            .store_mut()
            .remove(id)
            .map_err(|e| OrderingError::persist(WriteStage::Destroy, e))?;
        debug!("destroy: removed {} ({})", id, removed.data);
        Ok(removed)
    }
}
