//! Ordering engine
//!
//! Keeps the positions of every sibling group dense (exactly `0..n`) while
//! answering order queries and relocating nodes within or across groups.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::application::error::{OrderingError, OrderingResult, WriteStage};
use crate::config::{SelfTargetPolicy, Settings};
use crate::domain::{sort_by_position, GroupKey, Node, NodeId, Placement, RelocationPhase, ShiftPlan};
use crate::infrastructure::SiblingStore;

/// Sole mutator of node positions in a sibling store.
///
/// Every mutating call takes `&mut self`, so relocations on one engine never
/// interleave. Share an engine across threads behind a lock.
#[derive(Debug)]
pub struct OrderingEngine<S> {
    store: S,
    settings: Arc<Settings>,
}

impl<S: SiblingStore> OrderingEngine<S> {
    pub fn new(store: S) -> Self {
        Self::with_settings(store, Settings::default())
    }

    pub fn with_settings(store: S, settings: Settings) -> Self {
        Self {
            store,
            settings: Arc::new(settings),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Writes through this handle bypass position maintenance.
    pub(crate) fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ============================================================
    // Queries
    // ============================================================

    /// Members of a group in list order.
    #[instrument(level = "debug", skip(self))]
    pub fn list(&self, key: GroupKey) -> OrderingResult<Vec<Node>> {
        let mut members = self.store.group(key)?;
        sort_by_position(&mut members);
        Ok(members)
    }

    /// Siblings after the node, nearest first.
    #[instrument(level = "debug", skip(self))]
    pub fn lower_items(&self, id: NodeId) -> OrderingResult<Vec<Node>> {
        let node = self.store.node(id)?;
        let Some(position) = node.position else {
            return Ok(Vec::new());
        };
        let mut lower: Vec<Node> = self
            .store
            .siblings(id)?
            .into_iter()
            .filter(|n| n.position.is_some_and(|p| p > position))
            .collect();
        sort_by_position(&mut lower);
        Ok(lower)
    }

    /// Siblings before the node, in list order (nearest last).
    #[instrument(level = "debug", skip(self))]
    pub fn higher_items(&self, id: NodeId) -> OrderingResult<Vec<Node>> {
        let node = self.store.node(id)?;
        let Some(position) = node.position else {
            return Ok(Vec::new());
        };
        let mut higher: Vec<Node> = self
            .store
            .siblings(id)?
            .into_iter()
            .filter(|n| n.position.is_some_and(|p| p < position))
            .collect();
        sort_by_position(&mut higher);
        Ok(higher)
    }

    /// First member of the node's group, possibly the node itself.
    #[instrument(level = "debug", skip(self))]
    pub fn first_item_in_list(&self, id: NodeId) -> OrderingResult<Node> {
        let node = self.store.node(id)?;
        let mut members = self.store.siblings_and_self(id)?;
        sort_by_position(&mut members);
        Ok(members.into_iter().next().unwrap_or(node))
    }

    /// Last positioned member of the node's group, possibly the node itself.
    #[instrument(level = "debug", skip(self))]
    pub fn last_item_in_list(&self, id: NodeId) -> OrderingResult<Node> {
        let node = self.store.node(id)?;
        let mut members = self.store.siblings_and_self(id)?;
        sort_by_position(&mut members);
        Ok(members
            .into_iter()
            .rev()
            .find(|n| n.position.is_some())
            .unwrap_or(node))
    }

    pub fn at_top(&self, id: NodeId) -> OrderingResult<bool> {
        Ok(self.higher_items(id)?.is_empty())
    }

    pub fn at_bottom(&self, id: NodeId) -> OrderingResult<bool> {
        Ok(self.lower_items(id)?.is_empty())
    }

    // ============================================================
    // Default position assignment (rearrange hook)
    // ============================================================

    /// Give an unpositioned or just-reparented node the next free slot.
    ///
    /// A position left over from a previous parent is discarded. The node is
    /// appended after the highest positioned sibling, or placed at 0 when no
    /// sibling has a position. Siblings are never shifted.
    #[instrument(level = "debug", skip(self))]
    pub fn assign_default_position(&mut self, id: NodeId) -> OrderingResult<u32> {
        self.assign_position(id, WriteStage::DefaultPosition)
    }

    /// Default assignment whose failed write is reported as `stage`.
    fn assign_position(&mut self, id: NodeId, stage: WriteStage) -> OrderingResult<u32> {
        let node = self.store.node(id)?;
        if !node.parent_changed {
            if let Some(position) = node.position {
                return Ok(position);
            }
        }

        let position = self
            .store
            .siblings(id)?
            .iter()
            .filter_map(|n| n.position)
            .max()
            .map_or(0, |max| max + 1);

        self.store
            .set_position(id, Some(position))
            .map_err(|e| OrderingError::persist(stage, e))?;
        debug!("assign_default_position: {} -> {}", id, position);
        Ok(position)
    }

    /// Persist a parent change and run default assignment for it.
    ///
    /// This is the hook the tree collaborator calls after every parent
    /// transition. It does not compact the group the node leaves; see
    /// [`close_gap`](Self::close_gap).
    #[instrument(level = "debug", skip(self))]
    pub fn rearrange(&mut self, id: NodeId, parent: Option<NodeId>) -> OrderingResult<u32> {
        let stage = WriteStage::Relocation(RelocationPhase::Reparent);
        self.store
            .set_parent(id, parent)
            .map_err(|e| OrderingError::persist(stage, e))?;
        self.assign_position(id, stage)
    }

    /// Decrement every sibling below the node, as if it had left the group.
    ///
    /// The node's own position is left untouched, so the group is dense
    /// again only once the node departs.
    #[instrument(level = "debug", skip(self))]
    pub fn close_gap(&mut self, id: NodeId, stage: WriteStage) -> OrderingResult<()> {
        for item in self.lower_items(id)? {
            self.store
                .inc_position(item.id, -1)
                .map_err(|e| OrderingError::persist(stage, e))?;
        }
        Ok(())
    }

    /// Reject a new parent that is the node itself or one of its descendants.
    pub fn ensure_not_within(&self, id: NodeId, new_parent: Option<NodeId>) -> OrderingResult<()> {
        let mut visited = HashSet::new();
        let mut cursor = new_parent;
        while let Some(ancestor) = cursor {
            if ancestor == id {
                return Err(OrderingError::invalid_target(
                    id,
                    new_parent.unwrap_or(id),
                    "new parent lies inside the node's own subtree",
                ));
            }
            if !visited.insert(ancestor) {
                break;
            }
            cursor = self.store.node(ancestor)?.parent_id;
        }
        Ok(())
    }

    // ============================================================
    // Relocation
    // ============================================================

    /// Move the node before all its siblings.
    #[instrument(level = "debug", skip(self))]
    pub fn move_to_top(&mut self, id: NodeId) -> OrderingResult<()> {
        self.ensure_positioned(id, WriteStage::Relocation(RelocationPhase::Reorder))?;
        if self.at_top(id)? {
            debug!("move_to_top: {} already at top", id);
            return Ok(());
        }
        let first = self.first_item_in_list(id)?;
        self.move_above(id, first.id)
    }

    /// Move the node after all its siblings.
    #[instrument(level = "debug", skip(self))]
    pub fn move_to_bottom(&mut self, id: NodeId) -> OrderingResult<()> {
        self.ensure_positioned(id, WriteStage::Relocation(RelocationPhase::Reorder))?;
        if self.at_bottom(id)? {
            debug!("move_to_bottom: {} already at bottom", id);
            return Ok(());
        }
        let last = self.last_item_in_list(id)?;
        self.move_below(id, last.id)
    }

    /// Place the node immediately before `target`, adopting target's parent.
    pub fn move_above(&mut self, id: NodeId, target: NodeId) -> OrderingResult<()> {
        self.relocate(id, target, Placement::Above)
    }

    /// Place the node immediately after `target`, adopting target's parent.
    pub fn move_below(&mut self, id: NodeId, target: NodeId) -> OrderingResult<()> {
        self.relocate(id, target, Placement::Below)
    }

    #[instrument(level = "debug", skip(self))]
    fn relocate(&mut self, id: NodeId, target_id: NodeId, placement: Placement) -> OrderingResult<()> {
        if id == target_id {
            return match self.settings.self_target {
                SelfTargetPolicy::Ignore => {
                    debug!("relocate: {} targets itself, nothing to do", id);
                    Ok(())
                }
                SelfTargetPolicy::Reject => Err(OrderingError::invalid_target(
                    id,
                    target_id,
                    "a node cannot move relative to itself",
                )),
            };
        }

        let target = self.store.node(target_id)?;
        let node = self.store.node(id)?;
        let origin = node.group();

        let mut phase = if node.parent_id == target.parent_id {
            RelocationPhase::Reorder
        } else {
            self.ensure_not_within(id, target.parent_id)?;
            RelocationPhase::CompactOrigin
        };

        loop {
            debug!("relocate: {} {} {}, phase {}", id, placement, target_id, phase);
            phase = match phase {
                RelocationPhase::CompactOrigin => {
                    self.close_gap(id, WriteStage::Relocation(phase))?;
                    RelocationPhase::Reparent
                }
                RelocationPhase::Reparent => {
                    self.rearrange(id, target.parent_id)?;
                    RelocationPhase::Reorder
                }
                RelocationPhase::Reorder => {
                    self.reorder(id, target_id, placement)?;
                    break;
                }
            };
        }

        if self.settings.verify_after_move {
            self.warn_if_not_dense(origin);
            self.warn_if_not_dense(target.group());
        }
        Ok(())
    }

    /// Same-group move of `id` next to `target_id`.
    fn reorder(&mut self, id: NodeId, target_id: NodeId, placement: Placement) -> OrderingResult<()> {
        let stage = WriteStage::Relocation(RelocationPhase::Reorder);
        let (node, current) = self.ensure_positioned(id, stage)?;
        let (target, target_position) = self.ensure_positioned(target_id, stage)?;
        if node.parent_id != target.parent_id {
            return Err(OrderingError::invalid_target(
                id,
                target_id,
                "target is not a sibling after reparenting",
            ));
        }

        let plan = ShiftPlan::new(placement, current, target_position)?;
        debug!("reorder: {} from {} to {}, plan {:?}", id, current, plan.new_position, plan);

        for sibling in self.store.siblings(id)? {
            if sibling.id == target_id {
                continue;
            }
            if sibling.position.is_some_and(|p| plan.range.contains(p)) {
                self.store
                    .inc_position(sibling.id, plan.range.delta)
                    .map_err(|e| OrderingError::persist(stage, e))?;
            }
        }
        if plan.target_delta != 0 {
            self.store
                .inc_position(target_id, plan.target_delta)
                .map_err(|e| OrderingError::persist(stage, e))?;
        }
        self.store
            .set_position(id, Some(plan.new_position))
            .map_err(|e| OrderingError::persist(stage, e))
    }

    /// Snapshot of a node whose position is guaranteed to be current.
    fn ensure_positioned(&mut self, id: NodeId, stage: WriteStage) -> OrderingResult<(Node, u32)> {
        let node = self.store.node(id)?;
        match node.position {
            Some(position) if !node.parent_changed => Ok((node, position)),
            _ => {
                let position = self.assign_position(id, stage)?;
                Ok((self.store.node(id)?, position))
            }
        }
    }

    // ============================================================
    // Verification and repair
    // ============================================================

    /// Check that a group's positions are exactly `0..n`.
    #[instrument(level = "debug", skip(self))]
    pub fn verify_group(&self, key: GroupKey) -> OrderingResult<()> {
        let members = self.list(key)?;
        let dense = members
            .iter()
            .enumerate()
            .all(|(i, n)| n.position == u32::try_from(i).ok());
        if dense {
            Ok(())
        } else {
            Err(OrderingError::NotDense {
                group: key,
                found: members.iter().map(|n| n.position).collect(),
            })
        }
    }

    /// Rewrite a group's positions to `0..n`, keeping the current order.
    ///
    /// Unset positions sort last; ties keep store order. Only members whose
    /// position changes are written. Returns the number of writes.
    #[instrument(level = "debug", skip(self))]
    pub fn repair_group(&mut self, key: GroupKey) -> OrderingResult<usize> {
        let members = self.list(key)?;
        let mut writes = 0;
        for (position, node) in (0u32..).zip(members.iter()) {
            if node.position != Some(position) {
                self.store
                    .set_position(node.id, Some(position))
                    .map_err(|e| OrderingError::persist(WriteStage::Repair, e))?;
                writes += 1;
            }
        }
        if writes > 0 {
            info!("repair_group: rewrote {} positions in {}", writes, key);
        }
        Ok(writes)
    }

    fn warn_if_not_dense(&self, key: GroupKey) {
        if let Err(e) = self.verify_group(key) {
            warn!("post-move verification: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NodeData;
    use crate::infrastructure::{ArenaStore, TreeStore};

    /// Roots with positions 0..n assigned through the engine.
    fn engine_with_roots(names: &[&str]) -> (OrderingEngine<ArenaStore>, Vec<NodeId>) {
        let mut engine = OrderingEngine::new(ArenaStore::new());
        let ids = names
            .iter()
            .map(|name| {
                let id = engine.store_mut().insert(NodeData::new(*name), None).unwrap();
                engine.assign_default_position(id).unwrap();
                id
            })
            .collect();
        (engine, ids)
    }

    fn names(nodes: &[Node]) -> Vec<String> {
        nodes.iter().map(|n| n.name().to_string()).collect()
    }

    #[test]
    fn given_fresh_roots_when_assigning_then_appends_in_order() {
        let (engine, ids) = engine_with_roots(&["a", "b", "c"]);
        for (i, id) in ids.iter().enumerate() {
            assert_eq!(engine.store().node(*id).unwrap().position, Some(i as u32));
        }
    }

    #[test]
    fn given_all_siblings_unset_when_assigning_then_zero() {
        let mut engine = OrderingEngine::new(ArenaStore::new());
        let a = engine.store_mut().insert(NodeData::new("a"), None).unwrap();
        let b = engine.store_mut().insert(NodeData::new("b"), None).unwrap();
        assert_eq!(engine.assign_default_position(b).unwrap(), 0);
        assert_eq!(engine.assign_default_position(a).unwrap(), 1);
    }

    #[test]
    fn given_positioned_node_when_assigning_again_then_no_write() {
        let (mut engine, ids) = engine_with_roots(&["a", "b"]);
        let before = engine.store().writes();
        assert_eq!(engine.assign_default_position(ids[1]).unwrap(), 1);
        assert_eq!(engine.store().writes(), before);
    }

    #[test]
    fn given_roots_when_querying_then_lower_and_higher_sorted() {
        let (engine, ids) = engine_with_roots(&["a", "b", "c"]);
        assert_eq!(names(&engine.lower_items(ids[0]).unwrap()), vec!["b", "c"]);
        assert_eq!(names(&engine.higher_items(ids[2]).unwrap()), vec!["a", "b"]);
        assert_eq!(engine.first_item_in_list(ids[1]).unwrap().id, ids[0]);
        assert_eq!(engine.last_item_in_list(ids[1]).unwrap().id, ids[2]);
        assert!(engine.at_top(ids[0]).unwrap());
        assert!(engine.at_bottom(ids[2]).unwrap());
        assert!(!engine.at_top(ids[1]).unwrap());
    }

    #[test]
    fn given_three_roots_when_last_moves_above_middle_then_positions_follow() {
        let (mut engine, ids) = engine_with_roots(&["r1", "r2", "r3"]);
        engine.move_above(ids[2], ids[1]).unwrap();
        assert_eq!(names(&engine.list(GroupKey::Root).unwrap()), vec!["r1", "r3", "r2"]);
        engine.verify_group(GroupKey::Root).unwrap();
    }

    #[test]
    fn given_self_target_when_reject_policy_then_invalid_target() {
        let store = ArenaStore::new();
        let settings = Settings {
            self_target: SelfTargetPolicy::Reject,
            ..Settings::default()
        };
        let mut engine = OrderingEngine::with_settings(store, settings);
        let a = engine.store_mut().insert(NodeData::new("a"), None).unwrap();
        engine.assign_default_position(a).unwrap();
        assert!(matches!(
            engine.move_below(a, a),
            Err(OrderingError::InvalidTarget { .. })
        ));
    }

    #[test]
    fn given_sparse_group_when_repairing_then_dense_and_order_kept() {
        let (mut engine, ids) = engine_with_roots(&["a", "b", "c"]);
        engine.store_mut().set_position(ids[0], Some(4)).unwrap();
        engine.store_mut().set_position(ids[1], None).unwrap();
        assert!(matches!(
            engine.verify_group(GroupKey::Root),
            Err(OrderingError::NotDense { .. })
        ));

        let writes = engine.repair_group(GroupKey::Root).unwrap();
        assert_eq!(writes, 3);
        assert_eq!(names(&engine.list(GroupKey::Root).unwrap()), vec!["c", "a", "b"]);
        engine.verify_group(GroupKey::Root).unwrap();
        assert_eq!(engine.repair_group(GroupKey::Root).unwrap(), 0);
    }

    #[test]
    fn given_descendant_as_new_parent_when_checking_then_rejected() {
        let (mut engine, ids) = engine_with_roots(&["a"]);
        let child = engine.store_mut().insert(NodeData::new("child"), Some(ids[0])).unwrap();
        assert!(engine.ensure_not_within(ids[0], Some(child)).is_err());
        assert!(engine.ensure_not_within(ids[0], Some(ids[0])).is_err());
        assert!(engine.ensure_not_within(child, None).is_ok());
    }
}
