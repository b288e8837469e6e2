//! Dense sibling ordering for trees.
//!
//! Every sibling group keeps integer positions `0..n` matching list order.
//! [`OrderingEngine`] answers order queries (`lower_items`, `higher_items`,
//! `first_item_in_list`, `last_item_in_list`, `at_top`, `at_bottom`) and
//! relocates nodes with `move_above`, `move_below`, `move_to_top` and
//! `move_to_bottom`, also across parents. Storage is abstracted behind
//! [`SiblingStore`]; [`ArenaStore`] is the in-memory implementation and
//! [`OrderedTree`] the tree collaborator that owns parent changes.
//!
//! ```
//! use treeorder::{ArenaStore, NodeData, OrderedTree};
//!
//! let mut tree = OrderedTree::new(ArenaStore::new());
//! let r1 = tree.insert(NodeData::new("r1"), None).unwrap();
//! let r2 = tree.insert(NodeData::new("r2"), None).unwrap();
//! let r3 = tree.insert(NodeData::new("r3"), None).unwrap();
//!
//! tree.engine_mut().move_above(r3, r2).unwrap();
//!
//! let order: Vec<_> = tree.roots().unwrap().into_iter().map(|n| n.id).collect();
//! assert_eq!(order, vec![r1, r3, r2]);
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod render;
pub mod util;

pub use application::{
    ApplicationError, ApplicationResult, DestroyStrategy, OrderedTree, OrderingEngine,
    OrderingError, OrderingResult, Outline, OutlineBuilder, WriteStage,
};
pub use config::{SelfTargetPolicy, Settings};
pub use domain::{GroupKey, Node, NodeData, NodeId, Placement, RelocationPhase};
pub use infrastructure::{ArenaStore, SiblingStore, StoreError, StoreResult, TreeStore};
pub use render::TreeRender;
