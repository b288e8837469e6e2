//! Randomized operation sequences keep every sibling group dense

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstest::rstest;

use treeorder::util::testing::init_test_setup;
use treeorder::{
    ArenaStore, DestroyStrategy, GroupKey, NodeData, NodeId, OrderedTree, OrderingError,
    SiblingStore, TreeStore,
};

const STEPS: usize = 300;

fn alive(tree: &OrderedTree<ArenaStore>) -> Vec<NodeId> {
    let mut ids: Vec<NodeId> = tree.store().nodes().into_iter().map(|n| n.id).collect();
    ids.sort();
    ids
}

fn pick(rng: &mut StdRng, ids: &[NodeId]) -> NodeId {
    ids[rng.gen_range(0..ids.len())]
}

fn assert_all_dense(tree: &OrderedTree<ArenaStore>, step: usize, op: &str) {
    let engine = tree.engine();
    if let Err(e) = engine.verify_group(GroupKey::Root) {
        panic!("step {} ({}): {}", step, op, e);
    }
    for id in alive(tree) {
        if let Err(e) = engine.verify_group(GroupKey::Children(id)) {
            panic!("step {} ({}): {}", step, op, e);
        }
    }
}

fn run_sequence(seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut tree = OrderedTree::new(ArenaStore::new());
    let mut counter = 0usize;

    for step in 0..STEPS {
        let ids = alive(&tree);
        let choice = if ids.len() < 3 { 0 } else { rng.gen_range(0..9) };
        let op;
        let result: Result<(), OrderingError> = match choice {
            0 | 1 => {
                counter += 1;
                let parent = if ids.is_empty() || rng.gen_bool(0.3) {
                    None
                } else {
                    Some(pick(&mut rng, &ids))
                };
                op = "insert";
                tree.insert(NodeData::new(format!("n{}", counter)), parent)
                    .map(|_| ())
            }
            2 => {
                op = "move_above";
                let (n, t) = (pick(&mut rng, &ids), pick(&mut rng, &ids));
                tree.engine_mut().move_above(n, t)
            }
            3 => {
                op = "move_below";
                let (n, t) = (pick(&mut rng, &ids), pick(&mut rng, &ids));
                tree.engine_mut().move_below(n, t)
            }
            4 => {
                op = "move_to_top";
                let n = pick(&mut rng, &ids);
                tree.engine_mut().move_to_top(n)
            }
            5 => {
                op = "move_to_bottom";
                let n = pick(&mut rng, &ids);
                tree.engine_mut().move_to_bottom(n)
            }
            6 => {
                op = "reparent";
                let n = pick(&mut rng, &ids);
                let parent = if rng.gen_bool(0.25) {
                    None
                } else {
                    Some(pick(&mut rng, &ids))
                };
                tree.reparent(n, parent)
            }
            _ => {
                op = "destroy";
                let n = pick(&mut rng, &ids);
                let strategy = match rng.gen_range(0..3) {
                    0 => DestroyStrategy::MoveChildrenToParent,
                    1 => DestroyStrategy::NullifyChildren,
                    _ => DestroyStrategy::DestroyChildren,
                };
                tree.destroy(n, strategy).map(|_| ())
            }
        };

        match result {
            Ok(()) | Err(OrderingError::InvalidTarget { .. }) => {}
            Err(e) => panic!("step {} ({}): unexpected error {}", step, op, e),
        }
        assert_all_dense(&tree, step, op);
    }
}

#[rstest]
#[case(1)]
#[case(7)]
#[case(42)]
#[case(2024)]
fn given_random_operations_when_applied_then_every_group_stays_dense(#[case] seed: u64) {
    init_test_setup();
    run_sequence(seed);
}

#[test]
fn given_random_moves_when_targets_positioned_then_moved_node_adjacent() {
    init_test_setup();
    let mut rng = StdRng::seed_from_u64(99);
    let mut tree = OrderedTree::new(ArenaStore::new());
    let parents: Vec<NodeId> = (0..3)
        .map(|i| tree.insert(NodeData::new(format!("p{}", i)), None).unwrap())
        .collect();
    for i in 0..12 {
        let parent = parents[i % parents.len()];
        tree.insert(NodeData::new(format!("c{}", i)), Some(parent)).unwrap();
    }
    let leaves: Vec<NodeId> = alive(&tree)
        .into_iter()
        .filter(|id| !parents.contains(id))
        .collect();

    for _ in 0..100 {
        let n = pick(&mut rng, &leaves);
        let t = pick(&mut rng, &leaves);
        if n == t {
            continue;
        }
        let engine = tree.engine_mut();
        if rng.gen_bool(0.5) {
            engine.move_above(n, t).unwrap();
            assert_eq!(engine.lower_items(n).unwrap()[0].id, t);
            assert_eq!(engine.higher_items(t).unwrap().last().map(|x| x.id), Some(n));
        } else {
            engine.move_below(n, t).unwrap();
            assert_eq!(engine.higher_items(n).unwrap().last().map(|x| x.id), Some(t));
            assert_eq!(engine.lower_items(t).unwrap()[0].id, n);
        }
        assert_eq!(engine.store().node(n).unwrap().parent_id, engine.store().node(t).unwrap().parent_id);
    }
}
