//! Property tests for the structural invariants
//!
//! Scenes are drawn from small id pools so duplicates, self-parents,
//! cycles, dangling parents, legacy groups and unusable orders all show up.

use outliner_engine::{
    flatten_leaves_in_tree_order, move_nodes, normalize, DropPosition, DropTarget, Folder, Leaf,
    NodeKey, Scene,
};
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

const FOLDER_IDS: &[&str] = &["", "a", "b", "c", "d", "e"];
const LEAF_IDS: &[&str] = &["", "l1", "l2", "l3", "l4", "l5", "l6"];
const PARENTS: &[&str] = &["", " ", "a", "b", "c", "d", "e", "ghost"];

fn pick(pool: &'static [&'static str]) -> impl Strategy<Value = String> {
    prop::sample::select(pool).prop_map(str::to_string)
}

fn order() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        Just(None),
        (-2i32..8).prop_map(|o| Some(o as f64)),
        Just(Some(0.5)),
        Just(Some(f64::NAN)),
        Just(Some(f64::NEG_INFINITY)),
    ]
}

fn folder() -> impl Strategy<Value = Folder> {
    (pick(FOLDER_IDS), prop::option::of(pick(PARENTS)), order()).prop_map(
        |(id, parent_id, order)| Folder {
            name: id.to_uppercase(),
            id,
            parent_id,
            order,
        },
    )
}

fn leaf() -> impl Strategy<Value = Leaf> {
    (
        pick(LEAF_IDS),
        prop::option::of(pick(PARENTS)),
        prop::option::of(pick(PARENTS)),
        order(),
    )
        .prop_map(|(id, parent_id, group_id, order)| Leaf {
            id,
            parent_id,
            group_id,
            order,
            ..Default::default()
        })
}

fn scene() -> impl Strategy<Value = Scene> {
    (
        prop::collection::vec(folder(), 0..8),
        prop::collection::vec(leaf(), 0..10),
    )
        .prop_map(|(folders, leaves)| Scene::new(folders, leaves))
}

fn key() -> impl Strategy<Value = NodeKey> {
    prop_oneof![
        pick(FOLDER_IDS).prop_map(NodeKey::Folder),
        pick(LEAF_IDS).prop_map(NodeKey::Leaf),
    ]
}

fn target() -> impl Strategy<Value = DropTarget> {
    (
        prop::option::of(key()),
        prop::option::of(prop_oneof![
            Just(DropPosition::Before),
            Just(DropPosition::After),
            Just(DropPosition::On),
        ]),
    )
        .prop_map(|(key, position)| DropTarget { key, position })
}

fn group_orders(scene: &Scene) -> HashMap<Option<String>, Vec<f64>> {
    let mut groups: HashMap<Option<String>, Vec<f64>> = HashMap::new();
    for folder in &scene.folders {
        groups
            .entry(folder.parent_id.clone())
            .or_default()
            .push(folder.order.unwrap_or(f64::NAN));
    }
    for leaf in &scene.leaves {
        groups
            .entry(leaf.parent_id.clone())
            .or_default()
            .push(leaf.order.unwrap_or(f64::NAN));
    }
    groups
}

fn assert_invariants(scene: &Scene) -> Result<(), TestCaseError> {
    let folder_ids: HashSet<&str> = scene.folders.iter().map(|f| f.id.as_str()).collect();
    let leaf_ids: HashSet<&str> = scene.leaves.iter().map(|l| l.id.as_str()).collect();

    // Unique, non-empty ids
    prop_assert_eq!(folder_ids.len(), scene.folders.len());
    prop_assert_eq!(leaf_ids.len(), scene.leaves.len());
    prop_assert!(scene.folders.iter().all(|f| !f.id.trim().is_empty()));
    prop_assert!(scene.leaves.iter().all(|l| !l.id.trim().is_empty()));

    // Referential validity
    for parent in scene
        .folders
        .iter()
        .map(|f| &f.parent_id)
        .chain(scene.leaves.iter().map(|l| &l.parent_id))
        .flatten()
    {
        prop_assert!(folder_ids.contains(parent.as_str()), "dangling parent {}", parent);
    }

    // Acyclicity: every chain reaches the root within the folder count
    let parents: HashMap<&str, Option<&str>> = scene
        .folders
        .iter()
        .map(|f| (f.id.as_str(), f.parent_id.as_deref()))
        .collect();
    for folder in &scene.folders {
        let mut current = folder.parent_id.as_deref();
        let mut steps = 0;
        while let Some(id) = current {
            steps += 1;
            prop_assert!(steps <= scene.folders.len(), "cycle through {}", folder.id);
            current = parents.get(id).copied().flatten();
        }
    }

    // Rank contiguity
    for (parent, mut orders) in group_orders(scene) {
        orders.sort_by(f64::total_cmp);
        let expected: Vec<f64> = (0..orders.len()).map(|i| i as f64).collect();
        prop_assert_eq!(orders, expected, "group {:?}", parent);
    }

    prop_assert!(scene.leaves.iter().all(|l| l.group_id.is_none()));
    Ok(())
}

proptest! {
    #[test]
    fn normalize_is_idempotent(scene in scene()) {
        let once = normalize(&scene);
        let twice = normalize(&once);
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn normalize_establishes_invariants(scene in scene()) {
        assert_invariants(&normalize(&scene))?;
    }

    #[test]
    fn move_preserves_node_counts(
        scene in scene(),
        keys in prop::collection::vec(key(), 0..4),
        target in target(),
    ) {
        let normalized = normalize(&scene);
        let moved = move_nodes(&scene, &keys, &target);

        prop_assert_eq!(moved.folders.len(), normalized.folders.len());
        prop_assert_eq!(moved.leaves.len(), normalized.leaves.len());
        assert_invariants(&moved)?;
        prop_assert_eq!(normalize(&moved), moved);
    }

    #[test]
    fn paint_order_lists_every_leaf_once(scene in scene()) {
        let normalized = normalize(&scene);
        let painted: Vec<String> = flatten_leaves_in_tree_order(&scene)
            .into_iter()
            .map(|l| l.id)
            .collect();

        let unique: HashSet<&String> = painted.iter().collect();
        prop_assert_eq!(unique.len(), painted.len());
        prop_assert_eq!(painted.len(), normalized.leaves.len());
    }

    #[test]
    fn moving_a_folder_into_its_subtree_is_a_no_op(scene in scene()) {
        let normalized = normalize(&scene);

        for folder in &normalized.folders {
            let descendants = outliner_engine::descendants_of(&normalized, &folder.id);
            for target in std::iter::once(folder.key()).chain(descendants) {
                let moved = move_nodes(&scene, &[folder.key()], &DropTarget::on(target));
                prop_assert_eq!(&moved, &normalized);
            }
        }
    }
}
