/// End-to-end outliner scenarios
/// Append, reparent, reorder and legacy import against a small scene
use crate::*;

#[cfg(test)]
mod scenario_tests {
    use super::*;

    #[test]
    fn test_append_to_empty_root() {
        let scene = Scene::default();
        assert_eq!(next_rank(&scene, None), 0);

        let scene = Scene::new(vec![], vec![Leaf::new("L1").with_order(next_rank(&scene, None) as f64)]);
        let scene = normalize(&scene);

        assert_eq!(scene.leaf("L1").unwrap().order, Some(0.0));
    }

    #[test]
    fn test_reparent_via_on() {
        let scene = Scene::new(
            vec![Folder::new("Fold", "Fold").with_order(0.0)],
            vec![Leaf::new("L1").with_order(1.0)],
        );

        let scene = move_nodes(&scene, &[NodeKey::leaf("L1")], &DropTarget::on(NodeKey::folder("Fold")));

        let leaf = scene.leaf("L1").unwrap();
        assert_eq!(leaf.parent_id.as_deref(), Some("Fold"));
        assert_eq!(leaf.order, Some(0.0));

        let folder = scene.folder("Fold").unwrap();
        assert_eq!(folder.parent_id, None);
        assert_eq!(folder.order, Some(0.0));
    }

    #[test]
    fn test_reorder_via_after() {
        let scene = Scene::new(
            vec![],
            vec![Leaf::new("L1").with_order(0.0), Leaf::new("L2").with_order(1.0)],
        );

        let scene = move_nodes(&scene, &[NodeKey::leaf("L1")], &DropTarget::after(NodeKey::leaf("L2")));

        assert_eq!(scene.leaf("L2").unwrap().order, Some(0.0));
        assert_eq!(scene.leaf("L1").unwrap().order, Some(1.0));
    }

    #[test]
    fn test_legacy_migration() {
        let scene = Scene::new(
            vec![Folder::new("G", "Group")],
            vec![Leaf::new("L1").with_legacy_group("G"), Leaf::new("L2")],
        );

        let scene = normalize(&scene);

        assert_eq!(scene.leaf("L1").unwrap().parent_id.as_deref(), Some("G"));
        assert_eq!(scene.folder("G").unwrap().parent_id, None);

        // G takes L1's slot, which came before L2
        let g = scene.folder("G").unwrap().order.unwrap();
        let l2 = scene.leaf("L2").unwrap().order.unwrap();
        assert!(g <= l2);
        assert_eq!((g, l2), (0.0, 1.0));
    }

    #[test]
    fn test_flatten_matches_sibling_order() {
        let scene = Scene::new(
            vec![],
            vec![Leaf::new("B").with_order(1.0), Leaf::new("A").with_order(0.0)],
        );

        let ids: Vec<_> = flatten_leaves_in_tree_order(&scene)
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ids, vec!["A", "B"]);
    }

    #[test]
    fn test_self_nesting_rejected() {
        let scene = Scene::new(
            vec![
                Folder::new("F", "F").with_order(0.0),
                Folder::new("D", "D").with_parent("F").with_order(0.0),
            ],
            vec![Leaf::new("x").with_parent("D").with_order(0.0)],
        );
        let normalized = normalize(&scene);

        for target in [NodeKey::folder("F"), NodeKey::folder("D"), NodeKey::leaf("x")] {
            let moved = move_nodes(&scene, &[NodeKey::folder("F")], &DropTarget::on(target));
            assert_eq!(moved, normalized);
        }
    }

    #[test]
    fn test_descendant_sanitization_matches_folder_only_move() {
        let scene = Scene::new(
            vec![
                Folder::new("F", "F").with_order(0.0),
                Folder::new("D", "D").with_parent("F").with_order(0.0),
                Folder::new("T", "T").with_order(1.0),
            ],
            vec![Leaf::new("x").with_parent("D").with_order(0.0)],
        );
        let target = DropTarget::on(NodeKey::folder("T"));

        let folder_only = move_nodes(&scene, &[NodeKey::folder("F")], &target);
        let with_descendants = move_nodes(
            &scene,
            &[NodeKey::leaf("x"), NodeKey::folder("F"), NodeKey::folder("D")],
            &target,
        );

        assert_eq!(with_descendants, folder_only);
        assert_eq!(folder_only.folder("F").unwrap().parent_id.as_deref(), Some("T"));
    }

    #[test]
    fn test_drag_sequence_stays_normalized() {
        let mut scene = Scene::new(
            vec![Folder::new("F", "F"), Folder::new("G", "G")],
            (0..4).map(|i| Leaf::new(format!("l{}", i))).collect(),
        );

        let drags = [
            (vec![NodeKey::leaf("l0"), NodeKey::leaf("l1")], DropTarget::on(NodeKey::folder("F"))),
            (vec![NodeKey::folder("G")], DropTarget::on(NodeKey::folder("F"))),
            (vec![NodeKey::leaf("l3")], DropTarget::before(NodeKey::leaf("l0"))),
            (vec![NodeKey::folder("F")], DropTarget::on(NodeKey::folder("G"))),
            (vec![NodeKey::leaf("l2")], DropTarget::root()),
        ];

        for (keys, target) in drags {
            scene = move_nodes(&scene, &keys, &target);
            assert_eq!(normalize(&scene), scene);
        }

        assert_eq!(scene.folder("G").unwrap().parent_id.as_deref(), Some("F"));
        let ids: Vec<_> = flatten_leaves_in_tree_order(&scene)
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ids, vec!["l3", "l0", "l1", "l2"]);
    }
}
