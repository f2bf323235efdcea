//! # Tree Builder
//!
//! Derives the renderable hierarchy from a flat scene. The scene is
//! normalized first, so building never fails and always terminates.
//!
//! Within a sibling group folders come first, then leaves, each by
//! `(order, id)`.
//!
//! [`flatten_leaves_in_tree_order`] is the paint/z-order of the scene: the
//! order items are drawn and iterated in anywhere outside the outliner.

use crate::key::{NodeKey, NodeKind};
use crate::model::{Folder, Leaf, Scene};
use crate::normalize::normalize;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Record carried by a tree node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NodeRecord {
    Folder(Folder),
    Leaf(Leaf),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub key: NodeKey,
    pub kind: NodeKind,
    pub parent_id: Option<String>,
    pub rank: usize,
    pub record: NodeRecord,
    /// Always empty for leaves
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match &self.record {
            NodeRecord::Leaf(leaf) => Some(leaf),
            NodeRecord::Folder(_) => None,
        }
    }

    pub fn as_folder(&self) -> Option<&Folder> {
        match &self.record {
            NodeRecord::Folder(folder) => Some(folder),
            NodeRecord::Leaf(_) => None,
        }
    }
}

/// One visible line of the outliner
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeRow {
    pub key: NodeKey,
    pub depth: usize,
    pub has_children: bool,
}

/// Build the forest of root nodes
pub fn get_tree(scene: &Scene) -> Vec<TreeNode> {
    build_forest(&normalize(scene))
}

/// Build from a scene that is already normalized
pub(crate) fn build_forest(scene: &Scene) -> Vec<TreeNode> {
    let mut folders_by_parent: HashMap<Option<&str>, Vec<&Folder>> = HashMap::new();
    let mut leaves_by_parent: HashMap<Option<&str>, Vec<&Leaf>> = HashMap::new();

    for folder in &scene.folders {
        folders_by_parent.entry(folder.parent()).or_default().push(folder);
    }
    for leaf in &scene.leaves {
        leaves_by_parent.entry(leaf.parent()).or_default().push(leaf);
    }
    for group in folders_by_parent.values_mut() {
        group.sort_by(|a, b| by_order(a.order, &a.id, b.order, &b.id));
    }
    for group in leaves_by_parent.values_mut() {
        group.sort_by(|a, b| by_order(a.order, &a.id, b.order, &b.id));
    }

    let groups = Groups {
        folders: folders_by_parent,
        leaves: leaves_by_parent,
    };
    let mut visited = HashSet::new();
    groups.build(None, &mut visited)
}

fn by_order(a: Option<f64>, a_id: &str, b: Option<f64>, b_id: &str) -> std::cmp::Ordering {
    let a = a.unwrap_or(f64::INFINITY);
    let b = b.unwrap_or(f64::INFINITY);
    a.total_cmp(&b).then_with(|| a_id.cmp(b_id))
}

struct Groups<'a> {
    folders: HashMap<Option<&'a str>, Vec<&'a Folder>>,
    leaves: HashMap<Option<&'a str>, Vec<&'a Leaf>>,
}

impl<'a> Groups<'a> {
    fn build(&self, parent: Option<&'a str>, visited: &mut HashSet<&'a str>) -> Vec<TreeNode> {
        let mut nodes = Vec::new();

        for folder in self.folders.get(&parent).into_iter().flatten().copied() {
            // Normalized scenes are acyclic; the guard keeps this finite anyway
            if !visited.insert(folder.id.as_str()) {
                continue;
            }
            nodes.push(TreeNode {
                key: folder.key(),
                kind: NodeKind::Folder,
                parent_id: folder.parent_id.clone(),
                rank: folder.rank().unwrap_or_default(),
                record: NodeRecord::Folder(folder.clone()),
                children: self.build(Some(folder.id.as_str()), visited),
            });
        }

        for leaf in self.leaves.get(&parent).into_iter().flatten().copied() {
            nodes.push(TreeNode {
                key: leaf.key(),
                kind: NodeKind::Leaf,
                parent_id: leaf.parent_id.clone(),
                rank: leaf.rank().unwrap_or_default(),
                record: NodeRecord::Leaf(leaf.clone()),
                children: Vec::new(),
            });
        }

        nodes
    }
}

/// Leaves in depth-first pre-order; folders are transparent
pub fn flatten_leaves_in_tree_order(scene: &Scene) -> Vec<Leaf> {
    let mut out = Vec::new();
    collect_leaves(&get_tree(scene), &mut out);
    out
}

fn collect_leaves(nodes: &[TreeNode], out: &mut Vec<Leaf>) {
    for node in nodes {
        match &node.record {
            NodeRecord::Leaf(leaf) => out.push(leaf.clone()),
            NodeRecord::Folder(_) => collect_leaves(&node.children, out),
        }
    }
}

/// Visible rows for a built tree, hiding the contents of collapsed folders
pub fn flatten_rows(nodes: &[TreeNode], collapsed: &HashSet<NodeKey>) -> Vec<TreeRow> {
    let mut rows = Vec::new();
    collect_rows(nodes, collapsed, 0, &mut rows);
    rows
}

fn collect_rows(
    nodes: &[TreeNode],
    collapsed: &HashSet<NodeKey>,
    depth: usize,
    rows: &mut Vec<TreeRow>,
) {
    for node in nodes {
        rows.push(TreeRow {
            key: node.key.clone(),
            depth,
            has_children: !node.children.is_empty(),
        });

        if !collapsed.contains(&node.key) {
            collect_rows(&node.children, collapsed, depth + 1, rows);
        }
    }
}

/// Keys from the top-level ancestor down to `key` itself.
///
/// Empty when the node doesn't exist.
pub fn path_to(scene: &Scene, key: &NodeKey) -> Vec<NodeKey> {
    let scene = normalize(scene);
    if !scene.contains(key) {
        return Vec::new();
    }

    let mut path = vec![key.clone()];
    if let Some(parent) = scene.parent_of(key) {
        path.push(NodeKey::folder(parent));
        path.extend(
            crate::ancestry::ancestors_of(&scene, parent)
                .into_iter()
                .map(NodeKey::Folder),
        );
    }

    path.reverse();
    path
}
