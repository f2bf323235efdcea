//! # Ancestry
//!
//! Walks up folder parent chains. Shared by cycle repair in the normalizer
//! and by the mover's cycle guard and descendant sanitization.
//!
//! Walks are bounded by the folder count: a chain that revisits a folder
//! stops and reports a cycle instead of looping.

use crate::key::NodeKey;
use crate::model::Scene;
use std::collections::{HashMap, HashSet};

/// Folder id -> parent folder id
pub(crate) type ParentMap = HashMap<String, Option<String>>;

/// How a parent chain walk ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChainEnd {
    /// Reached the scene root
    Root,
    /// The folder names itself as parent
    SelfParent,
    /// The chain loops back to the folder or to a folder already visited
    Cycle,
    /// The chain names a folder that doesn't exist
    Dangling,
}

#[derive(Debug, Clone)]
pub(crate) struct Ancestry {
    /// Nearest first
    pub ancestors: Vec<String>,
    pub end: ChainEnd,
}

pub(crate) fn parent_map(scene: &Scene) -> ParentMap {
    let mut parents = ParentMap::with_capacity(scene.folders.len());
    for folder in &scene.folders {
        parents
            .entry(folder.id.clone())
            .or_insert_with(|| folder.parent().map(str::to_string));
    }
    parents
}

pub(crate) fn walk(parents: &ParentMap, folder_id: &str) -> Ancestry {
    let mut ancestors = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    seen.insert(folder_id);

    let mut current = parents.get(folder_id).and_then(|p| p.as_deref());

    let end = loop {
        let Some(parent) = current else {
            break ChainEnd::Root;
        };

        if parent == folder_id {
            break if ancestors.is_empty() {
                ChainEnd::SelfParent
            } else {
                ChainEnd::Cycle
            };
        }

        let Some(next) = parents.get(parent) else {
            break ChainEnd::Dangling;
        };

        if !seen.insert(parent) {
            break ChainEnd::Cycle;
        }

        ancestors.push(parent.to_string());
        current = next.as_deref();
    };

    Ancestry { ancestors, end }
}

/// Ancestor folder ids of a folder, nearest first
///
/// Stops early at a cycle or at a parent id that names no folder, so on
/// unnormalized scenes the result is the reachable prefix of the chain.
pub fn ancestors_of(scene: &Scene, folder_id: &str) -> Vec<String> {
    walk(&parent_map(scene), folder_id).ancestors
}

/// Whether `ancestor` appears in the parent chain of `folder_id`
pub fn is_ancestor(scene: &Scene, ancestor: &str, folder_id: &str) -> bool {
    ancestors_of(scene, folder_id).iter().any(|id| id == ancestor)
}

/// Every node below a folder, depth-first, siblings by rank
pub fn descendants_of(scene: &Scene, folder_id: &str) -> Vec<NodeKey> {
    let mut children: HashMap<&str, Vec<(f64, NodeKey)>> = HashMap::new();
    for folder in &scene.folders {
        if let Some(parent) = folder.parent() {
            let order = folder.order.unwrap_or(f64::MAX);
            children.entry(parent).or_default().push((order, folder.key()));
        }
    }
    for leaf in &scene.leaves {
        if let Some(parent) = leaf.parent() {
            let order = leaf.order.unwrap_or(f64::MAX);
            children.entry(parent).or_default().push((order, leaf.key()));
        }
    }
    for group in children.values_mut() {
        group.sort_by(|(a, ka), (b, kb)| a.total_cmp(b).then_with(|| ka.cmp(kb)));
    }

    let mut out = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();
    visited.insert(folder_id);
    collect_descendants(&children, folder_id, &mut visited, &mut out);
    out
}

fn collect_descendants<'a>(
    children: &'a HashMap<&'a str, Vec<(f64, NodeKey)>>,
    folder_id: &str,
    visited: &mut HashSet<&'a str>,
    out: &mut Vec<NodeKey>,
) {
    let Some(group) = children.get(folder_id) else {
        return;
    };

    for (_, key) in group {
        match key {
            NodeKey::Folder(id) => {
                if visited.insert(id.as_str()) {
                    out.push(key.clone());
                    collect_descendants(children, id, visited, out);
                }
            }
            NodeKey::Leaf(_) => out.push(key.clone()),
        }
    }
}
