//! # Mover
//!
//! Applies a drag-and-drop intent: a multi-selection of node keys dropped
//! before, after or onto a target node.
//!
//! ## Semantics
//!
//! - The scene is normalized first; everything below works on that view
//! - Unknown and repeated keys are ignored
//! - A moved folder carries its subtree, so descendants of moved folders are
//!   dropped from the selection
//! - `On` a folder appends into it; `Before`/`After` insert next to the
//!   target in the target's own sibling group; no target or no position
//!   appends at the end of the root
//! - Moving a folder into itself or into one of its descendants is rejected
//! - Moved nodes keep their relative order
//!
//! A rejected move returns the normalized scene unchanged. Nothing is ever
//! created or deleted.

use crate::ancestry::ancestors_of;
use crate::key::NodeKey;
use crate::model::Scene;
use crate::normalize::{apply_sibling_ordering, normalize};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropPosition {
    Before,
    After,
    /// Into the target folder. On a leaf this behaves like `Before`.
    On,
}

/// Where the selection was released
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropTarget {
    #[serde(default)]
    pub key: Option<NodeKey>,

    #[serde(default)]
    pub position: Option<DropPosition>,
}

impl DropTarget {
    /// Empty area below the tree: append at the end of the root
    pub fn root() -> Self {
        Self::default()
    }

    pub fn before(key: NodeKey) -> Self {
        Self::at(key, DropPosition::Before)
    }

    pub fn after(key: NodeKey) -> Self {
        Self::at(key, DropPosition::After)
    }

    pub fn on(key: NodeKey) -> Self {
        Self::at(key, DropPosition::On)
    }

    pub fn at(key: NodeKey, position: DropPosition) -> Self {
        Self {
            key: Some(key),
            position: Some(position),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MoveRejection {
    #[error("Nothing to move")]
    EmptySelection,

    #[error("Would create cycle: folder {folder} cannot move into {destination}")]
    Cycle { folder: String, destination: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MoveStatus {
    Applied,
    Rejected(MoveRejection),
}

#[derive(Debug, Clone)]
pub struct MoveOutcome {
    pub scene: Scene,
    pub status: MoveStatus,
}

impl MoveOutcome {
    pub fn is_applied(&self) -> bool {
        self.status == MoveStatus::Applied
    }

    pub fn into_scene(self) -> Scene {
        self.scene
    }
}

/// Move nodes, returning the normalized scene unchanged if rejected
pub fn move_nodes(scene: &Scene, keys: &[NodeKey], target: &DropTarget) -> Scene {
    try_move(scene, keys, target).into_scene()
}

/// Move nodes and report whether the move was applied
#[instrument(skip_all, fields(keys = keys.len(), target = ?target.key, position = ?target.position))]
pub fn try_move(scene: &Scene, keys: &[NodeKey], target: &DropTarget) -> MoveOutcome {
    let scene = normalize(scene);

    let moved = sanitize_selection(&scene, keys);
    if moved.is_empty() {
        debug!("Move rejected: empty selection");
        return MoveOutcome {
            scene,
            status: MoveStatus::Rejected(MoveRejection::EmptySelection),
        };
    }

    let mut groups = SiblingGroups::from_scene(&scene);
    let moved_set: HashSet<&NodeKey> = moved.iter().collect();

    let (destination, index) = resolve_destination(&scene, &groups, &moved_set, target);

    if let Some(parent) = destination.as_deref() {
        if let Some(folder) = find_cycle(&scene, &moved, parent) {
            debug!(folder = %folder, destination = %parent, "Move rejected: would create cycle");
            return MoveOutcome {
                status: MoveStatus::Rejected(MoveRejection::Cycle {
                    folder,
                    destination: parent.to_string(),
                }),
                scene,
            };
        }
    }

    groups.remove_all(&moved_set);

    let ordered = in_original_order(&scene, moved);
    groups.insert(destination.clone(), index, ordered);

    debug!(destination = ?destination, index, "Move applied");

    MoveOutcome {
        scene: groups.apply_to(scene),
        status: MoveStatus::Applied,
    }
}

/// Drop unknown and repeated keys, then anything inside a moved folder
fn sanitize_selection(scene: &Scene, keys: &[NodeKey]) -> Vec<NodeKey> {
    let mut seen = HashSet::new();
    let existing: Vec<NodeKey> = keys
        .iter()
        .filter(|key| scene.contains(key))
        .filter(|key| seen.insert(*key))
        .cloned()
        .collect();

    let moved_folders: HashSet<&str> = existing
        .iter()
        .filter(|key| key.is_folder())
        .map(NodeKey::id)
        .collect();

    existing
        .iter()
        .filter(|key| {
            let chain = containing_folders(scene, key);
            !chain.iter().any(|id| moved_folders.contains(id.as_str()))
        })
        .cloned()
        .collect()
}

/// Every folder that structurally contains a node, nearest first
fn containing_folders(scene: &Scene, key: &NodeKey) -> Vec<String> {
    match key {
        NodeKey::Folder(id) => ancestors_of(scene, id),
        NodeKey::Leaf(_) => match scene.parent_of(key) {
            Some(parent) => {
                let mut chain = vec![parent.to_string()];
                chain.extend(ancestors_of(scene, parent));
                chain
            }
            None => Vec::new(),
        },
    }
}

/// Destination parent and insertion index within it
fn resolve_destination(
    scene: &Scene,
    groups: &SiblingGroups,
    moved: &HashSet<&NodeKey>,
    target: &DropTarget,
) -> (Option<String>, usize) {
    let (Some(key), Some(position)) = (&target.key, target.position) else {
        return (None, groups.len_without(&None, moved));
    };
    if !scene.contains(key) {
        return (None, groups.len_without(&None, moved));
    }

    if position == DropPosition::On && key.is_folder() {
        let parent = Some(key.id().to_string());
        let index = groups.len_without(&parent, moved);
        return (parent, index);
    }

    let parent = scene.parent_of(key).map(str::to_string);
    let mut index = groups.index_without(&parent, key, moved);
    if position == DropPosition::After && !moved.contains(key) {
        index += 1;
    }

    (parent, index)
}

/// First moved folder that is the destination or one of its ancestors
fn find_cycle(scene: &Scene, moved: &[NodeKey], destination: &str) -> Option<String> {
    let mut chain: HashSet<String> = ancestors_of(scene, destination).into_iter().collect();
    chain.insert(destination.to_string());

    moved
        .iter()
        .filter(|key| key.is_folder())
        .find(|key| chain.contains(key.id()))
        .map(|key| key.id().to_string())
}

/// Sort by original `(parent, order)` so a multi-selection keeps its
/// mutual order wherever it lands
fn in_original_order(scene: &Scene, mut moved: Vec<NodeKey>) -> Vec<NodeKey> {
    let position = |key: &NodeKey| -> (Option<String>, f64) {
        let order = match key {
            NodeKey::Folder(id) => scene.folder(id).and_then(|f| f.order),
            NodeKey::Leaf(id) => scene.leaf(id).and_then(|l| l.order),
        };
        (
            scene.parent_of(key).map(str::to_string),
            order.unwrap_or(f64::INFINITY),
        )
    };

    moved.sort_by(|a, b| {
        let (a_parent, a_order) = position(a);
        let (b_parent, b_order) = position(b);
        a_parent
            .cmp(&b_parent)
            .then_with(|| a_order.total_cmp(&b_order))
            .then_with(|| a.cmp(b))
    });
    moved
}

/// Ordered children per parent, rebuilt from a normalized scene
struct SiblingGroups {
    groups: HashMap<Option<String>, Vec<NodeKey>>,
}

impl SiblingGroups {
    fn from_scene(scene: &Scene) -> Self {
        let mut ranked: HashMap<Option<String>, Vec<(f64, NodeKey)>> = HashMap::new();

        for folder in &scene.folders {
            ranked
                .entry(folder.parent().map(str::to_string))
                .or_default()
                .push((folder.order.unwrap_or(f64::INFINITY), folder.key()));
        }
        for leaf in &scene.leaves {
            ranked
                .entry(leaf.parent().map(str::to_string))
                .or_default()
                .push((leaf.order.unwrap_or(f64::INFINITY), leaf.key()));
        }

        let groups = ranked
            .into_iter()
            .map(|(parent, mut siblings)| {
                siblings.sort_by(|(a, ka), (b, kb)| a.total_cmp(b).then_with(|| ka.cmp(kb)));
                (parent, siblings.into_iter().map(|(_, key)| key).collect())
            })
            .collect();

        Self { groups }
    }

    fn len_without(&self, parent: &Option<String>, moved: &HashSet<&NodeKey>) -> usize {
        self.groups
            .get(parent)
            .map_or(0, |siblings| siblings.iter().filter(|k| !moved.contains(k)).count())
    }

    /// Index of `key` among the siblings that stay put
    fn index_without(
        &self,
        parent: &Option<String>,
        key: &NodeKey,
        moved: &HashSet<&NodeKey>,
    ) -> usize {
        self.groups.get(parent).map_or(0, |siblings| {
            siblings
                .iter()
                .take_while(|k| *k != key)
                .filter(|k| !moved.contains(k))
                .count()
        })
    }

    fn remove_all(&mut self, moved: &HashSet<&NodeKey>) {
        for siblings in self.groups.values_mut() {
            siblings.retain(|key| !moved.contains(key));
        }
    }

    fn insert(&mut self, parent: Option<String>, index: usize, keys: Vec<NodeKey>) {
        let siblings = self.groups.entry(parent).or_default();
        let tail = siblings.split_off(index.min(siblings.len()));
        siblings.extend(keys);
        siblings.extend(tail);
    }

    /// Write parents and ranks back, then reconcile
    fn apply_to(self, mut scene: Scene) -> Scene {
        let mut placement: HashMap<NodeKey, (Option<String>, usize)> = HashMap::new();
        for (parent, siblings) in self.groups {
            for (rank, key) in siblings.into_iter().enumerate() {
                placement.insert(key, (parent.clone(), rank));
            }
        }

        for folder in scene.folders.iter_mut() {
            if let Some((parent, rank)) = placement.remove(&folder.key()) {
                folder.parent_id = parent;
                folder.order = Some(rank as f64);
            }
        }
        for leaf in scene.leaves.iter_mut() {
            if let Some((parent, rank)) = placement.remove(&leaf.key()) {
                leaf.parent_id = parent;
                leaf.order = Some(rank as f64);
            }
        }

        apply_sibling_ordering(&mut scene);
        scene
    }
}
