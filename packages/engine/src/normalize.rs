//! # Normalizer
//!
//! Repairs a scene so it satisfies the structural invariants every other
//! part of the engine relies on:
//!
//! 1. Every folder and leaf has a non-empty id, unique within its kind
//! 2. Every `parent_id` is `None` or names a folder in the scene
//! 3. Folder parent chains are acyclic
//! 4. Each sibling group's orders are exactly `0..n`
//!
//! ## Repair policy
//!
//! Normalization never fails. Bad input is repaired, not rejected:
//! - Missing ids are generated (deterministically, see [`OutlinerOptions`])
//! - Duplicate ids keep the first record
//! - Missing or non-finite orders fall back to the record's array position
//! - Self-parenting, cyclic or dangling parents are detached to the root
//!
//! Nodes are never deleted, only relocated. Normalizing a normalized scene
//! returns it unchanged.
//!
//! ## Legacy scenes
//!
//! Scenes written before folders could nest carry a single-level `group_id`
//! on leaves and no ranks. When such a scene is detected the root ordering is
//! rebuilt from the leaves' array order so the old display order survives.

use crate::ancestry::{walk, ChainEnd, ParentMap};
use crate::key::{NodeKey, NodeKind};
use crate::model::{usable, Folder, Leaf, Scene};
use crate::options::OutlinerOptions;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument, warn};

/// Why a node was moved to the root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DetachReason {
    SelfParent,
    Cycle,
    MissingParent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Detachment {
    pub key: NodeKey,
    pub reason: DetachReason,
}

/// Repairs performed by one normalization pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeReport {
    pub generated_ids: Vec<NodeKey>,
    pub dropped_duplicates: Vec<NodeKey>,
    pub detached: Vec<Detachment>,
    pub legacy_migrated: bool,
}

impl NormalizeReport {
    /// True when the scene only needed rank reconciliation (if anything)
    pub fn is_clean(&self) -> bool {
        self.generated_ids.is_empty()
            && self.dropped_duplicates.is_empty()
            && self.detached.is_empty()
            && !self.legacy_migrated
    }
}

#[derive(Debug, Clone)]
pub struct Normalized {
    pub scene: Scene,
    pub report: NormalizeReport,
}

/// Normalize with default options
pub fn normalize(scene: &Scene) -> Scene {
    normalize_with(scene, &OutlinerOptions::default()).scene
}

#[instrument(skip_all, fields(folders = scene.folders.len(), leaves = scene.leaves.len()))]
pub fn normalize_with(scene: &Scene, options: &OutlinerOptions) -> Normalized {
    let mut report = NormalizeReport::default();

    // Must be decided on the raw records, coercion fills in the ranks
    let legacy = options.legacy_migration && needs_legacy_migration(scene);

    let mut folders = coerce_folders(&scene.folders, options, &mut report);
    let mut leaves = coerce_leaves(&scene.leaves, options, &mut report);
    warn_shared_ids(&folders, &leaves);

    repair_folder_cycles(&mut folders, &mut report);
    validate_leaf_parents(&folders, &mut leaves, &mut report);

    let mut normalized = Scene { folders, leaves };

    if legacy {
        info!(
            leaves = normalized.leaves.len(),
            "Scene predates nested folders, migrating root ordering"
        );
        migrate_legacy_ordering(&mut normalized);
        report.legacy_migrated = true;
    }

    apply_sibling_ordering(&mut normalized);

    if !report.is_clean() {
        debug!(
            generated = report.generated_ids.len(),
            dropped = report.dropped_duplicates.len(),
            detached = report.detached.len(),
            legacy = report.legacy_migrated,
            "Scene repaired"
        );
    }

    Normalized {
        scene: normalized,
        report,
    }
}

/// A leaf without a rank that only knows its legacy group
fn needs_legacy_migration(scene: &Scene) -> bool {
    scene.leaves.iter().any(|leaf| {
        !leaf.order.is_some_and(f64::is_finite)
            && usable(leaf.group_id.as_deref()).is_some()
            && leaf.parent().is_none()
    })
}

/// Deterministic ids for records that arrived without one
struct IdGenerator<'a> {
    prefix: &'a str,
    kind: NodeKind,
    counter: usize,
    taken: HashSet<String>,
}

impl<'a> IdGenerator<'a> {
    fn new<'b>(prefix: &'a str, kind: NodeKind, existing: impl Iterator<Item = &'b str>) -> Self {
        Self {
            prefix,
            kind,
            counter: 0,
            taken: existing.map(str::to_string).collect(),
        }
    }

    fn generate(&mut self) -> String {
        loop {
            self.counter += 1;
            let candidate = format!("{}-{}-{}", self.prefix, self.kind, self.counter);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

/// Finite order, or the record's position in its array
fn order_or_position(order: Option<f64>, position: usize) -> f64 {
    order.filter(|o| o.is_finite()).unwrap_or(position as f64)
}

/// Resolve an id for every record and drop repeats, keeping the first
fn resolve_id(
    raw_id: &str,
    kind: NodeKind,
    ids: &mut IdGenerator<'_>,
    seen: &mut HashSet<String>,
    report: &mut NormalizeReport,
) -> Option<String> {
    let id = match usable(Some(raw_id)) {
        Some(id) => id.to_string(),
        None => {
            let id = ids.generate();
            debug!(%kind, id = %id, "Generated id for record without one");
            report.generated_ids.push(NodeKey::new(kind, id.clone()));
            id
        }
    };

    if !seen.insert(id.clone()) {
        debug!(%kind, id = %id, "Dropping record with duplicate id");
        report.dropped_duplicates.push(NodeKey::new(kind, id));
        return None;
    }

    Some(id)
}

fn coerce_folders(
    raw: &[Folder],
    options: &OutlinerOptions,
    report: &mut NormalizeReport,
) -> Vec<Folder> {
    let mut ids = IdGenerator::new(
        &options.generated_id_prefix,
        NodeKind::Folder,
        raw.iter().map(|f| f.id.as_str()),
    );
    let mut seen = HashSet::with_capacity(raw.len());
    let mut folders = Vec::with_capacity(raw.len());

    for (position, folder) in raw.iter().enumerate() {
        let Some(id) = resolve_id(&folder.id, NodeKind::Folder, &mut ids, &mut seen, report)
        else {
            continue;
        };

        folders.push(Folder {
            id,
            name: folder.name.clone(),
            parent_id: folder.parent().map(str::to_string),
            order: Some(order_or_position(folder.order, position)),
        });
    }

    folders
}

fn coerce_leaves(raw: &[Leaf], options: &OutlinerOptions, report: &mut NormalizeReport) -> Vec<Leaf> {
    let mut ids = IdGenerator::new(
        &options.generated_id_prefix,
        NodeKind::Leaf,
        raw.iter().map(|l| l.id.as_str()),
    );
    let mut seen = HashSet::with_capacity(raw.len());
    let mut leaves = Vec::with_capacity(raw.len());

    for (position, leaf) in raw.iter().enumerate() {
        let Some(id) = resolve_id(&leaf.id, NodeKind::Leaf, &mut ids, &mut seen, report) else {
            continue;
        };

        let parent_id = leaf
            .parent()
            .or_else(|| usable(leaf.group_id.as_deref()))
            .map(str::to_string);

        leaves.push(Leaf {
            id,
            parent_id,
            group_id: None,
            order: Some(order_or_position(leaf.order, position)),
            payload: leaf.payload.clone(),
        });
    }

    leaves
}

fn warn_shared_ids(folders: &[Folder], leaves: &[Leaf]) {
    let folder_ids: HashSet<&str> = folders.iter().map(|f| f.id.as_str()).collect();
    for leaf in leaves {
        if folder_ids.contains(leaf.id.as_str()) {
            warn!(id = %leaf.id, "Folder and leaf share an id");
        }
    }
}

/// Detach every folder whose parent chain doesn't end at the root.
///
/// Folders are walked in array order against the live parent map, so a
/// detach earlier in the pass shortens the chains walked after it.
fn repair_folder_cycles(folders: &mut [Folder], report: &mut NormalizeReport) {
    let mut parents: ParentMap = folders
        .iter()
        .map(|f| (f.id.clone(), f.parent_id.clone()))
        .collect();

    for folder in folders.iter_mut() {
        let reason = match walk(&parents, &folder.id).end {
            ChainEnd::Root => continue,
            ChainEnd::SelfParent => DetachReason::SelfParent,
            ChainEnd::Cycle => DetachReason::Cycle,
            ChainEnd::Dangling => DetachReason::MissingParent,
        };

        debug!(
            folder = %folder.id,
            parent = ?folder.parent_id,
            ?reason,
            "Detaching folder to root"
        );

        folder.parent_id = None;
        parents.insert(folder.id.clone(), None);
        report.detached.push(Detachment {
            key: folder.key(),
            reason,
        });
    }
}

fn validate_leaf_parents(folders: &[Folder], leaves: &mut [Leaf], report: &mut NormalizeReport) {
    let folder_ids: HashSet<&str> = folders.iter().map(|f| f.id.as_str()).collect();

    for leaf in leaves.iter_mut() {
        let Some(parent) = leaf.parent_id.as_deref() else {
            continue;
        };

        if !folder_ids.contains(parent) {
            debug!(leaf = %leaf.id, parent = %parent, "Detaching leaf from missing folder");
            leaf.parent_id = None;
            report.detached.push(Detachment {
                key: leaf.key(),
                reason: DetachReason::MissingParent,
            });
        }
    }
}

/// Rebuild root ranks from leaf array order.
///
/// Each top-level folder takes the slot of the first leaf found inside it,
/// each root leaf takes its own slot, and root folders no leaf refers to go
/// after everything else in array order. Ranks below the root are untouched.
fn migrate_legacy_ordering(scene: &mut Scene) {
    let parents: ParentMap = scene
        .folders
        .iter()
        .map(|f| (f.id.clone(), f.parent_id.clone()))
        .collect();

    let mut root_slots: HashMap<NodeKey, usize> = HashMap::new();
    let mut next_slot = 0;

    for leaf in &scene.leaves {
        let key = match leaf.parent_id.as_deref() {
            Some(parent) => {
                // Chains are acyclic by now, the last ancestor is top-level
                let top = walk(&parents, parent)
                    .ancestors
                    .pop()
                    .unwrap_or_else(|| parent.to_string());
                NodeKey::Folder(top)
            }
            None => leaf.key(),
        };

        if !root_slots.contains_key(&key) {
            root_slots.insert(key, next_slot);
            next_slot += 1;
        }
    }

    for leaf in scene.leaves.iter_mut() {
        if leaf.parent_id.is_none() {
            if let Some(slot) = root_slots.get(&leaf.key()) {
                leaf.order = Some(*slot as f64);
            }
        }
    }

    for folder in scene.folders.iter_mut() {
        if folder.parent_id.is_some() {
            continue;
        }

        let slot = match root_slots.get(&folder.key()) {
            Some(slot) => *slot,
            None => {
                let slot = next_slot;
                next_slot += 1;
                slot
            }
        };
        folder.order = Some(slot as f64);
    }
}

/// Reassign every sibling group's orders to `0..n`.
///
/// Siblings sort by `(order, folders before leaves, id)`; records without a
/// finite order sort last. Record arrays keep their order.
pub fn apply_sibling_ordering(scene: &mut Scene) {
    let mut assignments: Vec<(NodeKind, usize, usize)> =
        Vec::with_capacity(scene.node_count());

    {
        let mut groups: HashMap<Option<&str>, Vec<(f64, NodeKind, &str, usize)>> = HashMap::new();

        for (index, folder) in scene.folders.iter().enumerate() {
            groups.entry(folder.parent()).or_default().push((
                sort_order(folder.order),
                NodeKind::Folder,
                folder.id.as_str(),
                index,
            ));
        }
        for (index, leaf) in scene.leaves.iter().enumerate() {
            groups.entry(leaf.parent()).or_default().push((
                sort_order(leaf.order),
                NodeKind::Leaf,
                leaf.id.as_str(),
                index,
            ));
        }

        for siblings in groups.values_mut() {
            siblings.sort_by(|a, b| {
                a.0.total_cmp(&b.0)
                    .then_with(|| a.1.cmp(&b.1))
                    .then_with(|| a.2.cmp(b.2))
            });

            for (rank, (_, kind, _, index)) in siblings.iter().enumerate() {
                assignments.push((*kind, *index, rank));
            }
        }
    }

    for (kind, index, rank) in assignments {
        let order = Some(rank as f64);
        match kind {
            NodeKind::Folder => scene.folders[index].order = order,
            NodeKind::Leaf => scene.leaves[index].order = order,
        }
    }
}

fn sort_order(order: Option<f64>) -> f64 {
    order.filter(|o| o.is_finite()).unwrap_or(f64::INFINITY)
}
