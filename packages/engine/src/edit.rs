//! # Structural Edits
//!
//! Serializable edit commands the outliner UI sends for one scene.
//!
//! Every edit is a pure transform: the input scene is normalized, the edit
//! is validated and applied to a copy, and the result is normalized again
//! before it is handed back for persistence.
//!
//! ### Append
//! - Placed at the end of its parent's children (`next_rank`)
//! - A parent that isn't a folder in the scene means the root
//! - Reusing an id already taken by the same kind fails
//!
//! ### RemoveFolder
//! - `Cascade` removes the folder and everything below it
//! - `Reparent` hands the folder's children to its parent, in the slot the
//!   folder occupied
//!
//! ### Move
//! - Same semantics as [`crate::mover`], but a rejected move is an error

use crate::ancestry::descendants_of;
use crate::key::NodeKey;
use crate::model::{usable, Folder, Leaf, Scene};
use crate::mover::{try_move, DropTarget, MoveRejection, MoveStatus};
use crate::normalize::normalize_with;
use crate::options::OutlinerOptions;
use crate::rank::next_rank;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

/// What happens to the contents of a removed folder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovePolicy {
    Cascade,
    Reparent,
}

/// Structural edits on a scene
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Edit {
    /// Add a folder after its future siblings
    AppendFolder { folder: Folder },

    /// Add a leaf after its future siblings
    AppendLeaf { leaf: Leaf },

    RenameFolder { id: String, name: String },

    RemoveFolder { id: String, policy: RemovePolicy },

    RemoveLeaf { id: String },

    /// Drag-and-drop of a selection
    Move { keys: Vec<NodeKey>, target: DropTarget },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeKey),

    #[error("Id already in use: {0}")]
    DuplicateId(NodeKey),

    #[error("Move rejected: {0}")]
    MoveRejected(#[from] MoveRejection),
}

impl Edit {
    /// Apply with default options
    pub fn apply(&self, scene: &Scene) -> Result<Scene, EditError> {
        self.apply_with(scene, &OutlinerOptions::default())
    }

    pub fn apply_with(&self, scene: &Scene, options: &OutlinerOptions) -> Result<Scene, EditError> {
        let scene = normalize_with(scene, options).scene;
        self.validate(&scene)?;

        debug!(edit = self.name(), "Applying edit");

        let edited = match self {
            Edit::AppendFolder { folder } => Self::apply_append_folder(scene, folder),
            Edit::AppendLeaf { leaf } => Self::apply_append_leaf(scene, leaf),
            Edit::RenameFolder { id, name } => Self::apply_rename(scene, id, name),
            Edit::RemoveFolder { id, policy } => Self::apply_remove_folder(scene, id, *policy),
            Edit::RemoveLeaf { id } => Self::apply_remove_leaf(scene, id),
            Edit::Move { keys, target } => Self::apply_move(&scene, keys, target)?,
        };

        Ok(normalize_with(&edited, options).scene)
    }

    /// Validate against a normalized scene without applying
    pub fn validate(&self, scene: &Scene) -> Result<(), EditError> {
        match self {
            Edit::AppendFolder { folder } => {
                if scene.folder(&folder.id).is_some() {
                    return Err(EditError::DuplicateId(folder.key()));
                }
                Ok(())
            }

            Edit::AppendLeaf { leaf } => {
                if scene.leaf(&leaf.id).is_some() {
                    return Err(EditError::DuplicateId(leaf.key()));
                }
                Ok(())
            }

            Edit::RenameFolder { id, .. } | Edit::RemoveFolder { id, .. } => {
                scene
                    .folder(id)
                    .ok_or_else(|| EditError::NodeNotFound(NodeKey::folder(id.as_str())))?;
                Ok(())
            }

            Edit::RemoveLeaf { id } => {
                scene
                    .leaf(id)
                    .ok_or_else(|| EditError::NodeNotFound(NodeKey::leaf(id.as_str())))?;
                Ok(())
            }

            // Unknown keys are dropped by the mover
            Edit::Move { .. } => Ok(()),
        }
    }

    /// Name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Edit::AppendFolder { .. } => "append_folder",
            Edit::AppendLeaf { .. } => "append_leaf",
            Edit::RenameFolder { .. } => "rename_folder",
            Edit::RemoveFolder { .. } => "remove_folder",
            Edit::RemoveLeaf { .. } => "remove_leaf",
            Edit::Move { .. } => "move",
        }
    }

    /// Parent id if it names an existing folder, otherwise root
    fn existing_parent(scene: &Scene, parent: Option<&str>) -> Option<String> {
        parent
            .filter(|id| scene.folder(id).is_some())
            .map(str::to_string)
    }

    fn apply_append_folder(mut scene: Scene, folder: &Folder) -> Scene {
        let parent_id = Self::existing_parent(&scene, folder.parent());
        let order = next_rank(&scene, parent_id.as_deref());

        scene.folders.push(Folder {
            parent_id,
            order: Some(order as f64),
            ..folder.clone()
        });
        scene
    }

    fn apply_append_leaf(mut scene: Scene, leaf: &Leaf) -> Scene {
        let requested = leaf.parent().or_else(|| usable(leaf.group_id.as_deref()));
        let parent_id = Self::existing_parent(&scene, requested);
        let order = next_rank(&scene, parent_id.as_deref());

        scene.leaves.push(Leaf {
            parent_id,
            group_id: None,
            order: Some(order as f64),
            ..leaf.clone()
        });
        scene
    }

    fn apply_rename(mut scene: Scene, id: &str, name: &str) -> Scene {
        if let Some(folder) = scene.folders.iter_mut().find(|f| f.id == id) {
            folder.name = name.to_string();
        }
        scene
    }

    fn apply_remove_folder(mut scene: Scene, id: &str, policy: RemovePolicy) -> Scene {
        match policy {
            RemovePolicy::Cascade => {
                let doomed: HashSet<NodeKey> = descendants_of(&scene, id).into_iter().collect();
                scene
                    .folders
                    .retain(|f| f.id != id && !doomed.contains(&f.key()));
                scene.leaves.retain(|l| !doomed.contains(&l.key()));
            }

            RemovePolicy::Reparent => {
                let Some(removed) = scene.folder(id).cloned() else {
                    return scene;
                };
                let base = removed.order.unwrap_or_default();
                let count = scene.folders.iter().filter(|f| f.parent() == Some(id)).count()
                    + scene.leaves.iter().filter(|l| l.parent() == Some(id)).count();

                // Children are ranked 0..count inside the folder; squeeze them
                // into [base, base + 1) so they sit where the folder was
                let slot = |order: Option<f64>| base + order.unwrap_or_default() / count as f64;

                for folder in scene.folders.iter_mut().filter(|f| f.parent() == Some(id)) {
                    folder.parent_id = removed.parent_id.clone();
                    folder.order = Some(slot(folder.order));
                }
                for leaf in scene.leaves.iter_mut().filter(|l| l.parent() == Some(id)) {
                    leaf.parent_id = removed.parent_id.clone();
                    leaf.order = Some(slot(leaf.order));
                }

                scene.folders.retain(|f| f.id != id);
            }
        }
        scene
    }

    fn apply_remove_leaf(mut scene: Scene, id: &str) -> Scene {
        scene.leaves.retain(|l| l.id != id);
        scene
    }

    fn apply_move(scene: &Scene, keys: &[NodeKey], target: &DropTarget) -> Result<Scene, EditError> {
        let outcome = try_move(scene, keys, target);
        match outcome.status {
            MoveStatus::Applied => Ok(outcome.scene),
            MoveStatus::Rejected(rejection) => Err(rejection.into()),
        }
    }
}
