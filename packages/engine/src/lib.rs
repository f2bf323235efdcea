//! # Outliner Engine
//!
//! Keeps a scene outliner's flat records consistent: folders and placeable
//! leaves stored as `{ id, parent_id, order }` rows, presented as an
//! arbitrarily nested, drag-and-droppable tree.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ persistence: flat folders + leaves          │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ normalize: ids, parents, cycles, ranks      │
//! └─────────────────────────────────────────────┘
//!           ↓                         ↓
//! ┌───────────────────┐   ┌─────────────────────┐
//! │ tree: render tree │   │ mover / edit:       │
//! │  + paint order    │   │  new flat records   │
//! └───────────────────┘   └─────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Flat records are the source of truth**: trees are derived views
//! 2. **Pure transforms**: every entry point is `Scene -> Scene`, no I/O
//! 3. **Never fail on bad data**: malformed input is repaired, not rejected
//! 4. **Deterministic**: same input, same tree, same paint order
//!
//! ## Usage
//!
//! ```rust
//! use outliner_engine::{move_nodes, flatten_leaves_in_tree_order, DropTarget, Folder, Leaf, NodeKey, Scene};
//!
//! let scene = Scene::new(
//!     vec![Folder::new("props", "Props").with_order(0.0)],
//!     vec![Leaf::new("chair").with_order(1.0)],
//! );
//!
//! let scene = move_nodes(
//!     &scene,
//!     &[NodeKey::leaf("chair")],
//!     &DropTarget::on(NodeKey::folder("props")),
//! );
//!
//! assert_eq!(scene.leaf("chair").unwrap().parent_id.as_deref(), Some("props"));
//! assert_eq!(flatten_leaves_in_tree_order(&scene)[0].id, "chair");
//! ```

mod ancestry;
mod edit;
mod error;
mod key;
mod model;
mod mover;
mod normalize;
mod options;
mod rank;
mod tree;

#[cfg(test)]
mod tests_scenarios;

pub use ancestry::{ancestors_of, descendants_of, is_ancestor};
pub use edit::{Edit, EditError, RemovePolicy};
pub use error::OutlinerError;
pub use key::{KeyError, NodeKey, NodeKind};
pub use model::{Folder, Leaf, Scene};
pub use mover::{move_nodes, try_move, DropPosition, DropTarget, MoveOutcome, MoveRejection, MoveStatus};
pub use normalize::{
    apply_sibling_ordering, normalize, normalize_with, DetachReason, Detachment, NormalizeReport,
    Normalized,
};
pub use options::OutlinerOptions;
pub use rank::next_rank;
pub use tree::{flatten_leaves_in_tree_order, flatten_rows, get_tree, path_to, NodeRecord, TreeNode, TreeRow};
