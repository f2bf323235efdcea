use crate::model::{usable, Scene};

/// Next free rank at the end of a sibling group.
///
/// `1 + max(order)` over the folders and leaves whose parent is `parent_id`,
/// or `0` for an empty group. Lets a caller append a node without a full
/// normalization pass; non-finite orders are ignored.
pub fn next_rank(scene: &Scene, parent_id: Option<&str>) -> usize {
    let parent_id = usable(parent_id);

    let folder_orders = scene
        .folders
        .iter()
        .filter(|f| f.parent() == parent_id)
        .filter_map(|f| f.order);
    let leaf_orders = scene
        .leaves
        .iter()
        .filter(|l| l.parent() == parent_id)
        .filter_map(|l| l.order);

    let max = folder_orders
        .chain(leaf_orders)
        .filter(|o| o.is_finite())
        .fold(None, |max: Option<f64>, o| Some(max.map_or(o, |m| m.max(o))));

    match max {
        Some(max) => (max.floor() + 1.0).max(0.0) as usize,
        None => 0,
    }
}
