use wasm_bindgen::prelude::*;
use outliner_engine::{
    flatten_leaves_in_tree_order, flatten_rows, get_tree, next_rank, normalize_with, try_move,
    DropTarget, Edit, MoveStatus, NodeKey, OutlinerError, OutlinerOptions, Scene,
};
use std::collections::HashSet;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

#[wasm_bindgen]
pub struct NormalizeResult {
    scene: String,
    report: String,
}

#[wasm_bindgen]
impl NormalizeResult {
    #[wasm_bindgen(getter)]
    pub fn scene(&self) -> String {
        self.scene.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn report(&self) -> String {
        self.report.clone()
    }
}

#[wasm_bindgen]
pub struct MoveResult {
    scene: String,
    rejection: Option<String>,
}

#[wasm_bindgen]
impl MoveResult {
    #[wasm_bindgen(getter)]
    pub fn scene(&self) -> String {
        self.scene.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn applied(&self) -> bool {
        self.rejection.is_none()
    }

    #[wasm_bindgen(getter)]
    pub fn rejection(&self) -> Option<String> {
        self.rejection.clone()
    }
}

fn to_js(error: OutlinerError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn load_options(options_json: Option<&str>) -> Result<OutlinerOptions, OutlinerError> {
    match options_json {
        Some(json) if !json.trim().is_empty() => OutlinerOptions::from_json_str(json),
        _ => Ok(OutlinerOptions::default()),
    }
}

fn load_keys(keys_json: &str) -> Result<Vec<NodeKey>, OutlinerError> {
    Ok(serde_json::from_str(keys_json)?)
}

pub fn normalize_json(scene_json: &str, options_json: Option<&str>) -> Result<NormalizeResult, OutlinerError> {
    let scene = Scene::from_json_str(scene_json)?;
    let options = load_options(options_json)?;
    let result = normalize_with(&scene, &options);

    Ok(NormalizeResult {
        scene: result.scene.to_json_string()?,
        report: serde_json::to_string(&result.report)?,
    })
}

pub fn tree_json(scene_json: &str) -> Result<String, OutlinerError> {
    let scene = Scene::from_json_str(scene_json)?;
    Ok(serde_json::to_string(&get_tree(&scene))?)
}

/// `collapsed_json` is an array of node keys such as `["folder:props"]`
pub fn rows_json(scene_json: &str, collapsed_json: &str) -> Result<String, OutlinerError> {
    let scene = Scene::from_json_str(scene_json)?;
    let collapsed: HashSet<NodeKey> = load_keys(collapsed_json)?.into_iter().collect();
    Ok(serde_json::to_string(&flatten_rows(&get_tree(&scene), &collapsed))?)
}

pub fn paint_order_json(scene_json: &str) -> Result<String, OutlinerError> {
    let scene = Scene::from_json_str(scene_json)?;
    Ok(serde_json::to_string(&flatten_leaves_in_tree_order(&scene))?)
}

pub fn next_rank_json(scene_json: &str, parent_id: Option<&str>) -> Result<usize, OutlinerError> {
    let scene = Scene::from_json_str(scene_json)?;
    Ok(next_rank(&scene, parent_id))
}

pub fn move_json(scene_json: &str, keys_json: &str, target_json: &str) -> Result<MoveResult, OutlinerError> {
    let scene = Scene::from_json_str(scene_json)?;
    let keys = load_keys(keys_json)?;
    let target: DropTarget = serde_json::from_str(target_json)?;

    let outcome = try_move(&scene, &keys, &target);
    let rejection = match &outcome.status {
        MoveStatus::Applied => None,
        MoveStatus::Rejected(reason) => Some(reason.to_string()),
    };

    Ok(MoveResult {
        scene: outcome.scene.to_json_string()?,
        rejection,
    })
}

pub fn edit_json(scene_json: &str, edit_json: &str) -> Result<String, OutlinerError> {
    let scene = Scene::from_json_str(scene_json)?;
    let edit: Edit = serde_json::from_str(edit_json)?;
    Ok(edit.apply(&scene)?.to_json_string()?)
}

/// Normalize a scene, returning the repaired scene and what was repaired
#[wasm_bindgen(js_name = normalize)]
pub fn normalize_js(scene_json: &str, options_json: Option<String>) -> Result<NormalizeResult, JsValue> {
    normalize_json(scene_json, options_json.as_deref()).map_err(to_js)
}

/// Build the render tree as JSON
#[wasm_bindgen(js_name = getTree)]
pub fn get_tree_js(scene_json: &str) -> Result<String, JsValue> {
    tree_json(scene_json).map_err(to_js)
}

/// Visible outliner rows, skipping the children of collapsed folders
#[wasm_bindgen(js_name = visibleRows)]
pub fn visible_rows_js(scene_json: &str, collapsed_json: &str) -> Result<String, JsValue> {
    rows_json(scene_json, collapsed_json).map_err(to_js)
}

/// Leaves in paint order
#[wasm_bindgen(js_name = flattenLeaves)]
pub fn flatten_leaves_js(scene_json: &str) -> Result<String, JsValue> {
    paint_order_json(scene_json).map_err(to_js)
}

#[wasm_bindgen(js_name = nextRank)]
pub fn next_rank_js(scene_json: &str, parent_id: Option<String>) -> Result<usize, JsValue> {
    next_rank_json(scene_json, parent_id.as_deref()).map_err(to_js)
}

/// Apply a drop. A rejected drop is not an error: `applied` is false and
/// `scene` holds the normalized input.
#[wasm_bindgen(js_name = moveNodes)]
pub fn move_nodes_js(scene_json: &str, keys_json: &str, target_json: &str) -> Result<MoveResult, JsValue> {
    move_json(scene_json, keys_json, target_json).map_err(to_js)
}

#[wasm_bindgen(js_name = applyEdit)]
pub fn apply_edit_js(scene_json: &str, edit_json_str: &str) -> Result<String, JsValue> {
    edit_json(scene_json, edit_json_str).map_err(to_js)
}

#[wasm_bindgen(js_name = isValidKey)]
pub fn is_valid_key_js(key: &str) -> bool {
    NodeKey::decode(key).is_some()
}
