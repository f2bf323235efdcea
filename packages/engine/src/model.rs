//! # Scene Records
//!
//! Flat records as the persistence layer stores them. Each node only knows
//! its parent folder and its rank among siblings; the hierarchy is derived.
//!
//! Every field defaults when missing so legacy or partially written scenes
//! still deserialize. Nothing here guarantees consistency; that is what
//! [`crate::normalize`] is for.

use crate::error::OutlinerError;
use crate::key::NodeKey;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A folder in the outliner. May contain folders and leaves.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Parent folder id, `None` for the scene root
    #[serde(default)]
    pub parent_id: Option<String>,

    /// Rank among siblings (contiguous from 0 once normalized)
    #[serde(default)]
    pub order: Option<f64>,
}

/// A placeable object. Always terminal.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaf {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub parent_id: Option<String>,

    /// Single-level grouping from before folders could nest.
    /// Only read as a fallback for `parent_id`; cleared by normalization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,

    #[serde(default)]
    pub order: Option<f64>,

    /// Application data the engine carries but never inspects
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

/// One container of folders and leaves
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub folders: Vec<Folder>,

    #[serde(default)]
    pub leaves: Vec<Leaf>,
}

/// Treat blank strings the same as missing ones
pub(crate) fn usable(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

/// Integral, non-negative rank of a raw order value
pub(crate) fn rank_of(order: Option<f64>) -> Option<usize> {
    match order {
        Some(o) if o.is_finite() && o >= 0.0 && o.fract() == 0.0 => Some(o as usize),
        _ => None,
    }
}

impl Folder {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id: None,
            order: None,
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_order(mut self, order: f64) -> Self {
        self.order = Some(order);
        self
    }

    pub fn key(&self) -> NodeKey {
        NodeKey::Folder(self.id.clone())
    }

    pub fn parent(&self) -> Option<&str> {
        usable(self.parent_id.as_deref())
    }

    pub fn rank(&self) -> Option<usize> {
        rank_of(self.order)
    }
}

impl Leaf {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_legacy_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    pub fn with_order(mut self, order: f64) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_payload(mut self, field: impl Into<String>, value: Value) -> Self {
        self.payload.insert(field.into(), value);
        self
    }

    pub fn key(&self) -> NodeKey {
        NodeKey::Leaf(self.id.clone())
    }

    pub fn parent(&self) -> Option<&str> {
        usable(self.parent_id.as_deref())
    }

    pub fn rank(&self) -> Option<usize> {
        rank_of(self.order)
    }
}

impl Scene {
    pub fn new(folders: Vec<Folder>, leaves: Vec<Leaf>) -> Self {
        Self { folders, leaves }
    }

    pub fn from_json_str(json: &str) -> Result<Self, OutlinerError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String, OutlinerError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn folder(&self, id: &str) -> Option<&Folder> {
        self.folders.iter().find(|f| f.id == id)
    }

    pub fn leaf(&self, id: &str) -> Option<&Leaf> {
        self.leaves.iter().find(|l| l.id == id)
    }

    pub fn contains(&self, key: &NodeKey) -> bool {
        match key {
            NodeKey::Folder(id) => self.folder(id).is_some(),
            NodeKey::Leaf(id) => self.leaf(id).is_some(),
        }
    }

    /// Parent folder id of a node, `None` when at root or unknown
    pub fn parent_of(&self, key: &NodeKey) -> Option<&str> {
        match key {
            NodeKey::Folder(id) => self.folder(id).and_then(Folder::parent),
            NodeKey::Leaf(id) => self.leaf(id).and_then(Leaf::parent),
        }
    }

    pub fn node_count(&self) -> usize {
        self.folders.len() + self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.leaves.is_empty()
    }
}
