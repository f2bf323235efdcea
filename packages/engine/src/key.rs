//! # Node Keys
//!
//! Folders and leaves share one selection/ordering namespace. A node is
//! addressed by its kind plus its id, so a folder and a leaf may carry the
//! same id without colliding.
//!
//! The string form (`folder:<id>` / `leaf:<id>`) only exists at boundaries
//! that need string keys, e.g. UI selection sets. Inside the engine keys are
//! always the [`NodeKey`] sum type.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const FOLDER_PREFIX: &str = "folder";
const LEAF_PREFIX: &str = "leaf";
const SEPARATOR: char = ':';

/// Kind of a node in the outliner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Folder,
    Leaf,
}

impl NodeKind {
    /// Prefix used in the encoded key
    pub fn prefix(self) -> &'static str {
        match self {
            NodeKind::Folder => FOLDER_PREFIX,
            NodeKind::Leaf => LEAF_PREFIX,
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            FOLDER_PREFIX => Some(NodeKind::Folder),
            LEAF_PREFIX => Some(NodeKind::Leaf),
            _ => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Identity of a folder or leaf
///
/// Ordering sorts folders before leaves, then by id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKey {
    Folder(String),
    Leaf(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum KeyError {
    #[error("Missing separator in node key: {0}")]
    MissingSeparator(String),

    #[error("Unknown node kind in key: {0}")]
    UnknownKind(String),

    #[error("Empty id in node key: {0}")]
    EmptyId(String),
}

impl NodeKey {
    pub fn folder(id: impl Into<String>) -> Self {
        NodeKey::Folder(id.into())
    }

    pub fn leaf(id: impl Into<String>) -> Self {
        NodeKey::Leaf(id.into())
    }

    pub fn new(kind: NodeKind, id: impl Into<String>) -> Self {
        match kind {
            NodeKind::Folder => NodeKey::Folder(id.into()),
            NodeKind::Leaf => NodeKey::Leaf(id.into()),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            NodeKey::Folder(_) => NodeKind::Folder,
            NodeKey::Leaf(_) => NodeKind::Leaf,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            NodeKey::Folder(id) | NodeKey::Leaf(id) => id,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, NodeKey::Folder(_))
    }

    /// Encode a kind and id into the string key form
    pub fn encode(kind: NodeKind, id: &str) -> String {
        format!("{}{}{}", kind.prefix(), SEPARATOR, id)
    }

    /// Decode a string key, `None` for anything `encode` can't produce
    pub fn decode(key: &str) -> Option<Self> {
        key.parse().ok()
    }
}

impl FromStr for NodeKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Ids may contain the separator, only the first one splits
        let (prefix, id) = s
            .split_once(SEPARATOR)
            .ok_or_else(|| KeyError::MissingSeparator(s.to_string()))?;

        let kind = NodeKind::from_prefix(prefix)
            .ok_or_else(|| KeyError::UnknownKind(s.to_string()))?;

        if id.is_empty() {
            return Err(KeyError::EmptyId(s.to_string()));
        }

        Ok(NodeKey::new(kind, id))
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.kind().prefix(), SEPARATOR, self.id())
    }
}

impl Serialize for NodeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NodeKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
