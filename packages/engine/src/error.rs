//! Error types for the outliner engine
//!
//! Normalizing, building trees and moving nodes never fail. Errors only come
//! from the boundaries: JSON in/out, string keys and edit commands.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutlinerError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Key error: {0}")]
    Key(#[from] crate::key::KeyError),

    #[error("Edit error: {0}")]
    Edit(#[from] crate::edit::EditError),
}
