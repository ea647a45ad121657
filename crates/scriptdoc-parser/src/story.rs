//! Story input unit.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::AssembleError;

/// One story as delivered by an upstream source.
///
/// `intro` is carried but never parsed. `image_map` resolves the image
/// identifiers used in `origin_content`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Story {
    pub name: String,
    pub intro: String,
    pub origin_content: String,
    pub image_map: HashMap<String, String>,
}

impl Story {
    /// Parse a JSON array of stories.
    pub fn list_from_json(content: &str) -> Result<Vec<Story>, AssembleError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Read a JSON array of stories from `path`.
    pub fn list_from_file(path: &Path) -> Result<Vec<Story>, AssembleError> {
        let content = std::fs::read_to_string(path)?;
        Self::list_from_json(&content)
    }
}
