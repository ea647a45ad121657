//! Shared parsing context.

use std::collections::HashMap;

use scriptdoc_render::Document;

use crate::state::StateStore;

/// Mutable state handed to every rule.
///
/// Lives for one parse session. The document is the render target rules
/// append to; the image map resolves image identifiers to URLs.
#[derive(Debug, Default)]
pub struct ParserContext {
    /// Per-rule state slots.
    pub state: StateStore,
    /// Render stream being built.
    pub document: Document,
    image_map: HashMap<String, String>,
}

impl ParserContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the active image id to URL map.
    pub fn set_image_map(&mut self, image_map: HashMap<String, String>) {
        self.image_map = image_map;
    }

    /// Resolve an image identifier.
    #[must_use]
    pub fn image_url(&self, id: &str) -> Option<&str> {
        self.image_map.get(id).map(String::as_str)
    }

    #[must_use]
    pub fn image_map(&self) -> &HashMap<String, String> {
        &self.image_map
    }

    /// Take the built document, leaving an empty one in its place.
    pub fn take_document(&mut self) -> Document {
        std::mem::take(&mut self.document)
    }

    /// Drop all rule state and output.
    pub fn reset(&mut self) {
        self.state.clear();
        self.document = Document::new();
        self.image_map.clear();
    }
}
