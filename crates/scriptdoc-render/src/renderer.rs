//! Generic document renderer.
//!
//! [`DocumentRenderer`] walks a [`Document`] once and hands every block to a
//! [`RenderBackend`]. Output format is selected through the type parameter.

use std::marker::PhantomData;

use crate::backend::{RenderBackend, RenderOptions};
use crate::document::{Block, Document, Resource};

/// Renderer parameterized by output backend.
///
/// # Example
///
/// ```
/// use scriptdoc_render::{Document, DocumentRenderer, TextBackend};
///
/// let mut doc = Document::new();
/// doc.add_dialogue("Amiya", "Hello");
///
/// let out = DocumentRenderer::<TextBackend>::new().render(&doc);
/// assert_eq!(out, "Amiya:Hello\n");
/// ```
pub struct DocumentRenderer<B: RenderBackend> {
    options: RenderOptions,
    _backend: PhantomData<B>,
}

impl<B: RenderBackend> Default for DocumentRenderer<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: RenderBackend> DocumentRenderer<B> {
    /// Create a renderer with default layout options.
    #[must_use]
    pub fn new() -> Self {
        Self {
            options: RenderOptions::default(),
            _backend: PhantomData,
        }
    }

    /// Replace layout options.
    #[must_use]
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the document title used in output metadata.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.options.title = Some(title.into());
        self
    }

    /// Layout options in effect.
    #[must_use]
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render the whole document.
    #[must_use]
    pub fn render(&self, document: &Document) -> String {
        let mut out = String::new();
        B::document_start(&self.options, &mut out);
        for block in document.blocks() {
            Self::render_block(block, &mut out);
        }
        B::document_end(&mut out);
        out
    }

    fn render_block(block: &Block, out: &mut String) {
        match block {
            Block::MainTitle(text) => B::main_title(text, out),
            Block::Title(text) => B::title(text, out),
            Block::SceneTitle(text) => B::scene_title(text, out),
            Block::Timestamp(text) => B::timestamp(text, out),
            Block::Dialogue { speaker, text } => B::dialogue(speaker, text, out),
            Block::Narration(text) => B::narration(text, out),
            Block::SoundCue(text) => B::sound_cue(text, out),
            Block::BranchLabel(text) => B::branch_label(text, out),
            Block::ImageRef { index } => B::image_ref(*index, out),
            Block::Spacer => B::spacer(out),
            Block::SectionBreak => B::section_break(out),
            Block::ResourceHeading => B::resource_heading(out),
            Block::Resource { index, resource } => match resource {
                Resource::Image { data, url } => B::resource_image(*index, data, url, out),
                Resource::Error { url, message } => B::resource_error(*index, url, message, out),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HtmlBackend, TextBackend};
    use pretty_assertions::assert_eq;

    fn sample() -> Document {
        let mut doc = Document::new();
        doc.add_main_title("Collected");
        doc.add_title("Amiya Chapter 1");
        doc.add_scene_title("Rooftop");
        doc.add_timestamp("Night");
        doc.add_dialogue("Amiya", "Hello");
        doc.add_narration("\"It was quiet.\"");
        doc.add_sound_cue("distant thunder");
        doc.add_branch_label("[→ Stay]");
        let handle = doc.add_image_placeholder(1);
        doc.update_placeholder(handle, 1);
        doc.add_spacer(1);
        doc.set_resource_section([(
            1,
            Resource::Error {
                url: "https://img/a.png".to_owned(),
                message: "HTTP 404".to_owned(),
            },
        )]);
        doc
    }

    #[test]
    fn test_text_render_preserves_order() {
        let out = DocumentRenderer::<TextBackend>::new().render(&sample());
        assert_eq!(
            out,
            "Collected\n=========\n## Amiya Chapter 1\n### Rooftop\nNight\nAmiya:Hello\n    \
             \"It was quiet.\"\n<distant thunder>\n[→ Stay]\n[Image: Image 1]\n\n\u{c}\n\
             ━━━ Images ━━━\n[Image 1 failed to load: https://img/a.png] (HTTP 404)\n"
        );
    }

    #[test]
    fn test_html_render_wraps_document() {
        let out = DocumentRenderer::<HtmlBackend>::new()
            .with_title("Collected")
            .render(&sample());
        assert!(out.starts_with("<!DOCTYPE html>"));
        assert!(out.ends_with("</body></html>"));
        assert!(out.contains("counter(page)"));

        let dialogue = out.find("Amiya:</strong>Hello").unwrap();
        let heading = out.find("━━━ Images ━━━").unwrap();
        assert!(dialogue < heading);
    }

    #[test]
    fn test_empty_document() {
        let out = DocumentRenderer::<TextBackend>::new().render(&Document::new());
        assert_eq!(out, "");
    }
}
