//! Render backend trait for format-specific rendering.
//!
//! This trait abstracts the differences between output formats, allowing
//! [`DocumentRenderer`](crate::DocumentRenderer) to walk the block stream once
//! and delegate every element to the backend.

/// Layout and formatting options passed to every backend call that needs them.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderOptions {
    /// Document title used for metadata (e.g., HTML `<title>`).
    pub title: Option<String>,
    /// Page width and height in inches.
    pub page_size: (f32, f32),
    /// Margin on every side, in inches.
    pub margin: f32,
    /// Whether to number pages.
    pub page_numbers: bool,
    /// Line spacing multiplier.
    pub line_spacing: f32,
    /// First-line indent of narration, in inches.
    pub narration_indent: f32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            title: None,
            page_size: (8.27, 11.69),
            margin: 0.5,
            page_numbers: true,
            line_spacing: 1.5,
            narration_indent: 0.28,
        }
    }
}

/// Backend trait for format-specific rendering operations.
///
/// Every method appends to `out`. Implementations must not reorder blocks
/// or drop any of them; the renderer calls exactly one method per block.
pub trait RenderBackend {
    /// Conventional file extension of the output, without the dot.
    const EXTENSION: &'static str;

    /// Write anything that precedes the first block (headers, styles).
    fn document_start(_options: &RenderOptions, _out: &mut String) {}

    /// Write anything that follows the last block.
    fn document_end(_out: &mut String) {}

    fn main_title(text: &str, out: &mut String);

    fn title(text: &str, out: &mut String);

    fn scene_title(text: &str, out: &mut String);

    fn timestamp(text: &str, out: &mut String);

    /// Render dialogue. The speaker and colon are emphasized and the
    /// utterance follows with no separating whitespace.
    fn dialogue(speaker: &str, text: &str, out: &mut String);

    fn narration(text: &str, out: &mut String);

    fn sound_cue(text: &str, out: &mut String);

    fn branch_label(text: &str, out: &mut String);

    /// Render an in-text image reference pointing at `index`.
    fn image_ref(index: usize, out: &mut String);

    fn spacer(out: &mut String);

    fn section_break(out: &mut String);

    fn resource_heading(out: &mut String);

    /// Render a fetched image captioned with its final index.
    fn resource_image(index: usize, data: &[u8], url: &str, out: &mut String);

    /// Render a visible marker for an image that failed to load.
    fn resource_error(index: usize, url: &str, message: &str, out: &mut String);
}
