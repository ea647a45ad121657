//! Plain text backend.
//!
//! One block per line. Useful for diffing conversions and for terminals.

use std::fmt::Write;

use crate::backend::RenderBackend;
use crate::document::image_label;

/// Plain text render backend.
pub struct TextBackend;

impl RenderBackend for TextBackend {
    const EXTENSION: &'static str = "txt";

    fn main_title(text: &str, out: &mut String) {
        writeln!(out, "{text}").unwrap();
        writeln!(out, "{}", "=".repeat(text.chars().count().max(3))).unwrap();
    }

    fn title(text: &str, out: &mut String) {
        writeln!(out, "## {text}").unwrap();
    }

    fn scene_title(text: &str, out: &mut String) {
        writeln!(out, "### {text}").unwrap();
    }

    fn timestamp(text: &str, out: &mut String) {
        writeln!(out, "{text}").unwrap();
    }

    fn dialogue(speaker: &str, text: &str, out: &mut String) {
        writeln!(out, "{speaker}:{text}").unwrap();
    }

    fn narration(text: &str, out: &mut String) {
        writeln!(out, "    {text}").unwrap();
    }

    fn sound_cue(text: &str, out: &mut String) {
        writeln!(out, "<{text}>").unwrap();
    }

    fn branch_label(text: &str, out: &mut String) {
        writeln!(out, "{text}").unwrap();
    }

    fn image_ref(index: usize, out: &mut String) {
        writeln!(out, "[Image: {}]", image_label(index)).unwrap();
    }

    fn spacer(out: &mut String) {
        out.push('\n');
    }

    fn section_break(out: &mut String) {
        out.push('\u{c}');
        out.push('\n');
    }

    fn resource_heading(out: &mut String) {
        out.push_str("━━━ Images ━━━\n");
    }

    fn resource_image(index: usize, data: &[u8], url: &str, out: &mut String) {
        writeln!(out, "{} ({url}, {} bytes)", image_label(index), data.len()).unwrap();
    }

    fn resource_error(index: usize, url: &str, message: &str, out: &mut String) {
        if message.is_empty() {
            writeln!(out, "[{} failed to load: {url}]", image_label(index)).unwrap();
        } else {
            writeln!(out, "[{} failed to load: {url}] ({message})", image_label(index)).unwrap();
        }
    }
}
