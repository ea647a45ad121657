//! HTML backend for document rendering.
//!
//! Produces a standalone HTML5 page. Page geometry and numbering are
//! expressed as CSS `@page` rules so the output prints like the paged
//! original. Images are embedded as base64 data URIs.

use std::fmt::Write;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;

use crate::backend::{RenderBackend, RenderOptions};
use crate::document::image_label;
use crate::util::{escape_html, sniff_media_type};

/// HTML render backend.
pub struct HtmlBackend;

impl RenderBackend for HtmlBackend {
    const EXTENSION: &'static str = "html";

    fn document_start(options: &RenderOptions, out: &mut String) {
        let title = options.title.as_deref().unwrap_or("Script");
        let (width, height) = options.page_size;
        let page_counter = if options.page_numbers {
            " @bottom-center { content: counter(page); }"
        } else {
            ""
        };

        write!(
            out,
            r#"<!DOCTYPE html><html><head><meta charset="utf-8"><title>{}</title><style>"#,
            escape_html(title)
        )
        .unwrap();
        write!(
            out,
            "@page {{ size: {width}in {height}in; margin: {}in;{page_counter} }}",
            options.margin
        )
        .unwrap();
        write!(
            out,
            "body {{ line-height: {}; }} p {{ margin: 0; }} \
             .narration {{ text-indent: {}in; }} \
             .branch-label {{ color: #00bcd4; margin: 6pt 0; }} \
             .image-ref {{ color: #808080; }} \
             .page-break {{ break-after: page; }} \
             .resource-heading, figure.resource, .resource-error {{ text-align: center; }} \
             .resource-error {{ color: #ff0000; }}",
            options.line_spacing, options.narration_indent
        )
        .unwrap();
        out.push_str("</style></head><body>");
    }

    fn document_end(out: &mut String) {
        out.push_str("</body></html>");
    }

    fn main_title(text: &str, out: &mut String) {
        write!(out, r#"<h1 class="main-title">{}</h1>"#, escape_html(text)).unwrap();
    }

    fn title(text: &str, out: &mut String) {
        write!(out, r#"<h2 class="section-title">{}</h2>"#, escape_html(text)).unwrap();
    }

    fn scene_title(text: &str, out: &mut String) {
        write!(out, r#"<h3 class="scene-title">{}</h3>"#, escape_html(text)).unwrap();
    }

    fn timestamp(text: &str, out: &mut String) {
        write!(
            out,
            r#"<p class="scene-timestamp"><strong>{}</strong></p>"#,
            escape_html(text)
        )
        .unwrap();
    }

    fn dialogue(speaker: &str, text: &str, out: &mut String) {
        write!(
            out,
            r#"<p class="dialogue"><strong>{}:</strong>{}</p>"#,
            escape_html(speaker),
            escape_html(text)
        )
        .unwrap();
    }

    fn narration(text: &str, out: &mut String) {
        write!(out, r#"<p class="narration">{}</p>"#, escape_html(text)).unwrap();
    }

    fn sound_cue(text: &str, out: &mut String) {
        write!(
            out,
            r#"<p class="sound-cue">&lt;{}&gt;</p>"#,
            escape_html(text)
        )
        .unwrap();
    }

    fn branch_label(text: &str, out: &mut String) {
        write!(
            out,
            r#"<p class="branch-label"><strong>{}</strong></p>"#,
            escape_html(text)
        )
        .unwrap();
    }

    fn image_ref(index: usize, out: &mut String) {
        write!(
            out,
            r#"<p class="image-ref"><strong>[Image: {}]</strong></p>"#,
            image_label(index)
        )
        .unwrap();
    }

    fn spacer(out: &mut String) {
        out.push_str(r#"<p class="spacer">&nbsp;</p>"#);
    }

    fn section_break(out: &mut String) {
        out.push_str(r#"<div class="page-break"></div>"#);
    }

    fn resource_heading(out: &mut String) {
        out.push_str(r#"<h2 class="resource-heading">━━━ Images ━━━</h2>"#);
    }

    fn resource_image(index: usize, data: &[u8], url: &str, out: &mut String) {
        let label = image_label(index);
        write!(
            out,
            r#"<figure class="resource"><img src="data:{};base64,{}" alt="{label}" data-source="{}"><figcaption>{label}</figcaption></figure>"#,
            sniff_media_type(data),
            BASE64_STANDARD.encode(data),
            escape_html(url)
        )
        .unwrap();
    }

    fn resource_error(index: usize, url: &str, message: &str, out: &mut String) {
        let suffix = if message.is_empty() {
            String::new()
        } else {
            format!(" ({})", escape_html(message))
        };
        write!(
            out,
            r#"<p class="resource-error">[{} failed to load: {}]{suffix}</p>"#,
            image_label(index),
            escape_html(url)
        )
        .unwrap();
    }
}
