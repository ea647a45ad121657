//! Document model and output backends for converted scripts.
//!
//! The line parser appends [`Block`]s to a [`Document`]; a
//! [`DocumentRenderer`] then turns the document into a concrete format via a
//! [`RenderBackend`] implementation.
//!
//! Two backends are provided:
//!
//! - [`HtmlBackend`]: printable HTML with `@page` geometry and embedded images
//! - [`TextBackend`]: plain text, one block per line

mod backend;
mod document;
mod html;
mod renderer;
mod text;
mod util;

pub use backend::{RenderBackend, RenderOptions};
pub use document::{Block, Document, PlaceholderHandle, Resource, image_label};
pub use html::HtmlBackend;
pub use renderer::DocumentRenderer;
pub use text::TextBackend;
pub use util::escape_html;
