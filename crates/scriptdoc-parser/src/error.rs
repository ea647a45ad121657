//! Error types for document assembly.

use std::io;

/// Error raised while loading input or writing the rendered document.
#[derive(Debug, thiserror::Error)]
pub enum AssembleError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid story JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Cannot render '{path}': unsupported output format")]
    Render { path: String },
}
