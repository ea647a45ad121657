//! CLI error types.

use scriptdoc_config::ConfigError;
use scriptdoc_parser::AssembleError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Assemble(#[from] AssembleError),

    #[error("Invalid image map: {0}")]
    ImageMap(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(String),
}
