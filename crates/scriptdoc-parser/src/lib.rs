//! Line parsing engine for game-script transcripts.
//!
//! Scripts mix bracketed directives, inline tags and plain dialogue. Each
//! directive family is recognized by one [`LineRule`]; a [`ParserRegistry`]
//! tries enabled rules in ascending priority and hands every line to the
//! first rule that claims it. Rules share state through a typed
//! [`StateStore`] in the [`ParserContext`] and append to a render stream
//! ([`scriptdoc_render::Document`]).
//!
//! Image directives are deferred: their fetches run once the last line is
//! parsed, identical payloads collapse to one numbered resource, and the
//! in-text placeholders are rewritten to the final numbering.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use scriptdoc_config::Config;
//! use scriptdoc_parser::{DocumentAssembler, MemoryFetcher, Section};
//! use scriptdoc_render::Block;
//!
//! let mut assembler =
//!     DocumentAssembler::with_fetcher(&Config::default(), Arc::new(MemoryFetcher::new()));
//! let skipped = assembler
//!     .parse_text("[name=\"Amiya\"]Hello\n@@@garbage@@@", Section::titled("Prologue"))
//!     .to_vec();
//!
//! assert_eq!(skipped, vec!["@@@garbage@@@"]);
//! let (document, _) = assembler.finish();
//! assert_eq!(
//!     document.blocks()[1],
//!     Block::Dialogue { speaker: "Amiya".to_owned(), text: "Hello".to_owned() }
//! );
//! ```

mod assembler;
mod context;
mod error;
mod kind;
mod registry;
mod resources;
mod rule;
pub mod rules;
mod speakers;
mod state;
mod story;

pub use assembler::{DocumentAssembler, Section, render_options, standard_registry};
pub use context::ParserContext;
pub use error::AssembleError;
pub use kind::{RuleKind, UnknownRule};
pub use registry::{LineOutcome, ParserRegistry};
pub use resources::{
    CollectedResources, Fetch, FetchError, HttpFetcher, MemoryFetcher, PendingFetch,
    ResourceCollector, ResourceEntry, content_hash,
};
pub use rule::LineRule;
pub use speakers::extract_speakers;
pub use state::{StateKey, StateStore};
pub use story::Story;
