//! Document assembly.
//!
//! A [`DocumentAssembler`] is one parse session: it owns a registry with the
//! standard rules, feeds it one or more texts, inserts section titles and
//! spacers between them, and finalizes rules once when the document is taken
//! for rendering.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use scriptdoc_config::Config;
use scriptdoc_render::{
    Document, DocumentRenderer, HtmlBackend, RenderBackend, RenderOptions, TextBackend,
};

use crate::error::AssembleError;
use crate::kind::RuleKind;
use crate::registry::{LineOutcome, ParserRegistry};
use crate::resources::{Fetch, HttpFetcher};
use crate::rules::{
    ControlRule, DecisionRule, DialogueRule, ImageRule, NarrationRule, PredicateRule, SceneRule,
    SoundRule, SubtitleRule,
};
use crate::story::Story;

/// Per-text options for [`DocumentAssembler::parse_text`].
#[derive(Clone, Debug, Default)]
pub struct Section {
    /// Section title. Sections after the first are preceded by spacers.
    pub title: Option<String>,
    /// Prepended to the title with no separator.
    pub speaker_prefix: Option<String>,
    /// Spacer lines before this section, overriding the configured count.
    pub spacer_lines: Option<usize>,
    /// Document title, added once per session.
    pub main_title: Option<String>,
    /// Replaces the active image id to URL map.
    pub image_map: Option<HashMap<String, String>>,
}

impl Section {
    /// Section with a title.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_speaker_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.speaker_prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn with_spacer_lines(mut self, n: usize) -> Self {
        self.spacer_lines = Some(n);
        self
    }

    #[must_use]
    pub fn with_main_title(mut self, title: impl Into<String>) -> Self {
        self.main_title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_image_map(mut self, image_map: HashMap<String, String>) -> Self {
        self.image_map = Some(image_map);
        self
    }
}

/// Build a registry holding every standard rule, configured from `config`.
#[must_use]
pub fn standard_registry(config: &Config, fetcher: Arc<dyn Fetch>) -> ParserRegistry {
    let mut registry = ParserRegistry::new();
    for kind in RuleKind::ALL {
        let rule_config = config.rule(kind.name());
        let priority = rule_config
            .and_then(|rule| rule.priority)
            .unwrap_or_else(|| kind.default_priority());

        match kind {
            RuleKind::Control => registry.register_with_priority(ControlRule, priority),
            RuleKind::Image => registry.register_with_priority(
                ImageRule::new(Arc::clone(&fetcher)).with_parallel(config.images.parallel),
                priority,
            ),
            RuleKind::Decision => registry.register_with_priority(DecisionRule, priority),
            RuleKind::Predicate => registry.register_with_priority(PredicateRule, priority),
            RuleKind::Scene => registry.register_with_priority(SceneRule, priority),
            RuleKind::Subtitle => registry.register_with_priority(SubtitleRule, priority),
            RuleKind::Dialogue => registry.register_with_priority(DialogueRule, priority),
            RuleKind::Sound => registry.register_with_priority(
                SoundRule::new().with_skip_resource_ids(config.skip_resource_ids()),
                priority,
            ),
            RuleKind::Narration => registry.register_with_priority(NarrationRule, priority),
        }

        if rule_config.and_then(|rule| rule.enabled) == Some(false) {
            registry.disable(kind);
        }
    }
    registry
}

/// Render options derived from document and formatting settings.
#[must_use]
pub fn render_options(config: &Config) -> RenderOptions {
    RenderOptions {
        title: None,
        page_size: config.document.page_size.dimensions(),
        margin: config.document.margin_size.inches(),
        page_numbers: config.document.add_page_numbers,
        line_spacing: config.formatting.line_spacing,
        narration_indent: config.formatting.narration_indent,
    }
}

/// One output document built from one or more texts.
pub struct DocumentAssembler {
    registry: ParserRegistry,
    spacer_lines: usize,
    render_options: RenderOptions,
    skipped: Vec<String>,
    first_section: bool,
    main_title: Option<String>,
}

impl Default for DocumentAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentAssembler {
    /// Assembler with default settings, fetching images over HTTP.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(&Config::default())
    }

    /// Assembler configured from `config`, fetching images over HTTP.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let fetcher = Arc::new(HttpFetcher::new(config.images.timeout()));
        Self::with_fetcher(config, fetcher)
    }

    /// Assembler configured from `config` with a custom fetcher.
    #[must_use]
    pub fn with_fetcher(config: &Config, fetcher: Arc<dyn Fetch>) -> Self {
        Self {
            registry: standard_registry(config, fetcher),
            spacer_lines: config.document.spacer_lines,
            render_options: render_options(config),
            skipped: Vec::new(),
            first_section: true,
            main_title: None,
        }
    }

    pub fn registry(&self) -> &ParserRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ParserRegistry {
        &mut self.registry
    }

    /// Document built so far. Resources are appended only by finalization.
    pub fn document(&self) -> &Document {
        &self.registry.context().document
    }

    /// Lines no rule recognized, across all texts, in input order.
    pub fn skipped_lines(&self) -> &[String] {
        &self.skipped
    }

    /// Replace the active image id to URL map for subsequent texts.
    pub fn set_image_map(&mut self, image_map: HashMap<String, String>) {
        self.registry.context_mut().set_image_map(image_map);
    }

    pub fn enable_rule(&mut self, kind: RuleKind) -> bool {
        self.registry.enable(kind)
    }

    pub fn disable_rule(&mut self, kind: RuleKind) -> bool {
        self.registry.disable(kind)
    }

    /// Add the document title. Only the first non-empty call has an effect.
    pub fn add_main_title(&mut self, text: &str) {
        if text.is_empty() || self.main_title.is_some() {
            return;
        }
        self.registry.context_mut().document.add_main_title(text);
        self.main_title = Some(text.to_owned());
    }

    /// Add a section title, prefixed by `speaker_prefix` with no separator.
    pub fn add_title(&mut self, title: &str, speaker_prefix: Option<&str>) {
        if title.is_empty() {
            return;
        }
        let text = format!("{}{title}", speaker_prefix.unwrap_or_default());
        self.registry.context_mut().document.add_title(text);
    }

    pub fn add_page_break(&mut self) {
        self.registry.context_mut().document.add_section_break();
    }

    pub fn add_blank_lines(&mut self, n: usize) {
        self.registry.context_mut().document.add_spacer(n);
    }

    /// Parse a text blob, one line at a time.
    ///
    /// Returns every skipped line accumulated in this session.
    pub fn parse_text(&mut self, text: &str, section: Section) -> &[String] {
        if let Some(main_title) = &section.main_title {
            self.add_main_title(main_title);
        }
        self.parse_lines(text.lines(), section)
    }

    /// Parse already split lines.
    ///
    /// Returns every skipped line accumulated in this session.
    pub fn parse_lines<I, S>(&mut self, lines: I, section: Section) -> &[String]
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let Some(image_map) = section.image_map {
            self.set_image_map(image_map);
        }
        self.registry.initialize_all();

        if let Some(title) = section.title.as_deref().filter(|t| !t.is_empty()) {
            if !self.first_section {
                self.add_blank_lines(section.spacer_lines.unwrap_or(self.spacer_lines));
            }
            self.add_title(title, section.speaker_prefix.as_deref());
            self.first_section = false;
            tracing::debug!(title, "Starting section");
        }

        let before = self.skipped.len();
        for raw in lines {
            let raw = raw.as_ref();
            if self.registry.dispatch(raw) == LineOutcome::Unrecognized {
                tracing::debug!(line = raw, "Skipping unrecognized line");
                self.skipped.push(raw.trim_end_matches(['\r', '\n']).to_owned());
            }
        }
        tracing::debug!(skipped = self.skipped.len() - before, "Parsed section");

        &self.skipped
    }

    /// Parse a story as its own section titled by the story name.
    ///
    /// Stories without content are skipped.
    pub fn parse_story(&mut self, story: &Story, speaker_prefix: Option<&str>) -> &[String] {
        if story.origin_content.trim().is_empty() {
            tracing::debug!(story = %story.name, "Story has no content");
            return &self.skipped;
        }

        let mut section = Section::titled(story.name.clone());
        section.speaker_prefix = speaker_prefix.map(str::to_owned);
        if !story.image_map.is_empty() {
            section.image_map = Some(story.image_map.clone());
        }
        self.parse_text(&story.origin_content, section)
    }

    /// Run every rule's finalize step.
    ///
    /// Deferred image fetches are resolved and the trailing resource
    /// section is set. Repeated calls fetch only references queued since,
    /// keep numbering and dedup across the session and replace the section
    /// rather than adding another.
    pub fn finalize(&mut self) {
        self.registry.finalize_all();
    }

    /// Finalize and hand over the document and skipped lines.
    #[must_use]
    pub fn finish(mut self) -> (Document, Vec<String>) {
        self.finalize();
        let document = self.registry.context_mut().take_document();
        (document, self.skipped)
    }

    /// Finalize and render with backend `B`.
    pub fn render<B: RenderBackend>(&mut self) -> String {
        self.finalize();
        let mut options = self.render_options.clone();
        options.title.clone_from(&self.main_title);
        DocumentRenderer::<B>::new()
            .with_options(options)
            .render(self.document())
    }

    /// Finalize, render by file extension and write to `path`.
    ///
    /// `.html`/`.htm` produce HTML and `.txt` plain text. Returns the
    /// skipped lines.
    pub fn save(&mut self, path: &Path) -> Result<Vec<String>, AssembleError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let output = match extension.as_deref() {
            Some("html" | "htm") => self.render::<HtmlBackend>(),
            Some(ext) if ext == TextBackend::EXTENSION => self.render::<TextBackend>(),
            _ => {
                return Err(AssembleError::Render {
                    path: path.display().to_string(),
                });
            }
        };

        std::fs::write(path, output)?;
        tracing::info!(
            path = %path.display(),
            blocks = self.document().len(),
            skipped = self.skipped.len(),
            "Saved document"
        );
        Ok(self.skipped.clone())
    }
}
