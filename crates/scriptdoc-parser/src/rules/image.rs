//! Image directives.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use scriptdoc_render::PlaceholderHandle;

use crate::context::ParserContext;
use crate::kind::RuleKind;
use crate::resources::{CollectedResources, Fetch, PendingFetch, ResourceCollector};
use crate::rule::LineRule;
use crate::state::StateKey;

static IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)Image\(image\s*=\s*"([^"]+)""#).unwrap());

/// Queued image references of the current session.
pub const IMAGE_STATE: StateKey<ImageState> = StateKey::new("image");

/// Image references seen so far.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageState {
    /// Last allocated local index.
    pub counter: usize,
    /// Placeholder emitted for each local index.
    pub pending_refs: HashMap<usize, PlaceholderHandle>,
    /// Fetches deferred until finalize, in reference order.
    pub pending_fetches: Vec<PendingFetch>,
    /// Resources finalized so far. Numbering and dedup span the session.
    pub collected: CollectedResources,
}

/// `Image(image="id")` emits a numbered placeholder and queues the fetch.
///
/// Identifiers missing from the image map are consumed without output.
pub struct ImageRule {
    fetcher: Arc<dyn Fetch>,
    parallel: bool,
}

impl ImageRule {
    #[must_use]
    pub fn new(fetcher: Arc<dyn Fetch>) -> Self {
        Self {
            fetcher,
            parallel: false,
        }
    }

    /// Fetch queued images in parallel at finalize.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

impl LineRule for ImageRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Image
    }

    fn can_parse(&self, line: &str, _ctx: &ParserContext) -> bool {
        IMAGE_RE.is_match(line)
    }

    fn parse(&mut self, line: &str, ctx: &mut ParserContext) -> bool {
        let Some(caps) = IMAGE_RE.captures(line) else {
            return false;
        };
        let id = caps[1].trim();
        let Some(url) = ctx.image_url(id).map(str::to_owned) else {
            tracing::debug!(id, "Image id not in image map");
            return true;
        };

        let state = ctx.state.get_or_default(IMAGE_STATE);
        state.counter += 1;
        let local_index = state.counter;
        let handle = ctx.document.add_image_placeholder(local_index);
        state.pending_refs.insert(local_index, handle);
        state.pending_fetches.push(PendingFetch { local_index, url });
        true
    }

    fn initialize(&mut self, ctx: &mut ParserContext) {
        ctx.state.insert(IMAGE_STATE, ImageState::default());
    }

    fn finalize(&mut self, ctx: &mut ParserContext) {
        let Some(state) = ctx.state.get_mut(IMAGE_STATE) else {
            return;
        };
        if state.pending_fetches.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut state.pending_fetches);
        let placeholders = std::mem::take(&mut state.pending_refs);

        ResourceCollector::new(self.fetcher.as_ref())
            .with_parallel(self.parallel)
            .collect_into(&pending, &mut state.collected);
        state.collected.apply(&mut ctx.document, &placeholders);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::MemoryFetcher;
    use pretty_assertions::assert_eq;
    use scriptdoc_render::{Block, Resource};

    fn context() -> ParserContext {
        let mut ctx = ParserContext::new();
        ctx.set_image_map(HashMap::from([
            ("cg_01".to_owned(), "https://img/cg_01.png".to_owned()),
            ("cg_02".to_owned(), "https://img/cg_02.png".to_owned()),
        ]));
        ctx
    }

    #[test]
    fn test_queues_known_ids() {
        let mut ctx = context();
        let mut rule = ImageRule::new(Arc::new(MemoryFetcher::new()));
        rule.initialize(&mut ctx);

        let line = r#"[image(image="cg_02", fadetime=1)]"#;
        assert!(rule.can_parse(line, &ctx));
        assert!(rule.parse(line, &mut ctx));

        let state = ctx.state.get(IMAGE_STATE).unwrap();
        assert_eq!(state.counter, 1);
        assert_eq!(
            state.pending_fetches,
            vec![PendingFetch {
                local_index: 1,
                url: "https://img/cg_02.png".to_owned(),
            }]
        );
        assert_eq!(ctx.document.blocks(), &[Block::ImageRef { index: 1 }]);
    }

    #[test]
    fn test_unknown_id_is_consumed_silently() {
        let mut ctx = context();
        let mut rule = ImageRule::new(Arc::new(MemoryFetcher::new()));
        assert!(rule.parse(r#"[Image(image="missing")]"#, &mut ctx));
        assert!(ctx.document.is_empty());
    }

    #[test]
    fn test_finalize_without_images_does_nothing() {
        let fetcher = Arc::new(MemoryFetcher::new());
        let mut ctx = context();
        let mut rule = ImageRule::new(Arc::clone(&fetcher) as Arc<dyn Fetch>);
        rule.initialize(&mut ctx);
        rule.finalize(&mut ctx);

        assert!(ctx.document.is_empty());
        assert!(fetcher.requests().is_empty());
    }

    #[test]
    fn test_finalize_appends_resources_once() {
        let fetcher = Arc::new(
            MemoryFetcher::new().with_failure("https://img/cg_01.png", "timed out"),
        );
        let mut ctx = context();
        let mut rule = ImageRule::new(Arc::clone(&fetcher) as Arc<dyn Fetch>);
        rule.initialize(&mut ctx);
        rule.parse(r#"[Image(image="cg_01")]"#, &mut ctx);
        rule.finalize(&mut ctx);
        rule.finalize(&mut ctx);

        assert_eq!(
            ctx.document.blocks(),
            &[
                Block::ImageRef { index: 1 },
                Block::SectionBreak,
                Block::ResourceHeading,
                Block::Resource {
                    index: 1,
                    resource: Resource::Error {
                        url: "https://img/cg_01.png".to_owned(),
                        message: "HTTP error: timed out".to_owned(),
                    },
                },
            ]
        );
        assert_eq!(fetcher.requests().len(), 1);
    }

    #[test]
    fn test_finalize_again_extends_numbering() {
        let fetcher = Arc::new(
            MemoryFetcher::new()
                .with_resource("https://img/cg_01.png", b"one".to_vec())
                .with_resource("https://img/cg_02.png", b"two".to_vec()),
        );
        let mut ctx = context();
        let mut rule = ImageRule::new(Arc::clone(&fetcher) as Arc<dyn Fetch>);
        rule.initialize(&mut ctx);
        rule.parse(r#"[Image(image="cg_01")]"#, &mut ctx);
        rule.finalize(&mut ctx);
        rule.parse(r#"[Image(image="cg_02")]"#, &mut ctx);
        rule.finalize(&mut ctx);

        assert_eq!(
            ctx.document.blocks(),
            &[
                Block::ImageRef { index: 1 },
                Block::ImageRef { index: 2 },
                Block::SectionBreak,
                Block::ResourceHeading,
                Block::Resource {
                    index: 1,
                    resource: Resource::Image {
                        data: b"one".to_vec(),
                        url: "https://img/cg_01.png".to_owned(),
                    },
                },
                Block::Resource {
                    index: 2,
                    resource: Resource::Image {
                        data: b"two".to_vec(),
                        url: "https://img/cg_02.png".to_owned(),
                    },
                },
            ]
        );
        assert_eq!(fetcher.requests().len(), 2);
    }
}
