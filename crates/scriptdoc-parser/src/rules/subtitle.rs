//! Subtitle directives.

use std::sync::LazyLock;

use regex::Regex;

use crate::context::ParserContext;
use crate::kind::RuleKind;
use crate::rule::LineRule;

static SUBTITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"Subtitle\(text\s*=\s*"([^"]+)""#).unwrap());

/// `Subtitle(text="…")` renders its payload as narration.
#[derive(Debug, Default)]
pub struct SubtitleRule;

impl LineRule for SubtitleRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Subtitle
    }

    fn can_parse(&self, line: &str, _ctx: &ParserContext) -> bool {
        SUBTITLE_RE.is_match(line)
    }

    fn parse(&mut self, line: &str, ctx: &mut ParserContext) -> bool {
        let Some(caps) = SUBTITLE_RE.captures(line) else {
            return false;
        };
        ctx.document.add_narration(&caps[1]);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptdoc_render::Block;

    #[test]
    fn test_subtitle_renders_as_narration() {
        let mut ctx = ParserContext::new();
        let line = r#"[Subtitle(text="Three days later", x=300)]"#;
        assert!(SubtitleRule.can_parse(line, &ctx));
        assert!(SubtitleRule.parse(line, &mut ctx));
        assert_eq!(
            ctx.document.blocks(),
            &[Block::Narration("Three days later".to_owned())]
        );
    }

    #[test]
    fn test_case_sensitive() {
        let ctx = ParserContext::new();
        assert!(!SubtitleRule.can_parse(r#"[subtitle(text="x")]"#, &ctx));
    }
}
