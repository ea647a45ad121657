//! Quoted narration lines.

use std::sync::LazyLock;

use regex::Regex;

use crate::context::ParserContext;
use crate::kind::RuleKind;
use crate::rule::LineRule;

static QUOTED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"^["“].+["”]$"#).unwrap());

/// A line wrapped in quotation marks, rendered verbatim as narration.
#[derive(Debug, Default)]
pub struct NarrationRule;

impl LineRule for NarrationRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Narration
    }

    fn can_parse(&self, line: &str, _ctx: &ParserContext) -> bool {
        QUOTED_RE.is_match(line)
    }

    fn parse(&mut self, line: &str, ctx: &mut ParserContext) -> bool {
        ctx.document.add_narration(line);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptdoc_render::Block;

    #[test]
    fn test_quoted_lines() {
        let ctx = ParserContext::new();
        assert!(NarrationRule.can_parse("\"The wind howls.\"", &ctx));
        assert!(NarrationRule.can_parse("“风声呼啸。”", &ctx));
        assert!(!NarrationRule.can_parse("\"", &ctx));
        assert!(!NarrationRule.can_parse("\"unterminated", &ctx));
        assert!(!NarrationRule.can_parse("plain text", &ctx));
    }

    #[test]
    fn test_keeps_quotes() {
        let mut ctx = ParserContext::new();
        assert!(NarrationRule.parse("\"Quiet.\"", &mut ctx));
        assert_eq!(
            ctx.document.blocks(),
            &[Block::Narration("\"Quiet.\"".to_owned())]
        );
    }
}
