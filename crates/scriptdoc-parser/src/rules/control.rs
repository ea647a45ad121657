//! Separators and structural tags.

use crate::context::ParserContext;
use crate::kind::RuleKind;
use crate::rule::LineRule;

const STRUCTURAL_TAGS: [&str; 3] = ["[dialog]", "[charslot]", "[background]"];

/// Claims separator lines and structural tags so they are not reported as
/// unrecognized. Never produces output.
#[derive(Debug, Default)]
pub struct ControlRule;

impl LineRule for ControlRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Control
    }

    fn can_parse(&self, line: &str, _ctx: &ParserContext) -> bool {
        if line == "#" {
            return true;
        }
        let lower = line.to_lowercase();
        STRUCTURAL_TAGS.iter().any(|tag| lower.starts_with(tag))
    }

    fn parse(&mut self, _line: &str, _ctx: &mut ParserContext) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognizes_control_lines() {
        let ctx = ParserContext::new();
        let rule = ControlRule;
        assert!(rule.can_parse("#", &ctx));
        assert!(rule.can_parse("[Dialog]", &ctx));
        assert!(rule.can_parse("[charslot]", &ctx));
        assert!(rule.can_parse("[BACKGROUND]", &ctx));
        assert!(!rule.can_parse("[charslot(slot=\"m\", name=\"amiya\")]", &ctx));
        assert!(!rule.can_parse("##", &ctx));
        assert!(!rule.can_parse("[name=\"A\"]hi", &ctx));
    }

    #[test]
    fn test_parse_reports_unhandled() {
        let mut ctx = ParserContext::new();
        assert!(!ControlRule.parse("#", &mut ctx));
        assert!(ctx.document.is_empty());
    }
}
