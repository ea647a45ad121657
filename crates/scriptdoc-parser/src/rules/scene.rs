//! Scene title tags.

use std::sync::LazyLock;

use regex::Regex;

use crate::context::ParserContext;
use crate::kind::RuleKind;
use crate::rule::LineRule;

static SCENE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<p=1>([^<\n]+)<p=2>([^<\n]+)").unwrap());

/// `<p=1>title<p=2>time` emits a scene title followed by a timestamp.
#[derive(Debug, Default)]
pub struct SceneRule;

impl LineRule for SceneRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Scene
    }

    fn can_parse(&self, line: &str, _ctx: &ParserContext) -> bool {
        SCENE_RE.is_match(line)
    }

    fn parse(&mut self, line: &str, ctx: &mut ParserContext) -> bool {
        let Some(caps) = SCENE_RE.captures(line) else {
            return false;
        };
        ctx.document.add_scene_title(caps[1].trim());
        ctx.document.add_timestamp(caps[2].trim());
        true
    }
}
