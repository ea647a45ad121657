//! Dialogue lines.

use std::sync::LazyLock;

use regex::Regex;

use crate::context::ParserContext;
use crate::kind::RuleKind;
use crate::rule::LineRule;

/// Well-formed `[name="X"]text`, anchored at line start.
static NAMED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\[name="([^"]+)"\](.*)"#).unwrap());

/// Malformed `name="X"]text`, missing the opening bracket.
static BARE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"name\s*=\s*"([^"]+)"\]\s*(.*)"#).unwrap());

/// Split a dialogue line into speaker and utterance.
///
/// The well-formed shape wins when both match.
fn split_dialogue(line: &str) -> Option<(&str, &str)> {
    NAMED_RE
        .captures(line)
        .or_else(|| BARE_NAME_RE.captures(line))
        .map(|caps| {
            let speaker = caps.get(1).map_or("", |m| m.as_str());
            let text = caps.get(2).map_or("", |m| m.as_str());
            (speaker.trim(), text.trim())
        })
}

/// Speaker lines, rendered as bold `speaker:` followed by the utterance.
#[derive(Debug, Default)]
pub struct DialogueRule;

impl LineRule for DialogueRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Dialogue
    }

    fn can_parse(&self, line: &str, _ctx: &ParserContext) -> bool {
        NAMED_RE.is_match(line) || BARE_NAME_RE.is_match(line)
    }

    fn parse(&mut self, line: &str, ctx: &mut ParserContext) -> bool {
        let Some((speaker, text)) = split_dialogue(line) else {
            return false;
        };
        ctx.document.add_dialogue(speaker, text);
        true
    }
}
