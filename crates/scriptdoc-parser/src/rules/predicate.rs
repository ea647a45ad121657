//! Predicate (branch) directives.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::decision::DECISION_STATE;
use crate::context::ParserContext;
use crate::kind::RuleKind;
use crate::rule::LineRule;

static PREDICATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)Predicate\(references\s*=\s*"([^"]+)""#).unwrap());

/// Label shown for a branch referencing `references` under `options`.
///
/// One reference names its option, a reference per option is a merge, and
/// anything else lists the referenced options.
#[must_use]
pub fn branch_label(references: &str, options: &HashMap<String, String>) -> String {
    let refs: Vec<&str> = references.split(';').map(str::trim).collect();

    if let [single] = refs.as_slice() {
        format!("[→ {}]", option_text(options, single))
    } else if refs.len() == options.len() {
        "[→ merge]".to_owned()
    } else {
        let texts: Vec<String> = refs.iter().map(|r| option_text(options, r)).collect();
        format!("[→ {}]", texts.join(" & "))
    }
}

fn option_text(options: &HashMap<String, String>, value: &str) -> String {
    options
        .get(value)
        .cloned()
        .unwrap_or_else(|| format!("option {value}"))
}

/// `Predicate(references="1;2")` renders a branch label for the active
/// decision. Without an active decision the line is consumed silently.
#[derive(Debug, Default)]
pub struct PredicateRule;

impl LineRule for PredicateRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Predicate
    }

    fn can_parse(&self, line: &str, _ctx: &ParserContext) -> bool {
        PREDICATE_RE.is_match(line)
    }

    fn parse(&mut self, line: &str, ctx: &mut ParserContext) -> bool {
        let Some(caps) = PREDICATE_RE.captures(line) else {
            return false;
        };
        let references = caps[1].trim();

        let decision = ctx.state.get_or_default(DECISION_STATE);
        if !decision.options_by_value.is_empty() {
            ctx.document
                .add_branch_label(branch_label(references, &decision.options_by_value));
        }
        decision.current_predicate = Some(references.to_owned());
        true
    }
}
