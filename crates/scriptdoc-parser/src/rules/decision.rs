//! Decision directives.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::context::ParserContext;
use crate::kind::RuleKind;
use crate::rule::LineRule;
use crate::state::StateKey;

static DECISION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)Decision\(options\s*=\s*"([^"]+)".*?values\s*=\s*"([^"]+)""#).unwrap()
});

/// State of the most recent decision. Read by the predicate rule.
pub const DECISION_STATE: StateKey<DecisionState> = StateKey::new("decision");

/// Options of the active decision, keyed by their value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecisionState {
    /// Option text by option value.
    pub options_by_value: HashMap<String, String>,
    /// References of the last predicate seen under this decision.
    pub current_predicate: Option<String>,
}

/// `Decision(options="A;B", values="1;2")` records the option map. Emits nothing.
#[derive(Debug, Default)]
pub struct DecisionRule;

impl LineRule for DecisionRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Decision
    }

    fn can_parse(&self, line: &str, _ctx: &ParserContext) -> bool {
        DECISION_RE.is_match(line)
    }

    fn parse(&mut self, line: &str, ctx: &mut ParserContext) -> bool {
        let Some(caps) = DECISION_RE.captures(line) else {
            return false;
        };
        // Mismatched lengths: zip stops at the shorter list.
        let options_by_value = caps[2]
            .split(';')
            .zip(caps[1].split(';'))
            .map(|(value, option)| (value.trim().to_owned(), option.trim().to_owned()))
            .collect();

        ctx.state.insert(
            DECISION_STATE,
            DecisionState {
                options_by_value,
                current_predicate: None,
            },
        );
        true
    }

    fn initialize(&mut self, ctx: &mut ParserContext) {
        ctx.state.insert(DECISION_STATE, DecisionState::default());
    }
}
