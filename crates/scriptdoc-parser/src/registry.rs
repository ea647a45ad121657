//! Priority-ordered rule registry.
//!
//! The registry owns the rules and the [`ParserContext`] of one session and
//! drives the per-line dispatch loop and the initialize/finalize lifecycle.

use crate::context::ParserContext;
use crate::kind::RuleKind;
use crate::rule::LineRule;

/// Result of dispatching one line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineOutcome {
    /// A rule claimed the line and produced output or state changes.
    Handled(RuleKind),
    /// A rule claimed the line but reported it as intentionally invisible.
    Suppressed(RuleKind),
    /// No enabled rule claimed the line.
    Unrecognized,
    /// The line was blank after trimming.
    Empty,
}

impl LineOutcome {
    /// Whether the claiming rule reported the line as handled.
    #[must_use]
    pub fn is_handled(self) -> bool {
        matches!(self, LineOutcome::Handled(_))
    }
}

struct RegisteredRule {
    rule: Box<dyn LineRule>,
    priority: i32,
    enabled: bool,
}

/// Ordered collection of line rules plus their shared context.
#[derive(Default)]
pub struct ParserRegistry {
    rules: Vec<RegisteredRule>,
    context: ParserContext,
    initialized: bool,
}

impl ParserRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule at its kind's default priority.
    pub fn register<R: LineRule + 'static>(&mut self, rule: R) {
        let priority = rule.kind().default_priority();
        self.register_with_priority(rule, priority);
    }

    /// Register a rule at an explicit priority.
    ///
    /// A rule of an already registered kind replaces the earlier one. Rules
    /// sharing a priority keep registration order.
    pub fn register_with_priority<R: LineRule + 'static>(&mut self, rule: R, priority: i32) {
        let kind = rule.kind();
        if let Some(pos) = self.position(kind) {
            tracing::debug!(rule = %kind, "Replacing registered rule");
            self.rules.remove(pos);
        }
        tracing::debug!(rule = %kind, priority, "Registering rule");
        self.rules.push(RegisteredRule {
            rule: Box::new(rule),
            priority,
            enabled: true,
        });
        self.rules.sort_by_key(|entry| entry.priority);
    }

    /// Remove the rule of `kind`. Returns `false` if none was registered.
    pub fn unregister(&mut self, kind: RuleKind) -> bool {
        match self.position(kind) {
            Some(pos) => {
                self.rules.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Include the rule of `kind` in dispatch. Returns `false` if not registered.
    pub fn enable(&mut self, kind: RuleKind) -> bool {
        self.set_enabled(kind, true)
    }

    /// Exclude the rule of `kind` from dispatch without dropping its state.
    pub fn disable(&mut self, kind: RuleKind) -> bool {
        self.set_enabled(kind, false)
    }

    fn set_enabled(&mut self, kind: RuleKind, enabled: bool) -> bool {
        match self.rules.iter_mut().find(|entry| entry.rule.kind() == kind) {
            Some(entry) => {
                entry.enabled = enabled;
                true
            }
            None => false,
        }
    }

    fn position(&self, kind: RuleKind) -> Option<usize> {
        self.rules.iter().position(|entry| entry.rule.kind() == kind)
    }

    /// Whether the rule of `kind` is registered and enabled.
    #[must_use]
    pub fn is_enabled(&self, kind: RuleKind) -> bool {
        self.rules
            .iter()
            .any(|entry| entry.enabled && entry.rule.kind() == kind)
    }

    /// Registered kinds in dispatch order, with their priorities.
    #[must_use]
    pub fn kinds(&self) -> Vec<(RuleKind, i32)> {
        self.rules
            .iter()
            .map(|entry| (entry.rule.kind(), entry.priority))
            .collect()
    }

    #[must_use]
    pub fn context(&self) -> &ParserContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut ParserContext {
        &mut self.context
    }

    /// Whether [`initialize_all`](Self::initialize_all) has run this session.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Initialize every enabled rule in priority order.
    ///
    /// Runs once per session. Later calls are no-ops so rule state survives
    /// across several texts.
    pub fn initialize_all(&mut self) {
        if self.initialized {
            return;
        }
        for entry in self.rules.iter_mut().filter(|entry| entry.enabled) {
            entry.rule.initialize(&mut self.context);
        }
        self.initialized = true;
    }

    /// Finalize every enabled rule in priority order.
    pub fn finalize_all(&mut self) {
        for entry in self.rules.iter_mut().filter(|entry| entry.enabled) {
            entry.rule.finalize(&mut self.context);
        }
    }

    /// Dispatch one line to the first enabled rule that claims it.
    ///
    /// The line is trimmed first. Once a rule claims the line no other rule
    /// is consulted, whatever `parse` returns.
    pub fn dispatch(&mut self, line: &str) -> LineOutcome {
        let line = line.trim();
        if line.is_empty() {
            return LineOutcome::Empty;
        }

        let context = &mut self.context;
        let Some(entry) = self
            .rules
            .iter_mut()
            .find(|entry| entry.enabled && entry.rule.can_parse(line, context))
        else {
            return LineOutcome::Unrecognized;
        };

        let kind = entry.rule.kind();
        tracing::trace!(rule = %kind, line, "Dispatching line");
        if entry.rule.parse(line, context) {
            LineOutcome::Handled(kind)
        } else {
            LineOutcome::Suppressed(kind)
        }
    }

    /// Dispatch one line and report whether it was handled.
    pub fn parse_line(&mut self, line: &str) -> bool {
        self.dispatch(line).is_handled()
    }

    /// Start a new session: clear context and rerun initialization on next use.
    pub fn reset(&mut self) {
        self.context.reset();
        self.initialized = false;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use pretty_assertions::assert_eq;

    /// Records every call it receives into a shared log.
    struct Probe {
        kind: RuleKind,
        prefix: &'static str,
        handled: bool,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Probe {
        fn new(kind: RuleKind, prefix: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                kind,
                prefix,
                handled: true,
                log: Arc::clone(log),
            }
        }

        fn record(&self, event: String) {
            self.log.lock().unwrap().push(event);
        }
    }

    impl LineRule for Probe {
        fn kind(&self) -> RuleKind {
            self.kind
        }

        fn can_parse(&self, line: &str, _ctx: &ParserContext) -> bool {
            self.record(format!("can_parse:{}", self.kind));
            line.starts_with(self.prefix)
        }

        fn parse(&mut self, _line: &str, _ctx: &mut ParserContext) -> bool {
            self.record(format!("parse:{}", self.kind));
            self.handled
        }

        fn initialize(&mut self, _ctx: &mut ParserContext) {
            self.record(format!("init:{}", self.kind));
        }

        fn finalize(&mut self, _ctx: &mut ParserContext) {
            self.record(format!("finalize:{}", self.kind));
        }
    }

    fn new_log() -> Arc<Mutex<Vec<String>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    fn take(log: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
        std::mem::take(&mut *log.lock().unwrap())
    }

    #[test]
    fn test_priority_order_ignores_registration_order() {
        let log = new_log();
        let mut registry = ParserRegistry::new();
        registry.register(Probe::new(RuleKind::Narration, "x", &log));
        registry.register(Probe::new(RuleKind::Control, "x", &log));
        registry.register(Probe::new(RuleKind::Dialogue, "x", &log));

        assert_eq!(
            registry.dispatch("xyz"),
            LineOutcome::Handled(RuleKind::Control)
        );
        assert_eq!(take(&log), vec!["can_parse:control", "parse:control"]);
    }

    #[test]
    fn test_equal_priorities_keep_registration_order() {
        let log = new_log();
        let mut registry = ParserRegistry::new();
        registry.register_with_priority(Probe::new(RuleKind::Sound, "a", &log), 10);
        registry.register_with_priority(Probe::new(RuleKind::Image, "a", &log), 10);

        assert_eq!(
            registry.kinds(),
            vec![(RuleKind::Sound, 10), (RuleKind::Image, 10)]
        );
        assert_eq!(registry.dispatch("a"), LineOutcome::Handled(RuleKind::Sound));
    }

    #[test]
    fn test_claimed_line_is_not_passed_on() {
        let log = new_log();
        let mut registry = ParserRegistry::new();
        let mut control = Probe::new(RuleKind::Control, "#", &log);
        control.handled = false;
        registry.register(control);
        registry.register(Probe::new(RuleKind::Narration, "#", &log));

        assert_eq!(
            registry.dispatch("#"),
            LineOutcome::Suppressed(RuleKind::Control)
        );
        assert!(!registry.parse_line("#"));
        assert!(!take(&log).iter().any(|e| e.ends_with("narration")));
    }

    #[test]
    fn test_empty_lines_reach_no_rule() {
        let log = new_log();
        let mut registry = ParserRegistry::new();
        registry.register(Probe::new(RuleKind::Narration, "", &log));

        assert_eq!(registry.dispatch("   \t"), LineOutcome::Empty);
        assert!(take(&log).is_empty());
    }

    #[test]
    fn test_lines_are_trimmed_before_dispatch() {
        let log = new_log();
        let mut registry = ParserRegistry::new();
        registry.register(Probe::new(RuleKind::Dialogue, "[name", &log));

        assert!(registry.parse_line("   [name=\"A\"]hi  "));
    }

    #[test]
    fn test_disabled_rule_is_never_probed() {
        let log = new_log();
        let mut registry = ParserRegistry::new();
        registry.register(Probe::new(RuleKind::Control, "z", &log));
        registry.register(Probe::new(RuleKind::Narration, "z", &log));
        assert!(registry.disable(RuleKind::Control));

        assert_eq!(registry.dispatch("z"), LineOutcome::Handled(RuleKind::Narration));
        assert_eq!(take(&log), vec!["can_parse:narration", "parse:narration"]);

        assert!(registry.enable(RuleKind::Control));
        assert_eq!(registry.dispatch("z"), LineOutcome::Handled(RuleKind::Control));
        assert!(!registry.enable(RuleKind::Image));
    }

    #[test]
    fn test_unrecognized_line() {
        let log = new_log();
        let mut registry = ParserRegistry::new();
        registry.register(Probe::new(RuleKind::Control, "#", &log));

        assert_eq!(registry.dispatch("@@@garbage@@@"), LineOutcome::Unrecognized);
    }

    #[test]
    fn test_lifecycle_skips_disabled_and_runs_once() {
        let log = new_log();
        let mut registry = ParserRegistry::new();
        registry.register(Probe::new(RuleKind::Sound, "s", &log));
        registry.register(Probe::new(RuleKind::Image, "i", &log));
        registry.register(Probe::new(RuleKind::Scene, "c", &log));
        registry.disable(RuleKind::Scene);

        registry.initialize_all();
        registry.initialize_all();
        registry.finalize_all();

        assert_eq!(
            take(&log),
            vec!["init:image", "init:sound", "finalize:image", "finalize:sound"]
        );

        registry.reset();
        assert!(!registry.is_initialized());
        registry.initialize_all();
        assert_eq!(take(&log), vec!["init:image", "init:sound"]);
    }

    #[test]
    fn test_register_same_kind_replaces() {
        let log = new_log();
        let mut registry = ParserRegistry::new();
        registry.register(Probe::new(RuleKind::Dialogue, "a", &log));
        registry.register_with_priority(Probe::new(RuleKind::Dialogue, "b", &log), 1);

        assert_eq!(registry.kinds(), vec![(RuleKind::Dialogue, 1)]);
        assert_eq!(registry.dispatch("a"), LineOutcome::Unrecognized);
        assert!(registry.parse_line("b"));
        assert!(registry.unregister(RuleKind::Dialogue));
        assert!(!registry.unregister(RuleKind::Dialogue));
    }
}
