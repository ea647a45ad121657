//! Line rule trait.

use crate::context::ParserContext;
use crate::kind::RuleKind;

/// Recognizer for one directive family.
///
/// The registry calls [`can_parse`](Self::can_parse) on enabled rules in
/// priority order; the first rule that claims a line receives
/// [`parse`](Self::parse) and no other rule sees that line.
///
/// # Example
///
/// ```
/// use scriptdoc_parser::{LineRule, ParserContext, ParserRegistry, RuleKind};
///
/// struct Shout;
///
/// impl LineRule for Shout {
///     fn kind(&self) -> RuleKind { RuleKind::Narration }
///     fn can_parse(&self, line: &str, _ctx: &ParserContext) -> bool {
///         line.ends_with('!')
///     }
///     fn parse(&mut self, line: &str, ctx: &mut ParserContext) -> bool {
///         ctx.document.add_narration(line.to_uppercase());
///         true
///     }
/// }
///
/// let mut registry = ParserRegistry::new();
/// registry.register(Shout);
/// assert!(registry.parse_line("hey!"));
/// assert!(!registry.parse_line("hey"));
/// ```
pub trait LineRule: Send {
    /// Directive family this rule recognizes.
    fn kind(&self) -> RuleKind;

    /// Whether this rule claims `line` (already trimmed).
    fn can_parse(&self, line: &str, ctx: &ParserContext) -> bool;

    /// Handle a claimed line.
    ///
    /// Returning `false` means the line was recognized but intentionally
    /// produced nothing.
    fn parse(&mut self, line: &str, ctx: &mut ParserContext) -> bool;

    /// Set up state before the first line of a session.
    fn initialize(&mut self, _ctx: &mut ParserContext) {}

    /// Flush deferred work after the last line of a session.
    fn finalize(&mut self, _ctx: &mut ParserContext) {}
}
