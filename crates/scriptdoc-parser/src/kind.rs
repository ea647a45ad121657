//! Directive families.

use std::fmt;
use std::str::FromStr;

/// One directive family. Each kind has exactly one rule in a registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleKind {
    /// Separators and structural tags that produce nothing.
    Control,
    Image,
    Decision,
    Predicate,
    Scene,
    Subtitle,
    Dialogue,
    /// Audio directives and angle-bracketed stage directions.
    Sound,
    /// Fully quoted lines.
    Narration,
}

impl RuleKind {
    /// Every kind, in default priority order.
    pub const ALL: [RuleKind; 9] = [
        RuleKind::Control,
        RuleKind::Image,
        RuleKind::Decision,
        RuleKind::Predicate,
        RuleKind::Scene,
        RuleKind::Subtitle,
        RuleKind::Dialogue,
        RuleKind::Sound,
        RuleKind::Narration,
    ];

    /// Configuration name of this kind.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            RuleKind::Control => "control",
            RuleKind::Image => "image",
            RuleKind::Decision => "decision",
            RuleKind::Predicate => "predicate",
            RuleKind::Scene => "scene",
            RuleKind::Subtitle => "subtitle",
            RuleKind::Dialogue => "dialogue",
            RuleKind::Sound => "sound",
            RuleKind::Narration => "narration",
        }
    }

    /// Parse a configuration name. Case-insensitive.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }

    /// Priority used when none is configured. Lower fires first.
    #[must_use]
    pub fn default_priority(self) -> i32 {
        match self {
            RuleKind::Control => 5,
            RuleKind::Image => 10,
            RuleKind::Decision => 20,
            RuleKind::Predicate => 21,
            RuleKind::Scene => 30,
            RuleKind::Subtitle => 35,
            RuleKind::Dialogue => 40,
            RuleKind::Sound => 45,
            RuleKind::Narration => 60,
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a rule name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rule '{0}'")]
pub struct UnknownRule(pub String);

impl FromStr for RuleKind {
    type Err = UnknownRule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownRule(s.to_owned()))
    }
}
