//! Sound directives and stage directions.

use std::sync::LazyLock;

use regex::Regex;

use crate::context::ParserContext;
use crate::kind::RuleKind;
use crate::rule::LineRule;

static KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"key\s*=\s*"?([^",\)\]]+)"?"#).unwrap());

static COMMAND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[?\s*([A-Za-z_][A-Za-z0-9_]*)").unwrap());

static RESOURCE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$?[A-Za-z0-9_\-/\$]+$").unwrap());

const AUDIO_COMMANDS: [&str; 4] = ["playsound", "playmusic", "stopsound", "stopmusic"];

/// Directives recognized as sound-adjacent but never rendered.
const SKIPPED_COMMANDS: [&str; 20] = [
    "stopsound",
    "stopmusic",
    "soundvolume",
    "blocker",
    "delay",
    "background",
    "image",
    "imagetween",
    "curtain",
    "camerashake",
    "cameraeffect",
    "focusout",
    "bgeffect",
    "charslot",
    "dialog",
    "subtitle",
    "animtextclean",
    "animtext",
    "playsound",
    "playmusic",
];

/// Whether sound text should become a visible cue.
///
/// Non-ASCII text is descriptive and always shown. Bare resource
/// identifiers such as `$bgm_003` are hidden when `skip_resource_ids` is set.
#[must_use]
pub fn is_visible_cue(text: &str, skip_resource_ids: bool) -> bool {
    if !text.is_ascii() {
        return true;
    }
    !(skip_resource_ids && RESOURCE_ID_RE.is_match(text))
}

/// Bracketed audio directives (`PlaySound`, `PlayMusic`, `StopSound`,
/// `StopMusic`) and `<stage directions>`.
#[derive(Debug)]
pub struct SoundRule {
    skip_resource_ids: bool,
}

impl Default for SoundRule {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundRule {
    #[must_use]
    pub fn new() -> Self {
        Self {
            skip_resource_ids: true,
        }
    }

    /// Render bare resource identifiers instead of hiding them.
    #[must_use]
    pub fn with_skip_resource_ids(mut self, skip: bool) -> Self {
        self.skip_resource_ids = skip;
        self
    }

    fn emit(&self, text: &str, ctx: &mut ParserContext) {
        if is_visible_cue(text, self.skip_resource_ids) {
            ctx.document.add_sound_cue(text);
        } else {
            tracing::trace!(text, "Hiding resource identifier");
        }
    }
}

impl LineRule for SoundRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Sound
    }

    fn can_parse(&self, line: &str, _ctx: &ParserContext) -> bool {
        if line.starts_with('[') {
            let lower = line.to_lowercase();
            return AUDIO_COMMANDS.iter().any(|cmd| lower.contains(cmd));
        }
        line.starts_with('<') && line.ends_with('>')
    }

    fn parse(&mut self, line: &str, ctx: &mut ParserContext) -> bool {
        if line.starts_with('<') && line.ends_with('>') {
            self.emit(line.trim_matches(['<', '>']), ctx);
            return true;
        }

        if let Some(key) = KEY_RE.captures(line).and_then(|caps| caps.get(1)) {
            self.emit(key.as_str(), ctx);
            return true;
        }

        let command = COMMAND_RE
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_lowercase());
        if command.is_some_and(|cmd| SKIPPED_COMMANDS.contains(&cmd.as_str())) {
            return true;
        }

        self.emit(line.trim_matches(['[', ']']), ctx);
        true
    }
}
