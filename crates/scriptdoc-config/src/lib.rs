//! Configuration management for scriptdoc.
//!
//! Parses `scriptdoc.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories. JSON files are
//! accepted too when passed explicitly (the format is chosen by extension).
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! Every section is optional. Rule overrides are kept raw (all fields
//! optional) because the per-rule defaults live with the rules themselves;
//! consumers look them up with [`Config::rule`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Deserializer};

/// Names of the line rules that may appear under `[parsers.<name>]`.
pub const RULE_NAMES: [&str; 9] = [
    "control",
    "image",
    "decision",
    "predicate",
    "scene",
    "subtitle",
    "dialogue",
    "sound",
    "narration",
];

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "scriptdoc.toml";

/// Upper bound for `document.spacer_lines`.
const MAX_SPACER_LINES: usize = 20;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values (and non-empty lists)
/// override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override blank lines inserted before section titles.
    pub spacer_lines: Option<usize>,
    /// Override per-image fetch timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Rules to force-enable.
    pub enable_rules: Vec<String>,
    /// Rules to force-disable. Applied after `enable_rules`.
    pub disable_rules: Vec<String>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Document-level layout settings.
    pub document: DocumentConfig,
    /// Per-rule overrides keyed by lowercase rule name.
    #[serde(deserialize_with = "deserialize_parsers")]
    parsers: BTreeMap<String, RuleOverride>,
    /// Text formatting settings used by renderers.
    pub formatting: FormattingConfig,
    /// Image fetching settings.
    pub images: ImagesConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Page size of the rendered document.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    /// ISO A4, 210 x 297 mm.
    #[default]
    #[serde(alias = "A4")]
    A4,
    /// US Letter, 8.5 x 11 in.
    #[serde(alias = "Letter")]
    Letter,
}

impl PageSize {
    /// Page width and height in inches.
    #[must_use]
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            Self::A4 => (8.27, 11.69),
            Self::Letter => (8.5, 11.0),
        }
    }
}

/// Page margin preset.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarginSize {
    #[default]
    Narrow,
    Normal,
    Wide,
}

impl MarginSize {
    /// Margin on every side, in inches.
    #[must_use]
    pub fn inches(self) -> f32 {
        match self {
            Self::Narrow => 0.5,
            Self::Normal => 0.79,
            Self::Wide => 1.0,
        }
    }
}

/// Document layout configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Blank lines inserted before every section title except the first.
    pub spacer_lines: usize,
    /// Page size.
    pub page_size: PageSize,
    /// Margin preset.
    pub margin_size: MarginSize,
    /// Whether renderers should number pages.
    pub add_page_numbers: bool,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            spacer_lines: 2,
            page_size: PageSize::default(),
            margin_size: MarginSize::default(),
            add_page_numbers: true,
        }
    }
}

/// Overrides for a single line rule, as written under `[parsers.<name>]`.
///
/// Unset fields fall back to the rule's own defaults.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleOverride {
    /// Whether the rule takes part in dispatch.
    pub enabled: Option<bool>,
    /// Dispatch priority (lower is tried first).
    pub priority: Option<i32>,
    /// Suppress bare resource identifiers. Only read by the `sound` rule.
    pub skip_resource_ids: Option<bool>,
}

/// Text formatting configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FormattingConfig {
    /// Line spacing multiplier.
    pub line_spacing: f32,
    /// First-line indent of narration paragraphs, in inches.
    pub narration_indent: f32,
}

impl Default for FormattingConfig {
    fn default() -> Self {
        Self {
            line_spacing: 1.5,
            narration_indent: 0.28,
        }
    }
}

/// Image fetching configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Per-image HTTP timeout in seconds.
    pub timeout_secs: u64,
    /// Fetch images in parallel. Index assignment order is unaffected.
    pub parallel: bool,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            parallel: true,
        }
    }
}

impl ImagesConfig {
    /// Per-image timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// File extension is neither TOML nor JSON.
    #[error("Unsupported config file format: {0}")]
    UnsupportedFormat(String),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

/// Rule names are case-insensitive. Keys are stored lowercase.
fn deserialize_parsers<'de, D>(deserializer: D) -> Result<BTreeMap<String, RuleOverride>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, RuleOverride>::deserialize(deserializer)?;
    let mut parsers = BTreeMap::new();
    for (name, rule) in raw {
        let key = name.to_ascii_lowercase();
        if parsers.insert(key, rule).is_some() {
            return Err(serde::de::Error::custom(format!(
                "parser '{name}' is configured more than once"
            )));
        }
    }
    Ok(parsers)
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `scriptdoc.toml` in current directory and parents,
    /// falling back to defaults when none is found.
    ///
    /// CLI settings are applied after loading, and the result is validated.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the merged configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Parse configuration from a TOML string and validate it.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a JSON string and validate it.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Overrides configured for the named rule, if any.
    #[must_use]
    pub fn rule(&self, name: &str) -> Option<&RuleOverride> {
        self.parsers.get(&name.to_ascii_lowercase())
    }

    /// Whether the sound rule suppresses bare resource identifiers.
    #[must_use]
    pub fn skip_resource_ids(&self) -> bool {
        self.rule("sound")
            .and_then(|rule| rule.skip_resource_ids)
            .unwrap_or(true)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(spacer_lines) = settings.spacer_lines {
            self.document.spacer_lines = spacer_lines;
        }
        if let Some(timeout_secs) = settings.timeout_secs {
            self.images.timeout_secs = timeout_secs;
        }
        for name in &settings.enable_rules {
            self.parsers.entry(name.to_ascii_lowercase()).or_default().enabled = Some(true);
        }
        for name in &settings.disable_rules {
            self.parsers.entry(name.to_ascii_lowercase()).or_default().enabled = Some(false);
        }
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_document()?;
        self.validate_parsers()?;
        self.validate_formatting()?;

        if self.images.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "images.timeout_secs must be greater than 0".to_owned(),
            ));
        }

        Ok(())
    }

    fn validate_document(&self) -> Result<(), ConfigError> {
        if self.document.spacer_lines > MAX_SPACER_LINES {
            return Err(ConfigError::Validation(format!(
                "document.spacer_lines cannot exceed {MAX_SPACER_LINES}"
            )));
        }
        Ok(())
    }

    fn validate_parsers(&self) -> Result<(), ConfigError> {
        for (name, rule) in &self.parsers {
            if !RULE_NAMES.contains(&name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "unknown parser '{name}' (valid: {})",
                    RULE_NAMES.join(", ")
                )));
            }
            if rule.skip_resource_ids.is_some() && name != "sound" {
                return Err(ConfigError::Validation(format!(
                    "parsers.{name}.skip_resource_ids is only valid for the sound parser"
                )));
            }
        }
        Ok(())
    }

    fn validate_formatting(&self) -> Result<(), ConfigError> {
        if self.formatting.line_spacing <= 0.0 {
            return Err(ConfigError::Validation(
                "formatting.line_spacing must be greater than 0".to_owned(),
            ));
        }
        if self.formatting.narration_indent < 0.0 {
            return Err(ConfigError::Validation(
                "formatting.narration_indent cannot be negative".to_owned(),
            ));
        }
        Ok(())
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file, picking the format by extension.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let mut config = match extension.as_str() {
            "toml" => Self::from_toml_str(&content)?,
            "json" => Self::from_json_str(&content)?,
            other => return Err(ConfigError::UnsupportedFormat(format!(".{other}"))),
        };
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.document.spacer_lines, 2);
        assert_eq!(config.document.page_size, PageSize::A4);
        assert_eq!(config.document.margin_size, MarginSize::Narrow);
        assert!(config.document.add_page_numbers);
        assert_eq!(config.images.timeout(), Duration::from_secs(10));
        assert!(config.images.parallel);
        assert!(config.skip_resource_ids());
        assert!(config.rule("image").is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.document.spacer_lines, 2);
        assert!((config.formatting.line_spacing - 1.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_parse_document_config() {
        let toml = r#"
[document]
spacer_lines = 4
page_size = "letter"
margin_size = "wide"
add_page_numbers = false
"#;
        let config = Config::from_toml_str(toml).unwrap();
        assert_eq!(config.document.spacer_lines, 4);
        assert_eq!(config.document.page_size, PageSize::Letter);
        assert_eq!(config.document.margin_size, MarginSize::Wide);
        assert!(!config.document.add_page_numbers);
    }

    #[test]
    fn test_page_size_accepts_uppercase_alias() {
        let config = Config::from_toml_str("[document]\npage_size = \"A4\"\n").unwrap();
        assert_eq!(config.document.page_size, PageSize::A4);
    }

    #[test]
    fn test_parse_rule_overrides() {
        let toml = r"
[parsers.image]
enabled = false

[parsers.sound]
priority = 15
skip_resource_ids = false
";
        let config = Config::from_toml_str(toml).unwrap();
        assert_eq!(
            config.rule("image"),
            Some(&RuleOverride {
                enabled: Some(false),
                priority: None,
                skip_resource_ids: None,
            })
        );
        assert_eq!(config.rule("sound").unwrap().priority, Some(15));
        assert!(!config.skip_resource_ids());
    }

    #[test]
    fn test_unknown_rule_is_rejected() {
        let err = Config::from_toml_str("[parsers.footnote]\nenabled = true\n").unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        assert!(err.to_string().contains("footnote"));
    }

    #[test]
    fn test_rule_names_ignore_case() {
        let toml = "[parsers.Dialogue]\npriority = 50\n\n[parsers.SOUND]\nskip_resource_ids = false\n";
        let config = Config::from_toml_str(toml).unwrap();
        assert_eq!(config.rule("dialogue").unwrap().priority, Some(50));
        assert_eq!(config.rule("Dialogue").unwrap().priority, Some(50));
        assert!(!config.skip_resource_ids());
    }

    #[test]
    fn test_rule_configured_twice_in_different_case_is_rejected() {
        let err = Config::from_toml_str("[parsers.sound]\n\n[parsers.Sound]\n").unwrap_err();
        assert!(
            matches!(err, ConfigError::Parse(_)),
            "Expected ConfigError::Parse, got {err:?}"
        );
    }

    #[test]
    fn test_skip_resource_ids_only_for_sound() {
        let err =
            Config::from_toml_str("[parsers.image]\nskip_resource_ids = true\n").unwrap_err();
        assert!(err.to_string().contains("only valid for the sound parser"));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let err = Config::from_toml_str("[images]\ntimeout_secs = 0\n").unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_spacer_lines_upper_bound() {
        let err = Config::from_toml_str("[document]\nspacer_lines = 99\n").unwrap_err();
        assert!(err.to_string().contains("spacer_lines"));
    }

    #[test]
    fn test_negative_line_spacing_is_rejected() {
        let err = Config::from_toml_str("[formatting]\nline_spacing = -1.0\n").unwrap_err();
        assert!(err.to_string().contains("line_spacing"));
    }

    #[test]
    fn test_parse_json_config() {
        let json = r#"{"document": {"spacer_lines": 1}, "parsers": {"narration": {"priority": 70}}}"#;
        let config = Config::from_json_str(json).unwrap();
        assert_eq!(config.document.spacer_lines, 1);
        assert_eq!(config.rule("narration").unwrap().priority, Some(70));
    }

    #[test]
    fn test_load_explicit_path_not_found() {
        let err = Config::load(Some(Path::new("/nonexistent/scriptdoc.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"images": {"parallel": false}}"#).unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert!(!config.images.parallel);
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        std::fs::write(&path, "document: {}").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(ref ext) if ext == ".yaml"));
    }

    #[test]
    fn test_apply_cli_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scriptdoc.toml");
        std::fs::write(&path, "[parsers.sound]\nenabled = false\n").unwrap();

        let settings = CliSettings {
            spacer_lines: Some(0),
            timeout_secs: Some(3),
            enable_rules: vec!["sound".to_owned()],
            disable_rules: vec!["narration".to_owned()],
        };
        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        assert_eq!(config.document.spacer_lines, 0);
        assert_eq!(config.images.timeout_secs, 3);
        assert_eq!(config.rule("sound").unwrap().enabled, Some(true));
        assert_eq!(config.rule("narration").unwrap().enabled, Some(false));
    }

    #[test]
    fn test_cli_settings_with_unknown_rule_fail_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scriptdoc.toml");
        std::fs::write(&path, "").unwrap();

        let settings = CliSettings {
            disable_rules: vec!["bogus".to_owned()],
            ..Default::default()
        };
        let err = Config::load(Some(&path), Some(&settings)).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_margin_and_page_geometry() {
        assert!((MarginSize::Normal.inches() - 0.79).abs() < f32::EPSILON);
        assert_eq!(PageSize::Letter.dimensions(), (8.5, 11.0));
    }
}
