//! `scriptdoc convert` command implementation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use clap::Args;
use scriptdoc_config::{CliSettings, Config};
use scriptdoc_parser::{DocumentAssembler, Section, Story};

use crate::error::CliError;
use crate::output::{Console, DocumentSummary};

/// Arguments for the convert command.
#[derive(Args)]
pub(crate) struct ConvertArgs {
    /// Script text files. Each becomes a section titled by its file stem.
    inputs: Vec<PathBuf>,

    /// Output file (`.html`, `.htm` or `.txt`).
    #[arg(short, long)]
    output: PathBuf,

    /// Path to configuration file (default: auto-discover scriptdoc.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Document title, shown once at the top.
    #[arg(long)]
    main_title: Option<String>,

    /// JSON object mapping image ids to URLs.
    #[arg(long)]
    image_map: Option<PathBuf>,

    /// JSON array of stories (`name`, `intro`, `origin_content`, `image_map`).
    #[arg(long)]
    stories: Option<PathBuf>,

    /// Blank lines before every section title but the first (overrides config).
    #[arg(long)]
    spacer_lines: Option<usize>,

    /// Image fetch timeout in seconds (overrides config).
    #[arg(long)]
    timeout: Option<u64>,

    /// Enable a rule by name (repeatable).
    #[arg(long = "enable", value_name = "RULE")]
    enable: Vec<String>,

    /// Disable a rule by name (repeatable).
    #[arg(long = "disable", value_name = "RULE")]
    disable: Vec<String>,

    /// Prefix prepended to every section title, e.g. a speaker name.
    #[arg(long)]
    title_prefix: Option<String>,

    /// Enable verbose output and write skipped lines next to the output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl ConvertArgs {
    /// Execute the convert command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, input or output fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let console = Console::new();

        if self.inputs.is_empty() && self.stories.is_none() {
            return Err(CliError::Validation(
                "nothing to convert: pass input files or --stories".to_owned(),
            ));
        }

        let cli_settings = CliSettings {
            spacer_lines: self.spacer_lines,
            timeout_secs: self.timeout,
            enable_rules: self.enable.clone(),
            disable_rules: self.disable.clone(),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "Loaded configuration");
        }

        let mut assembler = DocumentAssembler::from_config(&config);
        if let Some(title) = &self.main_title {
            assembler.add_main_title(title);
        }
        if let Some(path) = &self.image_map {
            assembler.set_image_map(read_image_map(path)?);
        }

        for input in &self.inputs {
            console.parsing_file(input);
            let text = std::fs::read_to_string(input)?;
            let mut section = Section::titled(section_title(input));
            section.speaker_prefix.clone_from(&self.title_prefix);
            assembler.parse_text(&text, section);
        }

        if let Some(path) = &self.stories {
            let stories = Story::list_from_file(path)?;
            console.parsing_stories(stories.len(), path);
            for story in &stories {
                assembler.parse_story(story, self.title_prefix.as_deref());
            }
        }

        let skipped = assembler.save(&self.output)?;
        console.generated(&self.output, DocumentSummary::of(assembler.document()));

        if self.verbose {
            let report = skipped_report_path(&self.output);
            write_skipped(&report, &skipped)?;
            console.skipped(skipped.len(), Some(&report));
        } else {
            console.skipped(skipped.len(), None);
        }

        Ok(())
    }
}

fn read_image_map(path: &Path) -> Result<HashMap<String, String>, CliError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn section_title(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `<output>.skipped.txt`, next to the output file.
fn skipped_report_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_owned();
    name.push(".skipped.txt");
    PathBuf::from(name)
}

fn write_skipped(path: &Path, skipped: &[String]) -> Result<(), CliError> {
    let mut content = String::new();
    for line in skipped {
        content.push_str(line);
        content.push('\n');
    }
    std::fs::write(path, content)?;
    Ok(())
}
