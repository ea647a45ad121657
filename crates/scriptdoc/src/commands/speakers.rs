//! `scriptdoc speakers` command implementation.

use std::path::PathBuf;

use clap::Args;
use scriptdoc_parser::extract_speakers;

use crate::error::CliError;
use crate::output::Console;

/// Arguments for the speakers command.
#[derive(Args)]
pub(crate) struct SpeakersArgs {
    /// Script text files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

impl SpeakersArgs {
    /// Execute the speakers command.
    ///
    /// # Errors
    ///
    /// Returns an error if an input cannot be read.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let console = Console::new();

        for input in &self.inputs {
            let text = std::fs::read_to_string(input)?;
            console.speakers(input, &extract_speakers(&text));
        }

        Ok(())
    }
}
