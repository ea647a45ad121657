//! scriptdoc CLI - game-script transcript converter.
//!
//! Provides commands for:
//! - `convert`: Convert script texts and stories into a document
//! - `speakers`: List the speakers appearing in script texts

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ConvertArgs, SpeakersArgs};
use output::Console;

/// scriptdoc - game-script transcript converter.
#[derive(Parser)]
#[command(name = "scriptdoc", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert script texts into an HTML or plain text document.
    Convert(ConvertArgs),
    /// List distinct speakers in order of first appearance.
    Speakers(SpeakersArgs),
}

fn main() {
    let cli = Cli::parse();
    let console = Console::new();

    let verbose = matches!(&cli.command, Commands::Convert(args) if args.verbose);

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Convert(args) => args.execute(),
        Commands::Speakers(args) => args.execute(),
    };

    if let Err(err) = result {
        console.failure(&err);
        std::process::exit(1);
    }
}
