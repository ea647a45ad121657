//! Console reporting for conversions.
//!
//! Progress and diagnostics go to stderr. Command results (speaker lists)
//! go to stdout so they can be redirected.

use std::fmt::Display;
use std::io::{self, Write};
use std::path::Path;

use console::{Style, Term};
use scriptdoc_render::{Block, Document, Resource};

/// Counts shown after a document is written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct DocumentSummary {
    pub(crate) sections: usize,
    pub(crate) images: usize,
    pub(crate) failed_images: usize,
}

impl DocumentSummary {
    pub(crate) fn of(document: &Document) -> Self {
        let mut summary = Self::default();
        for block in document.blocks() {
            match block {
                Block::Title(_) => summary.sections += 1,
                Block::Resource {
                    resource: Resource::Image { .. },
                    ..
                } => summary.images += 1,
                Block::Resource {
                    resource: Resource::Error { .. },
                    ..
                } => summary.failed_images += 1,
                _ => {}
            }
        }
        summary
    }
}

impl Display for DocumentSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} sections, {} images", self.sections, self.images)?;
        if self.failed_images > 0 {
            write!(f, ", {} failed", self.failed_images)?;
        }
        Ok(())
    }
}

fn skipped_message(count: usize, report: Option<&Path>) -> String {
    match (count, report) {
        (0, _) => "No lines skipped".to_owned(),
        (n, Some(path)) => format!("{n} lines skipped, listed in {}", path.display()),
        (n, None) => format!("{n} lines skipped (use --verbose to list them)"),
    }
}

/// One speaker per line.
fn write_speakers(out: &mut impl Write, names: &[String]) -> io::Result<()> {
    for name in names {
        writeln!(out, "{name}")?;
    }
    out.flush()
}

/// Styled console for the `scriptdoc` commands.
pub(crate) struct Console {
    out: Term,
    err: Term,
    dim: Style,
    green: Style,
    yellow: Style,
    red: Style,
    heading: Style,
}

impl Console {
    pub(crate) fn new() -> Self {
        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            dim: Style::new().dim(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            heading: Style::new().cyan().bold(),
        }
    }

    fn status(&self, style: &Style, msg: &str) {
        let _ = self.err.write_line(&style.apply_to(msg).to_string());
    }

    pub(crate) fn parsing_file(&self, path: &Path) {
        self.status(&self.dim, &format!("Parsing {}", path.display()));
    }

    pub(crate) fn parsing_stories(&self, count: usize, path: &Path) {
        self.status(
            &self.dim,
            &format!("Parsing {count} stories from {}", path.display()),
        );
    }

    /// Output written, with what ended up in it.
    pub(crate) fn generated(&self, path: &Path, summary: DocumentSummary) {
        self.status(
            &self.green,
            &format!("Generated {} ({summary})", path.display()),
        );
        if summary.failed_images > 0 {
            self.status(
                &self.yellow,
                &format!("{} images failed to load", summary.failed_images),
            );
        }
    }

    /// Skipped-line count, pointing at the report file when one was written.
    pub(crate) fn skipped(&self, count: usize, report: Option<&Path>) {
        let style = if count > 0 && report.is_some() {
            &self.yellow
        } else {
            &self.dim
        };
        self.status(style, &skipped_message(count, report));
    }

    pub(crate) fn failure(&self, err: &dyn Display) {
        self.status(&self.red, &format!("Error: {err}"));
    }

    /// Speaker list of one script: heading on stderr, one name per line on stdout.
    pub(crate) fn speakers(&self, path: &Path, names: &[String]) {
        self.status(
            &self.heading,
            &format!("{} ({} speakers)", path.display(), names.len()),
        );
        let mut out = &self.out;
        let _ = write_speakers(&mut out, names);
    }
}
