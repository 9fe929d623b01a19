//! Collected diagnostics for a single file's pipeline.
//!
//! Every stage of the pipeline (pre-processor, parser, encoder) reports
//! failures as [`Diagnostic`]s rather than bailing out on the first one, so
//! that a file that has five bad lines gets five error messages instead of
//! one.

use colored::Colorize;
use std::fmt;

/// Which pipeline stage raised a diagnostic. Used only for ordering/grouping;
/// the rendered message looks the same regardless of stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Preprocessor,
    Parser,
    Encoder,
}

/// A single reported problem, tied to a source line in the file that is
/// relevant at the point of reporting (the `.as` file for pre-processor
/// diagnostics, the `.am` file for parser/encoder diagnostics).
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub stage: Stage,
    pub file: String,
    pub line: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn new(stage: Stage, file: impl Into<String>, line: usize, message: impl Into<String>) -> Diagnostic {
        Diagnostic {
            stage,
            file: file.into(),
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} at line {}: {}",
            "Error:".red().bold(),
            self.file,
            self.line,
            self.message
        )
    }
}

/// Accumulates diagnostics for one stage of one file's pipeline.
///
/// Stages never stop at the first error; they keep processing so every
/// problem in the file is reported, then the caller checks [`Diagnostics::is_empty`]
/// to decide whether to advance to the next stage.
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Diagnostics {
        Diagnostics::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn report(&mut self, stage: Stage, file: impl Into<String>, line: usize, message: impl Into<String>) {
        self.push(Diagnostic::new(stage, file, line, message));
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_with_filename_and_line() {
        let d = Diagnostic::new(Stage::Parser, "prog.am", 7, "unknown mnemonic \"mov2\"");
        let rendered = format!("{}", d);
        assert!(rendered.contains("prog.am"));
        assert!(rendered.contains("line 7"));
        assert!(rendered.contains("unknown mnemonic"));
    }

    #[test]
    fn accumulates_across_stage() {
        let mut diags = Diagnostics::new();
        diags.report(Stage::Preprocessor, "a.as", 1, "line too long");
        diags.report(Stage::Preprocessor, "a.as", 9, "duplicate macro name");
        assert_eq!(diags.len(), 2);
        assert!(!diags.is_empty());
    }
}
