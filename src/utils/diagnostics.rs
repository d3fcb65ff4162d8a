//! Table diagnostics
//!
//! Runs the renumbering pass without writing anything and turns its error
//! and warnings into displayable diagnostics, the way `--check` reports
//! them:
//!
//! ```text
//! warning: citation 'Smith' (now 1) has no reference entry
//!   --> line 5
//!   |
//!   | A & B & [Smith] \\
//! ```
//!
//! ## Example
//!
//! ```rust
//! use citeorder::diagnostics::check_table;
//! use citeorder::RenumberOptions;
//!
//! let result = check_table(r"\begin{deluxetable}{ll}", &RenumberOptions::default());
//! assert!(result.has_errors());
//! ```

use std::fmt;

use crate::core::options::RenumberOptions;
use crate::core::renumber::CitationMapping;
use crate::utils::error::{RenumberError, RenumberWarning, WarningKind};

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticLevel {
    /// Informational note
    Info,
    /// Warning - output is written but may need attention
    Warning,
    /// Error - no output is written
    Error,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticLevel::Info => write!(f, "info"),
            DiagnosticLevel::Warning => write!(f, "warning"),
            DiagnosticLevel::Error => write!(f, "error"),
        }
    }
}

/// A single diagnostic message
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Severity level
    pub level: DiagnosticLevel,
    /// Error or warning kind name
    pub kind: String,
    /// Human-readable message
    pub message: String,
    /// Line number (1-indexed)
    pub line: Option<usize>,
    /// Column number (1-indexed)
    pub column: Option<usize>,
    /// Relevant source line
    pub source_text: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(level: DiagnosticLevel, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            kind: kind.into(),
            message: message.into(),
            line: None,
            column: None,
            source_text: None,
        }
    }

    /// Add location information
    pub fn with_location(mut self, line: Option<usize>, column: Option<usize>) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    /// Attach the source line the diagnostic points at
    pub fn with_source_from(mut self, source: &str) -> Self {
        if let Some(line) = self.line {
            self.source_text = line
                .checked_sub(1)
                .and_then(|i| source.lines().nth(i))
                .map(|l| l.trim_end().to_string());
        }
        self
    }

    /// ANSI color for the level
    pub fn color_code(&self) -> &'static str {
        match self.level {
            DiagnosticLevel::Error => "\x1b[31m",   // Red
            DiagnosticLevel::Warning => "\x1b[33m", // Yellow
            DiagnosticLevel::Info => "\x1b[34m",    // Blue
        }
    }
}

impl From<&RenumberWarning> for Diagnostic {
    fn from(warning: &RenumberWarning) -> Self {
        let level = match warning.kind {
            WarningKind::MissingReference | WarningKind::OrphanDropped => DiagnosticLevel::Warning,
            WarningKind::OrphanKept => DiagnosticLevel::Info,
        };
        Diagnostic::new(level, warning.kind.to_string(), warning.message.clone())
            .with_location(warning.line, None)
    }
}

impl From<&RenumberError> for Diagnostic {
    fn from(error: &RenumberError) -> Self {
        Diagnostic::new(DiagnosticLevel::Error, error.kind_name(), error.to_string())
            .with_location(error.line(), error.column())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: level: message
        //         --> line:column
        //         |
        //         | source text

        write!(f, "{}: {}", self.level, self.message)?;

        match (self.line, self.column) {
            (Some(line), Some(col)) => write!(f, "\n  --> line {}:{}", line, col)?,
            (Some(line), None) => write!(f, "\n  --> line {}", line)?,
            _ => {}
        }

        if let Some(ref source) = self.source_text {
            write!(f, "\n  |\n  | {}", source)?;
        }

        Ok(())
    }
}

/// Check result with summary
#[derive(Debug, Default)]
pub struct CheckResult {
    /// All diagnostics
    pub diagnostics: Vec<Diagnostic>,
    /// Number of errors
    pub errors: usize,
    /// Number of warnings
    pub warnings: usize,
    /// Number of info messages
    pub infos: usize,
    /// Number of distinct citations, when the pass succeeded
    pub citations: Option<usize>,
    /// Identifier to ordinal mapping, when the pass succeeded
    pub mapping: Option<CitationMapping>,
}

impl CheckResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic
    pub fn add(&mut self, diag: Diagnostic) {
        match diag.level {
            DiagnosticLevel::Error => self.errors += 1,
            DiagnosticLevel::Warning => self.warnings += 1,
            DiagnosticLevel::Info => self.infos += 1,
        }
        self.diagnostics.push(diag);
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    /// Check if there are any issues at all
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Get summary string
    pub fn summary(&self) -> String {
        let plural = |n: usize| if n == 1 { "" } else { "s" };
        let mut parts = Vec::new();
        if let Some(n) = self.citations {
            parts.push(format!("{} citation{}", n, plural(n)));
        }
        if self.errors > 0 {
            parts.push(format!("{} error{}", self.errors, plural(self.errors)));
        }
        if self.warnings > 0 {
            parts.push(format!("{} warning{}", self.warnings, plural(self.warnings)));
        }
        if self.infos > 0 {
            parts.push(format!("{} note{}", self.infos, plural(self.infos)));
        }
        if self.errors + self.warnings + self.infos == 0 {
            parts.push("no issues found".to_string());
        }
        parts.join(", ")
    }
}

/// Run the renumbering pass on `source` and collect its diagnostics
pub fn check_table(source: &str, options: &RenumberOptions) -> CheckResult {
    let mut result = CheckResult::new();
    match crate::renumber_source(source, options) {
        Ok(output) => {
            result.citations = Some(output.mapping.len());
            for warning in &output.warnings {
                result.add(Diagnostic::from(warning).with_source_from(source));
            }
            result.mapping = Some(output.mapping);
        }
        Err(err) => result.add(Diagnostic::from(&err).with_source_from(source)),
    }
    result
}

/// Format diagnostics for terminal output
pub fn format_diagnostics(result: &CheckResult, use_color: bool) -> String {
    let mut output = String::new();

    for diag in &result.diagnostics {
        if use_color {
            output.push_str(diag.color_code());
            output.push_str(&format!("{}", diag));
            output.push_str("\x1b[0m\n\n");
        } else {
            output.push_str(&format!("{}\n\n", diag));
        }
    }

    // Summary
    if use_color {
        if result.has_errors() {
            output.push_str("\x1b[31m");
        } else if result.warnings > 0 {
            output.push_str("\x1b[33m");
        } else {
            output.push_str("\x1b[32m");
        }
    }

    output.push_str(&format!("Summary: {}", result.summary()));

    if use_color {
        output.push_str("\x1b[0m");
    }

    output
}
