//! Error handling for citeorder
//!
//! This module provides the error type shared by every stage of the pass,
//! the non-fatal warnings collected along the way, and the output type that
//! carries both the rewritten document and its warnings.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::core::renumber::CitationMapping;

/// Render an optional line as ` at line L`
fn at_line(line: &Option<usize>) -> String {
    line.map(|l| format!(" at line {}", l)).unwrap_or_default()
}

/// Errors that abort the pass before any output is written
#[derive(Debug, Error)]
pub enum RenumberError {
    /// Input path does not exist or is unreadable
    #[error("cannot read input file '{}': {source}", .path.display())]
    InputNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Table environment missing, unbalanced or inconsistent
    #[error("malformed table{}: {message}", at_line(.line))]
    MalformedTable {
        message: String,
        line: Option<usize>,
    },

    /// A requested citation column does not exist in a row
    #[error(
        "column index {column} is out of range at line {line}: the row has {columns} column(s)"
    )]
    ColumnIndexOutOfRange {
        column: usize,
        columns: usize,
        line: usize,
    },

    /// A designated cell does not follow the citation marker grammar
    #[error("unrecognized citation syntax at line {line}, column {column}: {message} in '{cell}'")]
    UnrecognizedCitationSyntax {
        message: String,
        cell: String,
        line: usize,
        column: usize,
    },

    /// Two different citations would render to the same text
    #[error("ambiguous identifier '{identifier}'{}: {message}", at_line(.line))]
    AmbiguousIdentifier {
        identifier: String,
        message: String,
        line: Option<usize>,
    },

    /// Filesystem error while writing the output file
    #[error("cannot write output file '{}': {source}", .path.display())]
    OutputWriteFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for renumbering operations
pub type RenumberResult<T> = Result<T, RenumberError>;

// Convenience constructors for errors
impl RenumberError {
    pub fn malformed(message: impl Into<String>) -> Self {
        RenumberError::MalformedTable {
            message: message.into(),
            line: None,
        }
    }

    pub fn malformed_at(message: impl Into<String>, line: usize) -> Self {
        RenumberError::MalformedTable {
            message: message.into(),
            line: Some(line),
        }
    }

    pub fn ambiguous(
        identifier: impl Into<String>,
        message: impl Into<String>,
        line: Option<usize>,
    ) -> Self {
        RenumberError::AmbiguousIdentifier {
            identifier: identifier.into(),
            message: message.into(),
            line,
        }
    }

    /// Line (1-indexed) the error points at, if any
    pub fn line(&self) -> Option<usize> {
        match self {
            RenumberError::MalformedTable { line, .. }
            | RenumberError::AmbiguousIdentifier { line, .. } => *line,
            RenumberError::ColumnIndexOutOfRange { line, .. }
            | RenumberError::UnrecognizedCitationSyntax { line, .. } => Some(*line),
            RenumberError::InputNotFound { .. } | RenumberError::OutputWriteFailure { .. } => None,
        }
    }

    /// Column (1-indexed) the error points at, if any
    pub fn column(&self) -> Option<usize> {
        match self {
            RenumberError::UnrecognizedCitationSyntax { column, .. } => Some(*column),
            _ => None,
        }
    }

    /// Short name of the error kind
    pub fn kind_name(&self) -> &'static str {
        match self {
            RenumberError::InputNotFound { .. } => "InputNotFound",
            RenumberError::MalformedTable { .. } => "MalformedTable",
            RenumberError::ColumnIndexOutOfRange { .. } => "ColumnIndexOutOfRange",
            RenumberError::UnrecognizedCitationSyntax { .. } => "UnrecognizedCitationSyntax",
            RenumberError::AmbiguousIdentifier { .. } => "AmbiguousIdentifier",
            RenumberError::OutputWriteFailure { .. } => "OutputWriteFailure",
        }
    }
}

/// Kind of a non-fatal issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// A cited identifier has no reference definition
    MissingReference,
    /// A reference definition was never cited and was removed
    OrphanDropped,
    /// A reference definition was never cited and was kept as is
    OrphanKept,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningKind::MissingReference => write!(f, "missing-reference"),
            WarningKind::OrphanDropped => write!(f, "orphan-dropped"),
            WarningKind::OrphanKept => write!(f, "orphan-kept"),
        }
    }
}

/// Renumbering warning (non-fatal issue)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenumberWarning {
    pub kind: WarningKind,
    /// Identifier the warning is about
    pub identifier: String,
    pub message: String,
    pub line: Option<usize>,
}

impl RenumberWarning {
    pub fn new(
        kind: WarningKind,
        identifier: impl Into<String>,
        message: impl Into<String>,
        line: Option<usize>,
    ) -> Self {
        Self {
            kind,
            identifier: identifier.into(),
            message: message.into(),
            line,
        }
    }
}

impl fmt::Display for RenumberWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(l) = self.line {
            write!(f, "Warning at line {}: {}", l, self.message)
        } else {
            write!(f, "Warning: {}", self.message)
        }
    }
}

/// Renumbered document with its mapping and warnings
#[derive(Debug, Clone)]
pub struct RenumberOutput {
    /// The rewritten document
    pub content: String,
    /// Original identifier to new ordinal
    pub mapping: CitationMapping,
    /// Any warnings generated during the pass
    pub warnings: Vec<RenumberWarning>,
}

impl RenumberOutput {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
