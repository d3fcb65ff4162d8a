//! Core renumbering modules
//!
//! This module contains the stages of a renumbering pass:
//! - `document`: source text with byte spans and line lookup
//! - `options`: column selection and orphan policy
//! - `scanner`: table location, row/cell splitting, marker extraction
//! - `renumber`: ordinal assignment and reference list rebuild
//! - `writer`: rewrite application and output file handling

pub mod document;
pub mod options;
pub mod renumber;
pub mod scanner;
pub mod writer;

pub use document::{Document, Position, Span};
pub use options::{ColumnSelection, OrphanPolicy, RenumberOptions};
pub use renumber::{renumber, CitationMapping, CitationOrigin, Edit, MappedCitation, Renumbering};
pub use scanner::{scan_table, CitationMarker, Scan, TableRegion};
pub use writer::{apply_edits, output_path, render_document, write_output};
