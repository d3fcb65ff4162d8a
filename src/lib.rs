//! # citeorder
//!
//! Renumbers the citations of an AASTeX `deluxetable` by order of first
//! appearance.
//!
//! ## Features
//!
//! - **First-appearance order**: the Nth distinct citation in the designated
//!   columns becomes `N`, everywhere it occurs
//! - **Marker syntaxes**: bare lists, `[..]` brackets, `$^{..}$` superscripts
//!   and `\cite`-family commands
//! - **Reference list**: `\tablerefs{...}` or `\tablenotetext{}{...}` is
//!   reordered to match, uncited entries dropped or kept
//! - **Non-destructive**: the result goes to `<input>_new`
//!
//! ## Usage Examples
//!
//! ### In-memory
//!
//! ```rust
//! use citeorder::{renumber_source, RenumberOptions};
//!
//! let table = r"\begin{deluxetable}{lll}
//! \startdata
//! A & B & [Smith] \\
//! C & D & [Jones] \\
//! E & F & [Smith]
//! \enddata
//! \tablerefs{(Jones) Jones 2003; (Smith) Smith 2001}
//! \end{deluxetable}
//! ";
//!
//! let output = renumber_source(table, &RenumberOptions::default()).unwrap();
//! assert!(output.content.contains(r"A & B & [1] \\"));
//! assert!(output.content.contains(r"\tablerefs{(1) Smith 2001; (2) Jones 2003}"));
//! assert_eq!(output.mapping.ordinal("Jones"), Some(2));
//! ```
//!
//! ### On a file
//!
//! ```rust,no_run
//! use citeorder::{order_refs, RenumberOptions};
//!
//! let report = order_refs("table.tex", &RenumberOptions::with_columns([2])).unwrap();
//! println!("wrote {}", report.output_path.display());
//! ```

use std::fs;
use std::path::{Path, PathBuf};

/// Core renumbering modules
pub mod core;

/// Data layer - fixed tokens of the table format
pub mod data;

/// Feature modules - cell and reference-list grammars
pub mod features;

/// Utility modules
pub mod utils;

use crate::core::document::Document;
use crate::core::renumber::renumber;
use crate::core::scanner::scan_table;
use crate::core::writer::{output_path, render_document, write_output};
use crate::features::references::find_reference_list;

// Re-export core types
pub use crate::core::options::{ColumnSelection, OrphanPolicy, RenumberOptions};
pub use crate::core::renumber::{CitationMapping, CitationOrigin, MappedCitation};

// Re-export data modules
pub use crate::data::constants;

// Re-export feature modules
pub use crate::features::citations;
pub use crate::features::references;

// Re-export utilities
pub use crate::utils::diagnostics;
pub use crate::utils::error::{
    RenumberError, RenumberOutput, RenumberResult, RenumberWarning, WarningKind,
};

/// Outcome of a successful [`order_refs`] run
#[derive(Debug, Clone)]
pub struct RenumberReport {
    /// Path of the file that was written
    pub output_path: PathBuf,
    /// Original identifier to new ordinal
    pub mapping: CitationMapping,
    pub warnings: Vec<RenumberWarning>,
}

/// Renumber the citations of the deluxetable in `source`
///
/// Pure: nothing is read or written. All errors are detected here, so a
/// caller that writes the returned content never writes a partial result.
pub fn renumber_source(source: &str, options: &RenumberOptions) -> RenumberResult<RenumberOutput> {
    let doc = Document::new(source);
    let scan = scan_table(&doc, &options.columns)?;
    let list = find_reference_list(&doc, scan.region.end_data.end)?;
    let renumbering = renumber(&scan, list.as_ref(), options)?;

    let content = render_document(&doc, &scan.region, list.as_ref(), &renumbering);
    Ok(RenumberOutput {
        content,
        mapping: renumbering.mapping,
        warnings: renumbering.warnings,
    })
}

/// Renumber the table in the file at `path` and write `<path>_new`
///
/// The input file is left untouched. An error found before writing leaves
/// the filesystem as it was, including a `<path>_new` from an earlier run;
/// a failed write removes the partial file.
pub fn order_refs(path: impl AsRef<Path>, options: &RenumberOptions) -> RenumberResult<RenumberReport> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| RenumberError::InputNotFound {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("read {} ({} bytes)", path.display(), source.len());

    let output = renumber_source(&source, options)?;
    let target = output_path(path);
    write_output(&target, &output.content)?;
    log::info!(
        "wrote {} with {} citation(s)",
        target.display(),
        output.mapping.len()
    );

    Ok(RenumberReport {
        output_path: target,
        mapping: output.mapping,
        warnings: output.warnings,
    })
}
