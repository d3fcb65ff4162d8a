//! Fixed tokens of the deluxetable format
//!
//! Everything the scanner, the marker parser and the reference-list parser
//! need to recognize lives here:
//! - Environment names and body delimiters
//! - Row/cell separators
//! - Citation commands (natbib family)
//! - Placeholder cells and structural row directives

use lazy_static::lazy_static;
use std::collections::HashSet;

// ============================================================================
// Table Structure
// ============================================================================

/// Environments recognized as a deluxetable
pub const TABLE_ENVIRONMENTS: &[&str] = &["deluxetable", "deluxetable*", "planotable"];

/// Start of the table body
pub const START_DATA: &str = r"\startdata";

/// End of the table body
pub const END_DATA: &str = r"\enddata";

/// Row terminator token
pub const ROW_TERMINATOR: &str = r"\\";

/// Cell separator token
pub const CELL_SEPARATOR: char = '&';

/// Rules and sub-headings that may precede a row's first cell
pub const ROW_RULES: &[&str] = &[
    "hline",
    "tableline",
    "cline",
    "noalign",
    "tablebreak",
    "cutinhead",
    "sidehead",
];

/// Suffix appended to the input file name to form the output path
pub const OUTPUT_SUFFIX: &str = "_new";

// ============================================================================
// Reference Lists
// ============================================================================

/// `\tablerefs{...}` reference block
pub const TABLEREFS: &str = r"\tablerefs";

/// `\tablenotetext{}{...}` reference block (emulateapj style)
pub const TABLENOTETEXT: &str = r"\tablenotetext";

/// Separator used between reference entries when the source gives none
pub const DEFAULT_REFERENCE_SEPARATOR: &str = "; ";

/// Separator used between ordinals produced from a cite command
pub const ORDINAL_SEPARATOR: &str = ", ";

lazy_static! {
    /// Citation commands whose argument is a list of citation keys
    pub static ref CITE_COMMANDS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert("cite");
        s.insert("citet");
        s.insert("citep");
        s.insert("citealt");
        s.insert("citealp");
        s.insert("citeauthor");
        s.insert("citeyear");
        s.insert("citetalias");
        s.insert("citepalias");
        s
    };

    /// Commands that put their argument list in superscript
    pub static ref SUPERSCRIPT_COMMANDS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert("textsuperscript");
        s.insert("tablenotemark");
        s
    };

    /// Cell contents meaning "no citation in this row"
    pub static ref NO_DATA_CELLS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert(r"\nodata");
        s.insert(r"\nodata{}");
        s.insert(r"\ldots");
        s.insert(r"\dots");
        s.insert(r"$\cdots$");
        s.insert("...");
        s.insert("--");
        s.insert("---");
        s
    };
}

/// Check whether a character may appear in a citation identifier
pub fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, ':' | '.' | '_' | '-' | '+' | '/')
}
