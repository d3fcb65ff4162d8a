//! Writer
//!
//! Applies the rewrite plan to the original text and writes the result next
//! to the input as `<input>_new`. The input file is never touched; a failed
//! write leaves no output file behind.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::core::document::Document;
use crate::core::renumber::{Edit, Renumbering};
use crate::core::scanner::TableRegion;
use crate::data::constants::OUTPUT_SUFFIX;
use crate::features::references::{render_new_block, ReferenceList};
use crate::utils::error::{RenumberError, RenumberResult};

/// Apply non-overlapping edits to `text`
pub fn apply_edits(text: &str, edits: &[Edit]) -> String {
    let mut sorted: Vec<&Edit> = edits.iter().collect();
    sorted.sort_by_key(|e| (e.span.start, e.span.end));

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for edit in sorted {
        debug_assert!(edit.span.start >= cursor, "overlapping edits");
        out.push_str(&text[cursor..edit.span.start]);
        out.push_str(&edit.replacement);
        cursor = edit.span.end;
    }
    out.push_str(&text[cursor..]);
    out
}

/// Edit that puts the renumbered reference list in place
///
/// An existing block has its content replaced; otherwise a new
/// `\tablerefs{...}` line is inserted after the `\enddata` line, but only
/// when there is something to list.
fn reference_edit(
    doc: &Document,
    region: &TableRegion,
    list: Option<&ReferenceList>,
    renumbering: &Renumbering,
) -> Option<Edit> {
    if let Some(list) = list {
        return Some(Edit::new(list.body, list.render_body(&renumbering.references)));
    }
    if renumbering.references.is_empty() {
        return None;
    }

    let at = doc.line_end_after(region.end_data.end);
    let mut block = render_new_block(&renumbering.references);
    if !doc.text()[..at].ends_with('\n') {
        block.insert(0, '\n');
    }
    Some(Edit::insert(at, block))
}

/// Produce the rewritten document text
pub fn render_document(
    doc: &Document,
    region: &TableRegion,
    list: Option<&ReferenceList>,
    renumbering: &Renumbering,
) -> String {
    let mut edits = renumbering.edits.clone();
    edits.extend(reference_edit(doc, region, list, renumbering));
    apply_edits(doc.text(), &edits)
}

/// `<input file name>_new`, in the same directory as the input
pub fn output_path(input: &Path) -> PathBuf {
    let mut name = OsString::from(input.as_os_str());
    name.push(OUTPUT_SUFFIX);
    PathBuf::from(name)
}

/// Write `content` to `path`, removing the file again on failure
pub fn write_output(path: &Path, content: &str) -> RenumberResult<()> {
    let result = (|| {
        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(content.as_bytes())?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()
    })();

    result.map_err(|source| {
        if path.exists() {
            if let Err(e) = fs::remove_file(path) {
                log::warn!("could not remove partial output {}: {}", path.display(), e);
            }
        }
        RenumberError::OutputWriteFailure {
            path: path.to_path_buf(),
            source,
        }
    })
}
