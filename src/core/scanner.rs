//! Table Scanner
//!
//! Locates the single deluxetable environment, splits its body into rows
//! and cells, and collects the citation markers of the designated columns
//! in scan order (top-to-bottom, left-to-right).

use crate::core::document::{Document, Span};
use crate::core::options::ColumnSelection;
use crate::data::constants::{END_DATA, ROW_RULES, START_DATA, TABLE_ENVIRONMENTS};
use crate::features::citations::{parse_cell, MarkerSyntax};
use crate::utils::error::{RenumberError, RenumberResult};
use crate::utils::tex::{braced_arg, control_words, normalized_content, split_top_level, Separator};

/// Boundaries of the table environment
#[derive(Debug, Clone)]
pub struct TableRegion {
    /// Environment name (`deluxetable`, `deluxetable*`, ...)
    pub environment: String,
    /// `\begin{...}` through `\end{...}`
    pub span: Span,
    /// Text between `\startdata` and `\enddata`
    pub body: Span,
    /// The `\enddata` token
    pub end_data: Span,
    /// Data rows of the body
    pub rows: Vec<Row>,
}

/// A data row
#[derive(Debug, Clone)]
pub struct Row {
    /// 0-based index among data rows
    pub index: usize,
    /// 1-indexed line where the row starts
    pub line: usize,
    pub span: Span,
    pub cells: Vec<Span>,
}

impl Row {
    pub fn width(&self) -> usize {
        self.cells.len()
    }
}

/// A citation identifier found in a designated cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationMarker {
    /// Identifier as written
    pub id: String,
    /// Identifier text in the document
    pub span: Span,
    pub row: usize,
    pub column: usize,
    pub line: usize,
}

/// Markers sharing one surface syntax
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationGroup {
    pub syntax: MarkerSyntax,
    /// Whole group including delimiters
    pub span: Span,
    pub markers: Vec<CitationMarker>,
    /// Superscript token written without braces (`$^a$`)
    pub unbraced: bool,
}

/// Scanner output
#[derive(Debug, Clone)]
pub struct Scan {
    pub region: TableRegion,
    /// Designated columns, ascending
    pub columns: Vec<usize>,
    /// Marker groups in scan order
    pub groups: Vec<CitationGroup>,
}

impl Scan {
    /// All markers in scan order
    pub fn markers(&self) -> impl Iterator<Item = &CitationMarker> + '_ {
        self.groups.iter().flat_map(|g| g.markers.iter())
    }
}

struct EnvMarker {
    offset: usize,
    environment: String,
    after: usize,
}

/// Find the deluxetable environment and split its body into rows
pub fn locate_table(doc: &Document) -> RenumberResult<TableRegion> {
    let text = doc.text();
    let mut begins: Vec<EnvMarker> = Vec::new();
    let mut ends: Vec<EnvMarker> = Vec::new();
    let mut start_data = Vec::new();
    let mut end_data = Vec::new();

    for (offset, name) in control_words(text) {
        match name {
            "begin" | "end" => {
                let Some((arg, after)) = braced_arg(text, offset + name.len() + 1) else {
                    continue;
                };
                let environment = doc.slice(arg).trim();
                if !TABLE_ENVIRONMENTS.contains(&environment) {
                    continue;
                }
                let marker = EnvMarker {
                    offset,
                    environment: environment.to_string(),
                    after,
                };
                if name == "begin" {
                    begins.push(marker);
                } else {
                    ends.push(marker);
                }
            }
            "startdata" => start_data.push(offset),
            "enddata" => end_data.push(offset),
            _ => {}
        }
    }

    let begin = match begins.as_slice() {
        [] => return Err(RenumberError::malformed("no deluxetable environment found")),
        [only] => only,
        [_, second, ..] => {
            return Err(RenumberError::malformed_at(
                format!(
                    "found {} deluxetable environments; exactly one is supported",
                    begins.len()
                ),
                doc.line_of(second.offset),
            ))
        }
    };
    let begin_line = doc.line_of(begin.offset);

    let end = match ends.as_slice() {
        [] => {
            return Err(RenumberError::malformed_at(
                format!("\\begin{{{}}} is never closed", begin.environment),
                begin_line,
            ))
        }
        [only] if only.offset > begin.offset => only,
        [only] if only.offset < begin.offset => {
            return Err(RenumberError::malformed_at(
                format!("\\end{{{}}} appears before \\begin", only.environment),
                doc.line_of(only.offset),
            ))
        }
        [_, second, ..] | [second] => {
            return Err(RenumberError::malformed_at(
                "unbalanced table environment markers",
                doc.line_of(second.offset),
            ))
        }
    };
    if end.environment != begin.environment {
        return Err(RenumberError::malformed_at(
            format!(
                "\\begin{{{}}} is closed by \\end{{{}}}",
                begin.environment, end.environment
            ),
            doc.line_of(end.offset),
        ));
    }

    let inside = |offset: &usize| *offset > begin.after && *offset < end.offset;
    let start_data: Vec<usize> = start_data.into_iter().filter(inside).collect();
    let end_data: Vec<usize> = end_data.into_iter().filter(inside).collect();

    let body_start = match start_data.as_slice() {
        [only] => *only,
        [] => {
            return Err(RenumberError::malformed_at(
                format!("missing {} inside the table", START_DATA),
                begin_line,
            ))
        }
        [_, second, ..] => {
            return Err(RenumberError::malformed_at(
                format!("duplicate {}", START_DATA),
                doc.line_of(*second),
            ))
        }
    };
    let body_end = match end_data.as_slice() {
        [only] if *only > body_start => *only,
        [only] => {
            return Err(RenumberError::malformed_at(
                format!("{} appears before {}", END_DATA, START_DATA),
                doc.line_of(*only),
            ))
        }
        [] => {
            return Err(RenumberError::malformed_at(
                format!("missing {} after {}", END_DATA, START_DATA),
                doc.line_of(body_start),
            ))
        }
        [_, second, ..] => {
            return Err(RenumberError::malformed_at(
                format!("duplicate {}", END_DATA),
                doc.line_of(*second),
            ))
        }
    };

    let body = Span::new(body_start + START_DATA.len(), body_end);
    let rows = split_rows(doc, body);
    if rows.is_empty() {
        return Err(RenumberError::malformed_at(
            "table body has no data rows",
            doc.line_of(body_start),
        ));
    }

    log::debug!(
        "found \\begin{{{}}} at line {} with {} data rows",
        begin.environment,
        begin_line,
        rows.len()
    );

    Ok(TableRegion {
        environment: begin.environment.clone(),
        span: Span::new(begin.offset, end.after),
        body,
        end_data: Span::new(body_end, body_end + END_DATA.len()),
        rows,
    })
}

/// Split the body into data rows, skipping blank rows and directives
fn split_rows(doc: &Document, body: Span) -> Vec<Row> {
    let body_text = doc.slice(body);
    let mut rows = Vec::new();

    for row_span in split_top_level(body_text, Separator::Row) {
        let span = row_span.offset(body.start);
        let row_text = doc.slice(span);
        let content = normalized_content(row_text);
        if content.is_empty() {
            continue;
        }

        let cells: Vec<Span> = split_top_level(row_text, Separator::Cell)
            .into_iter()
            .map(|cell| cell.offset(span.start))
            .collect();

        // \hline, \tableline, \cutinhead{...}, \sidehead{...}, ...
        if cells.len() == 1 && content.starts_with('\\') {
            log::debug!(
                "skipping directive row '{}' at line {}",
                content,
                doc.line_of(span.start)
            );
            continue;
        }

        rows.push(Row {
            index: rows.len(),
            line: doc.line_of(span.start + content_start(row_text)),
            span,
            cells,
        });
    }
    rows
}

/// Offset of the first cell content, past whitespace, comments and rules
///
/// `\hline` or `\cutinhead{...}` written between rows ends up at the start
/// of the following row; row lines are reported where the data starts.
fn content_start(row_text: &str) -> usize {
    let mut pos = 0;
    loop {
        let rest = &row_text[pos..];
        let trimmed = rest.trim_start();
        pos += rest.len() - trimmed.len();
        if trimmed.starts_with('%') {
            pos += trimmed.find('\n').unwrap_or(trimmed.len());
            continue;
        }
        let Some((0, word)) = control_words(trimmed).first().copied() else {
            return pos;
        };
        if !ROW_RULES.contains(&word) {
            return pos;
        }
        pos += word.len() + 1;
        while let Some((_, after)) = braced_arg(row_text, pos) {
            pos = after;
        }
    }
}

/// Check that every row has every designated column
fn check_columns(
    region: &TableRegion,
    selection: &ColumnSelection,
    columns: &[usize],
) -> RenumberResult<()> {
    let expected = region.rows[0].width();
    for row in &region.rows {
        for &column in columns {
            if column < row.width() {
                continue;
            }
            return Err(if selection.is_explicit() {
                RenumberError::ColumnIndexOutOfRange {
                    column,
                    columns: row.width(),
                    line: row.line,
                }
            } else {
                RenumberError::malformed_at(
                    format!(
                        "row has {} column(s) but the first row has {}",
                        row.width(),
                        expected
                    ),
                    row.line,
                )
            });
        }
        if !selection.is_explicit() && row.width() != expected {
            return Err(RenumberError::malformed_at(
                format!(
                    "row has {} column(s) but the first row has {}; the citation column is ambiguous",
                    row.width(),
                    expected
                ),
                row.line,
            ));
        }
    }
    Ok(())
}

/// Scan the document for citation markers in the designated columns
pub fn scan_table(doc: &Document, selection: &ColumnSelection) -> RenumberResult<Scan> {
    let region = locate_table(doc)?;
    let columns = selection.resolve(region.rows[0].width());
    check_columns(&region, selection, &columns)?;

    let mut groups = Vec::new();
    for row in &region.rows {
        for &column in &columns {
            let cell = row.cells[column];
            let cell_text = doc.slice(cell);
            let parsed = parse_cell(cell_text).map_err(|err| {
                let position = doc.position(cell.start + err.offset);
                RenumberError::UnrecognizedCitationSyntax {
                    message: err.message,
                    cell: cell_text.trim().to_string(),
                    line: position.line,
                    column: position.column,
                }
            })?;

            for group in parsed {
                let markers = group
                    .ids
                    .into_iter()
                    .map(|parsed_id| {
                        let span = parsed_id.span.offset(cell.start);
                        CitationMarker {
                            id: parsed_id.id,
                            span,
                            row: row.index,
                            column,
                            line: doc.line_of(span.start),
                        }
                    })
                    .collect();
                groups.push(CitationGroup {
                    syntax: group.syntax,
                    span: group.span.offset(cell.start),
                    markers,
                    unbraced: group.unbraced,
                });
            }
        }
    }

    log::debug!(
        "scanned {} rows in column(s) {:?}: {} marker group(s)",
        region.rows.len(),
        columns,
        groups.len()
    );

    Ok(Scan {
        region,
        columns,
        groups,
    })
}
