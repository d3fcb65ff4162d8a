//! Reference List Module
//!
//! Parses and re-renders the reference block that follows a deluxetable
//! body. Two block commands are recognized:
//!
//! - `\tablerefs{(1) Smith 2001; (2) Jones 2003}` (AASTeX)
//! - `\tablenotetext{}{{\bf References.} (1) ..., (2) ...}` (emulateapj)
//!
//! Inside the block, an entry starts at a `(label)` token at brace depth 0
//! that follows `;` or `,`. The first entry may also open the block or
//! follow a closing brace (`{\bf References.} (1) ...`). The text before the
//! first entry, the gaps between entries and the trailing whitespace are
//! kept verbatim so that an already-ordered list re-renders identically.

use fxhash::FxHashMap;

use crate::core::document::{Document, Span};
use crate::data::constants::{
    is_identifier_char, DEFAULT_REFERENCE_SEPARATOR, TABLENOTETEXT, TABLEREFS,
};
use crate::utils::error::{RenumberError, RenumberResult};
use crate::utils::tex::{braced_arg, control_words, normalized_content};

/// Command holding the reference list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceCommand {
    TableRefs,
    TableNoteText,
}

/// One `(label) definition` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceEntry {
    pub label: String,
    /// Whitespace between `)` and the definition
    pub lead: String,
    pub definition: String,
    /// 1-indexed line of the label
    pub line: usize,
}

/// Entry ready to be rendered with its new label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEntry {
    pub label: String,
    pub lead: String,
    pub definition: String,
}

impl RenderedEntry {
    pub fn new(label: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            lead: " ".to_string(),
            definition: definition.into(),
        }
    }
}

/// Parsed reference block
#[derive(Debug, Clone)]
pub struct ReferenceList {
    pub command: ReferenceCommand,
    /// Block content inside its braces, in document coordinates
    pub body: Span,
    /// Text before the first entry
    pub prefix: String,
    pub entries: Vec<ReferenceEntry>,
    /// Text between consecutive entries
    pub gaps: Vec<String>,
    /// Trailing text after the last definition
    pub suffix: String,
    index: FxHashMap<String, usize>,
}

impl ReferenceList {
    /// Look up an entry by its label
    pub fn entry(&self, label: &str) -> Option<&ReferenceEntry> {
        self.index.get(label).map(|&i| &self.entries[i])
    }

    /// Separator to place after the `k`-th rendered entry
    fn gap(&self, k: usize) -> &str {
        self.gaps
            .get(k)
            .or(self.gaps.last())
            .map(String::as_str)
            .unwrap_or(DEFAULT_REFERENCE_SEPARATOR)
    }

    /// Render the block content for a new sequence of entries
    pub fn render_body(&self, entries: &[RenderedEntry]) -> String {
        let mut out = self.prefix.clone();
        for (k, entry) in entries.iter().enumerate() {
            if k > 0 {
                out.push_str(self.gap(k - 1));
            }
            push_entry(&mut out, entry);
        }
        out.push_str(&self.suffix);
        out
    }
}

fn push_entry(out: &mut String, entry: &RenderedEntry) {
    out.push('(');
    out.push_str(&entry.label);
    out.push(')');
    out.push_str(&entry.lead);
    out.push_str(&entry.definition);
}

/// Render a fresh `\tablerefs{...}` line for a table without reference block
pub fn render_new_block(entries: &[RenderedEntry]) -> String {
    let mut out = format!("{}{{", TABLEREFS);
    for (k, entry) in entries.iter().enumerate() {
        if k > 0 {
            out.push_str(DEFAULT_REFERENCE_SEPARATOR);
        }
        push_entry(&mut out, entry);
    }
    out.push_str("}\n");
    out
}

/// Find and parse the first reference block at or after `from`
///
/// A `\tablenotetext` with a non-empty first argument is an ordinary table
/// note and is skipped.
pub fn find_reference_list(doc: &Document, from: usize) -> RenumberResult<Option<ReferenceList>> {
    let text = doc.text();
    for (rel, name) in control_words(&text[from..]) {
        let start = from + rel;
        let after_name = start + name.len() + 1;
        let command = if name == &TABLEREFS[1..] {
            ReferenceCommand::TableRefs
        } else if name == &TABLENOTETEXT[1..] {
            ReferenceCommand::TableNoteText
        } else {
            continue;
        };

        let unbalanced = || {
            RenumberError::malformed_at(
                format!("unbalanced braces in \\{} block", name),
                doc.line_of(start),
            )
        };

        let body = match command {
            ReferenceCommand::TableRefs => braced_arg(text, after_name).ok_or_else(unbalanced)?.0,
            ReferenceCommand::TableNoteText => {
                let (mark, after_mark) = braced_arg(text, after_name).ok_or_else(unbalanced)?;
                if !normalized_content(doc.slice(mark)).is_empty() {
                    continue;
                }
                braced_arg(text, after_mark).ok_or_else(unbalanced)?.0
            }
        };

        log::debug!(
            "reference block \\{} found at line {}",
            name,
            doc.line_of(start)
        );
        return parse_body(doc, command, body).map(Some);
    }
    Ok(None)
}

/// Offsets of `(label)` entry starts in `body`, with the label span
fn entry_starts(body: &str) -> Vec<(usize, Span)> {
    let bytes = body.as_bytes();
    let mut starts = Vec::new();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 1 + body[i + 1..].chars().next().map(char::len_utf8).unwrap_or(0);
                continue;
            }
            b'%' => {
                i += body[i..].find('\n').unwrap_or(body.len() - i);
                continue;
            }
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            b'(' if depth == 0 => {
                // `}` only ends a heading such as `{\bf References.}`
                let opens_entry = match body[..i].trim_end().chars().next_back() {
                    Some(';') | Some(',') => true,
                    None | Some('}') => starts.is_empty(),
                    _ => false,
                };
                let label_len = body[i + 1..]
                    .find(|c: char| !is_identifier_char(c))
                    .unwrap_or(body.len() - i - 1);
                if opens_entry && label_len > 0 && bytes.get(i + 1 + label_len) == Some(&b')') {
                    starts.push((i, Span::new(i + 1, i + 1 + label_len)));
                    i += label_len + 2;
                    continue;
                }
            }
            _ => {}
        }
        i += 1;
    }
    starts
}

fn parse_body(
    doc: &Document,
    command: ReferenceCommand,
    body: Span,
) -> RenumberResult<ReferenceList> {
    let text = doc.slice(body);
    let starts = entry_starts(text);

    if starts.is_empty() {
        if !normalized_content(text).is_empty() {
            return Err(RenumberError::malformed_at(
                "reference list has no '(label) definition' entries",
                doc.line_of(body.start),
            ));
        }
        return Ok(ReferenceList {
            command,
            body,
            prefix: text.to_string(),
            entries: Vec::new(),
            gaps: Vec::new(),
            suffix: String::new(),
            index: FxHashMap::default(),
        });
    }

    let mut entries = Vec::with_capacity(starts.len());
    let mut gaps = Vec::new();
    let mut index = FxHashMap::default();
    let mut suffix = String::new();

    for (k, &(start, label)) in starts.iter().enumerate() {
        let region_start = label.end + 1;
        let region_end = starts.get(k + 1).map(|&(s, _)| s).unwrap_or(text.len());
        let region = &text[region_start..region_end];

        let content = region.trim_start();
        let lead = &region[..region.len() - content.len()];
        let definition = content
            .trim_end()
            .trim_end_matches(&[';', ','][..])
            .trim_end();
        let tail = &content[definition.len()..];

        if k + 1 < starts.len() {
            gaps.push(tail.to_string());
        } else {
            suffix = tail.to_string();
        }

        let label = text[label.start..label.end].to_string();
        let line = doc.line_of(body.start + start);
        if index.insert(label.clone(), k).is_some() {
            return Err(RenumberError::malformed_at(
                format!("duplicate reference label ({})", label),
                line,
            ));
        }
        entries.push(ReferenceEntry {
            label,
            lead: lead.to_string(),
            definition: definition.to_string(),
            line,
        });
    }

    Ok(ReferenceList {
        command,
        body,
        prefix: text[..starts[0].0].to_string(),
        entries,
        gaps,
        suffix,
        index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> ReferenceList {
        let doc = Document::new(source);
        find_reference_list(&doc, 0).unwrap().unwrap()
    }

    fn same_entries(list: &ReferenceList) -> Vec<RenderedEntry> {
        list.entries
            .iter()
            .map(|e| RenderedEntry {
                label: e.label.clone(),
                lead: e.lead.clone(),
                definition: e.definition.clone(),
            })
            .collect()
    }

    #[test]
    fn test_tablerefs() {
        let list = parse(r"\tablerefs{(1) Smith et al. (2001); (2) Jones 2003}");
        assert_eq!(list.command, ReferenceCommand::TableRefs);
        assert_eq!(list.entries.len(), 2);
        assert_eq!(list.entries[0].definition, "Smith et al. (2001)");
        assert_eq!(list.entries[1].label, "2");
        assert_eq!(list.gaps, vec!["; ".to_string()]);
        assert_eq!(list.entry("2").unwrap().definition, "Jones 2003");
        assert!(list.entry("3").is_none());
    }

    #[test]
    fn test_tablenotetext_references() {
        let source = r"\tablenotetext{a}{Not a reference.}
\tablenotetext{}{{\bf References.} (Smith) \citet{smith01}, (Jones) \citet{jones03}}";
        let list = parse(source);
        assert_eq!(list.command, ReferenceCommand::TableNoteText);
        assert_eq!(list.prefix, r"{\bf References.} ");
        assert_eq!(list.entries[0].label, "Smith");
        assert_eq!(list.entries[1].definition, r"\citet{jones03}");
        assert_eq!(list.entries[1].line, 2);
        assert_eq!(list.gaps, vec![", ".to_string()]);
    }

    #[test]
    fn test_render_is_identity_for_same_entries() {
        let body = "\n  (1) Smith 2001;\n  (2) Jones 2003.\n";
        let list = parse(&format!("\\tablerefs{{{}}}", body));
        assert_eq!(list.render_body(&same_entries(&list)), body);
    }

    #[test]
    fn test_render_reordered() {
        let list = parse(r"\tablerefs{(1) A; (2) B; (3) C}");
        let entries = vec![
            RenderedEntry::new("1", "C"),
            RenderedEntry::new("2", "A"),
        ];
        assert_eq!(list.render_body(&entries), "(1) C; (2) A");
    }

    #[test]
    fn test_render_more_entries_reuses_last_gap() {
        let list = parse(r"\tablerefs{(1) A; (2) B}");
        let entries = vec![
            RenderedEntry::new("1", "A"),
            RenderedEntry::new("2", "B"),
            RenderedEntry::new("3", r"\citet{c}"),
        ];
        assert_eq!(list.render_body(&entries), r"(1) A; (2) B; (3) \citet{c}");
    }

    #[test]
    fn test_parenthesized_year_is_not_an_entry() {
        let list = parse(r"\tablerefs{(1) Smith (2001), in prep.; (2) Jones}");
        assert_eq!(list.entries.len(), 2);
        assert_eq!(list.entries[0].definition, "Smith (2001), in prep.");
    }

    #[test]
    fn test_year_after_cite_command_stays_in_definition() {
        let list = parse(r"\tablerefs{(1) \citealt{smith} (2005); (2) Jones}");
        assert_eq!(list.entries.len(), 2);
        assert_eq!(list.entries[0].definition, r"\citealt{smith} (2005)");
        assert!(list.entry("2005").is_none());
    }

    #[test]
    fn test_duplicate_label() {
        let doc = Document::new("\\tablerefs{(1) A;\n(1) B}");
        let err = find_reference_list(&doc, 0).unwrap_err();
        assert!(matches!(err, RenumberError::MalformedTable { line: Some(2), .. }));
    }

    #[test]
    fn test_unlabelled_block() {
        let doc = Document::new(r"\tablerefs{Smith 2001}");
        assert!(find_reference_list(&doc, 0).is_err());
    }

    #[test]
    fn test_empty_block() {
        let list = parse(r"\tablerefs{}");
        assert!(list.entries.is_empty());
        assert_eq!(list.render_body(&[RenderedEntry::new("1", "A")]), "(1) A");
    }

    #[test]
    fn test_unbalanced_block() {
        let doc = Document::new(r"\tablerefs{(1) A");
        let err = find_reference_list(&doc, 0).unwrap_err();
        assert!(err.to_string().contains("unbalanced"));
    }

    #[test]
    fn test_no_block() {
        let doc = Document::new(r"\end{deluxetable}");
        assert!(find_reference_list(&doc, 0).unwrap().is_none());
    }

    #[test]
    fn test_render_new_block() {
        let entries = vec![
            RenderedEntry::new("1", r"\citet{a}"),
            RenderedEntry::new("2", r"\citet{b}"),
        ];
        assert_eq!(
            render_new_block(&entries),
            "\\tablerefs{(1) \\citet{a}; (2) \\citet{b}}\n"
        );
    }
}
