//! Renumbering Engine
//!
//! Walks the scanned markers in order, assigns each distinct identifier the
//! next ordinal the first time it is seen, and records the replacement text
//! for every marker position. The reference list is then rebuilt in
//! ordinal order.

use indexmap::IndexMap;

use crate::core::document::Span;
use crate::core::options::{OrphanPolicy, RenumberOptions};
use crate::core::scanner::Scan;
use crate::data::constants::ORDINAL_SEPARATOR;
use crate::features::citations::MarkerSyntax;
use crate::features::references::{ReferenceList, RenderedEntry};
use crate::utils::error::{RenumberError, RenumberResult, RenumberWarning, WarningKind};

/// How a citation was written in the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CitationOrigin {
    /// Bare, bracket or superscript label, defined in the reference list
    Label,
    /// Key of a `\cite`-family command (first command seen)
    Command(String),
}

impl CitationOrigin {
    fn is_command(&self) -> bool {
        matches!(self, CitationOrigin::Command(_))
    }
}

/// A mapping entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedCitation {
    pub ordinal: usize,
    pub origin: CitationOrigin,
    /// 1-indexed line of the first occurrence
    pub line: usize,
}

/// Original identifier to new ordinal, in order of first appearance
#[derive(Debug, Clone, Default)]
pub struct CitationMapping {
    entries: IndexMap<String, MappedCitation>,
}

impl CitationMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ordinal for `id`, assigning the next one on first sight
    ///
    /// Once assigned, an ordinal never changes. Using the same identifier as
    /// both a command key and a label is an error, since the two would need
    /// different reference definitions.
    pub fn assign(&mut self, id: &str, origin: CitationOrigin, line: usize) -> RenumberResult<usize> {
        if let Some(existing) = self.entries.get(id) {
            if existing.origin.is_command() != origin.is_command() {
                return Err(RenumberError::ambiguous(
                    id,
                    format!(
                        "used both as a citation key and as a reference label (first seen at line {})",
                        existing.line
                    ),
                    Some(line),
                ));
            }
            return Ok(existing.ordinal);
        }

        let ordinal = self.entries.len() + 1;
        self.entries.insert(
            id.to_string(),
            MappedCitation {
                ordinal,
                origin,
                line,
            },
        );
        Ok(ordinal)
    }

    pub fn get(&self, id: &str) -> Option<&MappedCitation> {
        self.entries.get(id)
    }

    pub fn ordinal(&self, id: &str) -> Option<usize> {
        self.entries.get(id).map(|c| c.ordinal)
    }

    /// Inverse lookup: the identifier that received `ordinal`
    pub fn identifier(&self, ordinal: usize) -> Option<&str> {
        let index = ordinal.checked_sub(1)?;
        self.entries.get_index(index).map(|(id, _)| id.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(identifier, ordinal)` pairs in ascending ordinal order
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.entries.iter().map(|(id, c)| (id.as_str(), c.ordinal))
    }

    /// Full entries in ascending ordinal order
    pub fn citations(&self) -> impl Iterator<Item = (&str, &MappedCitation)> + '_ {
        self.entries.iter().map(|(id, c)| (id.as_str(), c))
    }

    /// Whether `label` is the text of an assigned ordinal
    fn is_ordinal_text(&self, label: &str) -> bool {
        label
            .parse::<usize>()
            .map(|n| n >= 1 && n <= self.len() && n.to_string() == label)
            .unwrap_or(false)
    }
}

/// Replacement of a document span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub span: Span,
    pub replacement: String,
}

impl Edit {
    pub fn new(span: Span, replacement: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
        }
    }

    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::new(Span::new(at, at), text)
    }
}

/// Result of the renumbering pass
#[derive(Debug, Clone)]
pub struct Renumbering {
    pub mapping: CitationMapping,
    /// One edit per in-place marker, one per cite command group
    pub edits: Vec<Edit>,
    /// Reference entries in output order
    pub references: Vec<RenderedEntry>,
    pub warnings: Vec<RenumberWarning>,
}

/// Assign ordinals in scan order and plan the marker rewrites
pub fn renumber_markers(
    scan: &Scan,
    sort_cell_ordinals: bool,
) -> RenumberResult<(CitationMapping, Vec<Edit>)> {
    let mut mapping = CitationMapping::new();
    let mut edits = Vec::new();

    for group in &scan.groups {
        let origin = match &group.syntax {
            MarkerSyntax::Command(name) => CitationOrigin::Command(name.clone()),
            _ => CitationOrigin::Label,
        };

        let mut ordinals = Vec::with_capacity(group.markers.len());
        for marker in &group.markers {
            ordinals.push(mapping.assign(&marker.id, origin.clone(), marker.line)?);
        }
        if sort_cell_ordinals {
            ordinals.sort_unstable();
        }

        if group.syntax.rewrites_in_place() {
            for (marker, ordinal) in group.markers.iter().zip(&ordinals) {
                let mut text = ordinal.to_string();
                // `$^10$` would only raise the first digit
                if group.unbraced && text.len() > 1 {
                    text = format!("{{{}}}", text);
                }
                edits.push(Edit::new(marker.span, text));
            }
        } else {
            let rendered: Vec<String> = ordinals.iter().map(usize::to_string).collect();
            edits.push(Edit::new(group.span, rendered.join(ORDINAL_SEPARATOR)));
        }
    }

    log::debug!(
        "assigned {} ordinal(s) to {} marker(s)",
        mapping.len(),
        scan.markers().count()
    );
    Ok((mapping, edits))
}

/// Rebuild the reference list in ordinal order
///
/// Cited entries take their new ordinal; a command key with no entry gets a
/// generated `\command{key}` definition; a label with no entry is kept in
/// the table and reported. Uncited entries follow `policy`.
pub fn renumber_references(
    list: Option<&ReferenceList>,
    mapping: &CitationMapping,
    policy: OrphanPolicy,
    warnings: &mut Vec<RenumberWarning>,
) -> RenumberResult<Vec<RenderedEntry>> {
    let mut entries = Vec::with_capacity(mapping.len());

    for (id, citation) in mapping.citations() {
        let label = citation.ordinal.to_string();
        if let Some(entry) = list.and_then(|l| l.entry(id)) {
            entries.push(RenderedEntry {
                label,
                lead: entry.lead.clone(),
                definition: entry.definition.clone(),
            });
        } else if let CitationOrigin::Command(command) = &citation.origin {
            entries.push(RenderedEntry::new(label, format!("\\{}{{{}}}", command, id)));
        } else {
            let warning = RenumberWarning::new(
                WarningKind::MissingReference,
                id,
                format!(
                    "citation '{}' (now {}) has no reference entry",
                    id, citation.ordinal
                ),
                Some(citation.line),
            );
            log::warn!("{}", warning);
            warnings.push(warning);
        }
    }

    let Some(list) = list else {
        return Ok(entries);
    };

    for entry in &list.entries {
        if mapping.get(&entry.label).is_some() {
            continue;
        }
        match policy {
            OrphanPolicy::Drop => {
                let warning = RenumberWarning::new(
                    WarningKind::OrphanDropped,
                    &entry.label,
                    format!("reference ({}) is never cited and was removed", entry.label),
                    Some(entry.line),
                );
                log::warn!("{}", warning);
                warnings.push(warning);
            }
            OrphanPolicy::Keep => {
                if mapping.is_ordinal_text(&entry.label) {
                    return Err(RenumberError::ambiguous(
                        &entry.label,
                        "uncited reference label collides with a new ordinal",
                        Some(entry.line),
                    ));
                }
                let warning = RenumberWarning::new(
                    WarningKind::OrphanKept,
                    &entry.label,
                    format!("reference ({}) is never cited and was kept", entry.label),
                    Some(entry.line),
                );
                log::warn!("{}", warning);
                warnings.push(warning);
                entries.push(RenderedEntry {
                    label: entry.label.clone(),
                    lead: entry.lead.clone(),
                    definition: entry.definition.clone(),
                });
            }
        }
    }

    Ok(entries)
}

/// Run the whole renumbering stage
pub fn renumber(
    scan: &Scan,
    references: Option<&ReferenceList>,
    options: &RenumberOptions,
) -> RenumberResult<Renumbering> {
    let (mapping, edits) = renumber_markers(scan, options.sort_cell_ordinals)?;
    let mut warnings = Vec::new();
    let references = renumber_references(references, &mapping, options.orphans, &mut warnings)?;
    Ok(Renumbering {
        mapping,
        edits,
        references,
        warnings,
    })
}
