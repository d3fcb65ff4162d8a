// =============================================================================
// Renumbering Options
// =============================================================================

/// Which table columns hold citations
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ColumnSelection {
    /// The last column, inferred from the shape of the first data row
    #[default]
    Last,
    /// Explicit 0-based column indices
    Explicit(Vec<usize>),
}

impl ColumnSelection {
    /// Build a selection from user-supplied indices; no indices means `Last`
    pub fn from_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        let indices: Vec<usize> = indices.into_iter().collect();
        if indices.is_empty() {
            ColumnSelection::Last
        } else {
            ColumnSelection::Explicit(indices)
        }
    }

    /// Resolve the designated columns for a table whose first data row has
    /// `width` cells
    ///
    /// Explicit indices come back sorted and de-duplicated so that scanning
    /// stays left-to-right. Range checks happen per row in the scanner.
    pub fn resolve(&self, width: usize) -> Vec<usize> {
        match self {
            ColumnSelection::Last => vec![width.saturating_sub(1)],
            ColumnSelection::Explicit(indices) => {
                let mut columns = indices.clone();
                columns.sort_unstable();
                columns.dedup();
                columns
            }
        }
    }

    pub fn is_explicit(&self) -> bool {
        matches!(self, ColumnSelection::Explicit(_))
    }
}

/// What to do with reference entries that no marker cites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrphanPolicy {
    /// Remove them from the output list (with a warning)
    #[default]
    Drop,
    /// Keep them after the renumbered entries, label unchanged (with a warning)
    Keep,
}

/// Options for a renumbering pass
#[derive(Debug, Clone, Default)]
pub struct RenumberOptions {
    /// Citation columns
    /// Default: last column
    pub columns: ColumnSelection,

    /// Handling of uncited reference entries
    /// Default: drop
    pub orphans: OrphanPolicy,

    /// Render the ordinals of each marker group in ascending order
    /// Default: false (every marker keeps its position)
    pub sort_cell_ordinals: bool,
}

impl RenumberOptions {
    /// Create new options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Options citing from explicit columns
    pub fn with_columns(columns: impl IntoIterator<Item = usize>) -> Self {
        Self {
            columns: ColumnSelection::from_indices(columns),
            ..Self::default()
        }
    }

    /// Options that never lose a reference definition
    pub fn conservative() -> Self {
        Self {
            orphans: OrphanPolicy::Keep,
            ..Self::default()
        }
    }
}
