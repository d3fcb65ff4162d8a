//! Feature modules - table content grammars
//!
//! - Citation markers inside a cell
//! - The reference list following the table body

pub mod citations;
pub mod references;

// Re-export commonly used types
pub use citations::{parse_cell, MarkerSyntax};
pub use references::{find_reference_list, ReferenceCommand, ReferenceEntry, ReferenceList};
