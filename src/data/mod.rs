//! Data layer - Static tokens and constants
//!
//! This module contains the fixed vocabulary of the deluxetable format.

pub mod constants;

// Re-export commonly used items
pub use constants::{
    is_identifier_char, CELL_SEPARATOR, CITE_COMMANDS, END_DATA, NO_DATA_CELLS, OUTPUT_SUFFIX,
    ROW_TERMINATOR, START_DATA, SUPERSCRIPT_COMMANDS, TABLE_ENVIRONMENTS,
};
