//! Utility modules
//!
//! This module contains utilities and helpers:
//! - Diagnostics and error reporting
//! - Error types and result types
//! - Low-level TeX text scanning

pub mod diagnostics;
pub mod error;
pub mod tex;

// Re-export commonly used items
pub use diagnostics::{check_table, format_diagnostics, CheckResult, Diagnostic, DiagnosticLevel};
pub use error::{RenumberError, RenumberOutput, RenumberResult, RenumberWarning, WarningKind};
