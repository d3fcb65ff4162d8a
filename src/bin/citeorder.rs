//! citeorder CLI - renumber deluxetable citations by first appearance

#[cfg(feature = "cli")]
use clap::{Parser, ValueEnum};
#[cfg(feature = "cli")]
use citeorder::{
    diagnostics::{check_table, format_diagnostics, Diagnostic},
    order_refs, CitationMapping, ColumnSelection, OrphanPolicy, RenumberError, RenumberOptions,
    RenumberWarning,
};
#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use std::process::ExitCode;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "citeorder")]
#[command(version)]
#[command(
    about = "Renumber the citations of a deluxetable in order of first appearance",
    long_about = "Renumber the citations of a deluxetable in order of first appearance.\n\n\
                  The result is written to <FILE>_new; the input is never modified."
)]
struct Cli {
    /// LaTeX file containing one deluxetable
    file: PathBuf,

    /// 0-based citation column indices (default: last column)
    columns: Vec<usize>,

    /// Keep uncited reference entries instead of removing them
    #[arg(long)]
    keep_orphans: bool,

    /// Sort the ordinals within each cell ascending
    #[arg(long)]
    sort_cells: bool,

    /// Check mode - renumber and report issues without writing anything
    #[arg(long)]
    check: bool,

    /// Print the identifier to ordinal mapping
    #[arg(long)]
    print_mapping: bool,

    /// Mapping output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Quiet mode: suppress warning output to stderr
    #[arg(short, long)]
    quiet: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// `identifier -> ordinal` lines
    Text,
    /// JSON object
    Json,
}

#[cfg(feature = "cli")]
impl Cli {
    fn options(&self) -> RenumberOptions {
        RenumberOptions {
            columns: ColumnSelection::from_indices(self.columns.iter().copied()),
            orphans: if self.keep_orphans {
                OrphanPolicy::Keep
            } else {
                OrphanPolicy::Drop
            },
            sort_cell_ordinals: self.sort_cells,
        }
    }
}

#[cfg(feature = "cli")]
fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    let use_color = !cli.no_color;
    let options = cli.options();

    // If check mode, analyze and report issues
    if cli.check {
        let source = match fs::read_to_string(&cli.file) {
            Ok(source) => source,
            Err(source) => {
                let err = RenumberError::InputNotFound {
                    path: cli.file.clone(),
                    source,
                };
                print_error(&err, use_color);
                return ExitCode::FAILURE;
            }
        };
        let result = check_table(&source, &options);
        if cli.print_mapping {
            if let Some(ref mapping) = result.mapping {
                print_mapping(mapping, cli.format);
            }
        }
        println!("{}", format_diagnostics(&result, use_color));
        return if result.has_errors() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        };
    }

    match order_refs(&cli.file, &options) {
        Ok(report) => {
            if !cli.quiet && !report.warnings.is_empty() {
                print_warnings_to_stderr(&report.warnings, use_color);
            }
            if cli.print_mapping {
                print_mapping(&report.mapping, cli.format);
            }
            if !cli.quiet {
                eprintln!("✓ Output written to: {}", report.output_path.display());
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            print_error(&err, use_color);
            ExitCode::FAILURE
        }
    }
}

#[cfg(feature = "cli")]
fn print_mapping(mapping: &CitationMapping, format: Format) {
    match format {
        Format::Text => {
            for (id, ordinal) in mapping.iter() {
                println!("{} -> {}", id, ordinal);
            }
        }
        Format::Json => {
            let object: serde_json::Map<String, serde_json::Value> = mapping
                .iter()
                .map(|(id, ordinal)| (id.to_string(), serde_json::json!(ordinal)))
                .collect();
            println!("{}", serde_json::Value::Object(object));
        }
    }
}

/// Print the error that stopped the run
#[cfg(feature = "cli")]
fn print_error(err: &RenumberError, use_color: bool) {
    let diag = Diagnostic::from(err);
    if use_color {
        eprintln!("{}{}\x1b[0m", diag.color_code(), diag);
    } else {
        eprintln!("{}", diag);
    }
}

/// Print warnings to stderr with optional color coding
#[cfg(feature = "cli")]
fn print_warnings_to_stderr(warnings: &[RenumberWarning], use_color: bool) {
    eprintln!(
        "{}Warnings ({}):{}",
        if use_color { "\x1b[33m" } else { "" },
        warnings.len(),
        if use_color { "\x1b[0m" } else { "" }
    );

    for warning in warnings {
        let diag = Diagnostic::from(warning);
        let color = if use_color { diag.color_code() } else { "" };
        let reset = if use_color { "\x1b[0m" } else { "" };

        if let Some(line) = diag.line {
            eprintln!(
                "  {}[{}]{} line {}: {}",
                color, diag.kind, reset, line, diag.message
            );
        } else {
            eprintln!("  {}[{}]{} {}", color, diag.kind, reset, diag.message);
        }
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Build with --features cli");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  cargo install citeorder --features cli");
    eprintln!("  citeorder <FILE> [COLUMNS]...");
}
