//! Integration tests for citeorder end-to-end renumbering

use std::fs;
use std::path::Path;

use citeorder::{
    order_refs, renumber_source, OrphanPolicy, RenumberError, RenumberOptions, WarningKind,
};
use pretty_assertions::assert_eq;

/// Build a deluxetable around `rows` (joined with `\\`) followed by `refs`
fn table(columns: &str, rows: &[&str], refs: &str) -> String {
    format!(
        "\\documentclass{{aastex}}\n\\begin{{document}}\n\\begin{{deluxetable}}{{{}}}\n\\tablecaption{{Sample}}\n\\startdata\n{}\n\\enddata\n{}\\end{{deluxetable}}\n\\end{{document}}\n",
        columns,
        rows.join(" \\\\\n"),
        refs
    )
}

/// Contents of every `[...]` group after `\startdata`, in order
fn bracket_groups(text: &str) -> Vec<Vec<String>> {
    let body = &text[text.find("\\startdata").unwrap_or(0)..];
    let mut groups = Vec::new();
    let mut rest = body;
    while let Some(open) = rest.find('[') {
        let close = open + rest[open..].find(']').unwrap();
        groups.push(
            rest[open + 1..close]
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
        );
        rest = &rest[close + 1..];
    }
    groups
}

fn write_input(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

// ============================================================================
// Ordering
// ============================================================================

mod ordering {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_first_appearance_order() {
        let source = table(
            "lll",
            &["A & B & [Smith]", "C & D & [Jones]", "E & F & [Smith]"],
            "\\tablerefs{(Jones) Jones 2003; (Smith) Smith 2001}\n",
        );
        let output = renumber_source(&source, &RenumberOptions::default()).unwrap();

        let expected = table(
            "lll",
            &["A & B & [1]", "C & D & [2]", "E & F & [1]"],
            "\\tablerefs{(1) Smith 2001; (2) Jones 2003}\n",
        );
        assert_eq!(output.content, expected);

        let mapping: Vec<_> = output.mapping.iter().collect();
        assert_eq!(mapping, vec![("Smith", 1), ("Jones", 2)]);
        assert!(!output.has_warnings());
    }

    #[test]
    fn test_single_citation_three_times() {
        let source = table("ll", &["a & [X]", "b & [X]", "c & [X]"], "");
        let output = renumber_source(&source, &RenumberOptions::default()).unwrap();
        assert_eq!(
            bracket_groups(&output.content),
            vec![vec!["1"], vec!["1"], vec!["1"]]
        );
        assert_eq!(output.mapping.len(), 1);
    }

    #[test]
    fn test_explicit_columns_left_to_right() {
        let source = table(
            "lll",
            &["x & [Lee, Park] & [Kim]", "y & [Kim] & [Park]"],
            "",
        );
        let output = renumber_source(&source, &RenumberOptions::with_columns([2, 1, 2])).unwrap();
        assert_eq!(
            bracket_groups(&output.content),
            vec![vec!["1", "2"], vec!["3"], vec!["3"], vec!["2"]]
        );
        assert_eq!(output.mapping.identifier(1), Some("Lee"));
        assert_eq!(output.mapping.identifier(2), Some("Park"));
    }

    #[test]
    fn test_superscript_markers() {
        let source = table(
            "ll",
            &["a & $^{3,1}$", "b & $^{1}$"],
            "\\tablerefs{(1) One; (3) Three}\n",
        );
        let output = renumber_source(&source, &RenumberOptions::default()).unwrap();
        assert!(output.content.contains("a & $^{1,2}$ \\\\\nb & $^{2}$\n"));
        assert!(output.content.contains("\\tablerefs{(1) Three; (2) One}"));
    }

    #[test]
    fn test_unbraced_superscript_past_nine() {
        let rows: Vec<String> = "abcdefghij"
            .chars()
            .map(|c| format!("x & $^{}$", c))
            .collect();
        let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
        let source = table("ll", &rows, "");
        let output = renumber_source(&source, &RenumberOptions::default()).unwrap();
        assert!(output.content.contains("x & $^9$ \\\\\nx & $^{10}$\n"));

        let again = renumber_source(&output.content, &RenumberOptions::default()).unwrap();
        assert_eq!(again.content, output.content);
    }

    #[test]
    fn test_placeholder_cells_are_skipped() {
        let source = table(
            "ll",
            &["a & \\nodata", "b & [Q]", "c & ", "d & [P]"],
            "",
        );
        let output = renumber_source(&source, &RenumberOptions::default()).unwrap();
        assert_eq!(bracket_groups(&output.content), vec![vec!["1"], vec!["2"]]);
    }

    #[test]
    fn test_directive_rows_are_skipped() {
        let source = table(
            "ll",
            &["\\cutinhead{Group 1}\na & [B]", "\\hline\nb & [A]"],
            "",
        );
        let output = renumber_source(&source, &RenumberOptions::default()).unwrap();
        assert_eq!(output.mapping.ordinal("B"), Some(1));
        assert_eq!(output.mapping.ordinal("A"), Some(2));
    }
}

// ============================================================================
// Properties
// ============================================================================

mod properties {
    use super::*;
    use pretty_assertions::assert_eq;

    const ROWS: &[&str] = &[
        "a & [Kepler, Gaia]",
        "b & [Hubble]",
        "c & [Gaia, Spitzer, Kepler]",
        "d & [Hubble, Chandra]",
    ];

    #[test]
    fn test_idempotent_on_ordered_input() {
        let source = table(
            "ll",
            &["a & [1]", "b & [2, 1]", "c & [3]"],
            "\\tablerefs{(1) First; (2) Second; (3) Third}\n",
        );
        let output = renumber_source(&source, &RenumberOptions::default()).unwrap();
        assert_eq!(output.content, source);
    }

    #[test]
    fn test_second_pass_is_identity() {
        let source = table(
            "ll",
            ROWS,
            "\\tablenotetext{}{{\\bf References.} (Chandra) C; (Gaia) G; (Hubble) H; (Kepler) K; (Spitzer) S}\n",
        );
        let first = renumber_source(&source, &RenumberOptions::default()).unwrap();
        let second = renumber_source(&first.content, &RenumberOptions::default()).unwrap();
        assert_eq!(second.content, first.content);
    }

    #[test]
    fn test_round_trip_through_inverse_mapping() {
        let source = table("ll", ROWS, "");
        let output = renumber_source(&source, &RenumberOptions::default()).unwrap();

        let before = bracket_groups(&source);
        let after = bracket_groups(&output.content);
        assert_eq!(before.len(), after.len());
        for (original, renumbered) in before.iter().zip(&after) {
            let restored: Vec<String> = renumbered
                .iter()
                .map(|n| {
                    let ordinal: usize = n.parse().unwrap();
                    output.mapping.identifier(ordinal).unwrap().to_string()
                })
                .collect();
            assert_eq!(&restored, original);
        }
    }

    #[test]
    fn test_nth_distinct_identifier_gets_n() {
        let source = table("ll", ROWS, "");
        let output = renumber_source(&source, &RenumberOptions::default()).unwrap();
        let order: Vec<_> = output.mapping.iter().collect();
        assert_eq!(
            order,
            vec![
                ("Kepler", 1),
                ("Gaia", 2),
                ("Hubble", 3),
                ("Spitzer", 4),
                ("Chandra", 5)
            ]
        );
    }

    #[test]
    fn test_reference_labels_unique_and_sequential() {
        let source = table(
            "ll",
            ROWS,
            "\\tablerefs{(Chandra) C; (Gaia) G; (Hubble) H; (Kepler) K; (Spitzer) S; (Unused) U}\n",
        );
        let output = renumber_source(&source, &RenumberOptions::default()).unwrap();
        assert!(output.content.contains(
            "\\tablerefs{(1) K; (2) G; (3) H; (4) S; (5) C}"
        ));
        assert_eq!(output.warnings.len(), 1);
        assert_eq!(output.warnings[0].kind, WarningKind::OrphanDropped);
    }
}

// ============================================================================
// Reference Lists
// ============================================================================

mod references {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cite_commands_generate_tablerefs() {
        let source = table(
            "lll",
            &[
                "A & 1.2 & \\citet{smith01,jones03}",
                "B & 3.4 & \\citep{jones03}",
                "C & 5.6 & \\nodata",
            ],
            "",
        );
        let output = renumber_source(&source, &RenumberOptions::default()).unwrap();
        assert!(output.content.contains("A & 1.2 & 1, 2 \\\\"));
        assert!(output.content.contains("B & 3.4 & 2 \\\\"));
        assert!(output.content.contains(
            "\\enddata\n\\tablerefs{(1) \\citet{smith01}; (2) \\citet{jones03}}\n\\end{deluxetable}"
        ));
    }

    #[test]
    fn test_tablenotetext_reference_note() {
        let source = table(
            "ll",
            &["a & 2", "b & 1, 2"],
            "\\tablenotetext{a}{Photometric.}\n\\tablenotetext{}{{\\bf References.} (1) \\citet{a}, (2) \\citet{b}}\n",
        );
        let output = renumber_source(&source, &RenumberOptions::default()).unwrap();
        assert!(output.content.contains("a & 1 \\\\\nb & 2, 1\n"));
        assert!(output.content.contains("\\tablenotetext{a}{Photometric.}\n"));
        assert!(output.content.contains(
            "\\tablenotetext{}{{\\bf References.} (1) \\citet{b}, (2) \\citet{a}}"
        ));
    }

    #[test]
    fn test_parenthesized_year_survives() {
        let source = table(
            "ll",
            &["a & 2", "b & 1"],
            "\\tablerefs{(1) \\citealt{smith} (2005); (2) Jones}\n",
        );
        let output = renumber_source(&source, &RenumberOptions::default()).unwrap();
        assert!(output
            .content
            .contains("\\tablerefs{(1) Jones; (2) \\citealt{smith} (2005)}"));
        assert!(!output.has_warnings());
    }

    #[test]
    fn test_missing_reference_is_reported() {
        let source = table(
            "ll",
            &["a & [Smith]", "b & [Jones]"],
            "\\tablerefs{(Jones) Jones 2003}\n",
        );
        let output = renumber_source(&source, &RenumberOptions::default()).unwrap();
        assert!(output.content.contains("\\tablerefs{(2) Jones 2003}"));
        assert_eq!(output.warnings.len(), 1);
        assert_eq!(output.warnings[0].kind, WarningKind::MissingReference);
        assert_eq!(output.warnings[0].identifier, "Smith");
    }

    #[test]
    fn test_keep_orphans() {
        let source = table(
            "ll",
            &["a & [Smith]"],
            "\\tablerefs{(Lee) Lee 2010; (Smith) Smith 2001}\n",
        );
        let options = RenumberOptions {
            orphans: OrphanPolicy::Keep,
            ..Default::default()
        };
        let output = renumber_source(&source, &options).unwrap();
        assert!(output
            .content
            .contains("\\tablerefs{(1) Smith 2001; (Lee) Lee 2010}"));
        assert_eq!(output.warnings[0].kind, WarningKind::OrphanKept);
    }
}

// ============================================================================
// Errors
// ============================================================================

mod errors {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_column_out_of_range_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let source = table("llll", &["a & b & c & [X]", "e & f & g & [Y]"], "");
        let input = write_input(dir.path(), "table.tex", &source);

        let err = order_refs(&input, &RenumberOptions::with_columns([5])).unwrap_err();
        match err {
            RenumberError::ColumnIndexOutOfRange { column, columns, .. } => {
                assert_eq!(column, 5);
                assert_eq!(columns, 4);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!dir.path().join("table.tex_new").exists());
    }

    #[test]
    fn test_input_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = order_refs(dir.path().join("absent.tex"), &RenumberOptions::default())
            .unwrap_err();
        assert!(matches!(err, RenumberError::InputNotFound { .. }));
    }

    #[test]
    fn test_no_table() {
        let err = renumber_source("\\section{Intro}\nText [1].\n", &RenumberOptions::default())
            .unwrap_err();
        assert!(matches!(err, RenumberError::MalformedTable { .. }));
    }

    #[test]
    fn test_two_tables() {
        let one = table("ll", &["a & [X]"], "");
        let err = renumber_source(&format!("{}{}", one, one), &RenumberOptions::default())
            .unwrap_err();
        assert!(matches!(err, RenumberError::MalformedTable { .. }));
    }

    #[test]
    fn test_inconsistent_rows_with_inferred_column() {
        let source = table("lll", &["a & b & [X]", "c & [Y]"], "");
        let err = renumber_source(&source, &RenumberOptions::default()).unwrap_err();
        assert!(matches!(err, RenumberError::MalformedTable { line: Some(_), .. }));
    }

    #[test]
    fn test_unrecognized_syntax_points_at_cell() {
        let source = table("ll", &["a & [X]", "b & {Y}"], "");
        let err = renumber_source(&source, &RenumberOptions::default()).unwrap_err();
        match err {
            RenumberError::UnrecognizedCitationSyntax { line, column, .. } => {
                assert_eq!(line, 7);
                assert_eq!(column, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

// ============================================================================
// Files
// ============================================================================

mod files {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_order_refs_writes_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = table(
            "ll",
            &["a & [B]", "b & [A]"],
            "\\tablerefs{(A) Alpha; (B) Beta}\n",
        );
        let input = write_input(dir.path(), "table.tex", &source);

        let report = order_refs(&input, &RenumberOptions::default()).unwrap();
        assert_eq!(report.output_path, dir.path().join("table.tex_new"));
        assert_eq!(fs::read_to_string(&input).unwrap(), source);

        let written = fs::read_to_string(&report.output_path).unwrap();
        let expected = table(
            "ll",
            &["a & [1]", "b & [2]"],
            "\\tablerefs{(1) Beta; (2) Alpha}\n",
        );
        assert_eq!(written, expected);
        assert_eq!(report.mapping.ordinal("B"), Some(1));
    }

    #[test]
    fn test_order_refs_overwrites_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let source = table("ll", &["a & [Z]"], "");
        let input = write_input(dir.path(), "t.tex", &source);
        fs::write(dir.path().join("t.tex_new"), "stale").unwrap();

        order_refs(&input, &RenumberOptions::default()).unwrap();
        let written = fs::read_to_string(dir.path().join("t.tex_new")).unwrap();
        assert!(written.contains("a & [1]\n"));
    }

    #[test]
    fn test_failed_run_leaves_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let source = table("ll", &["a & [Z"], "");
        let input = write_input(dir.path(), "t.tex", &source);
        fs::write(dir.path().join("t.tex_new"), "earlier run").unwrap();

        let err = order_refs(&input, &RenumberOptions::default()).unwrap_err();
        assert!(matches!(err, RenumberError::UnrecognizedCitationSyntax { .. }));
        assert_eq!(
            fs::read_to_string(dir.path().join("t.tex_new")).unwrap(),
            "earlier run"
        );
    }
}
