//! Round trip tests: Markdown → grid → Markdown → row table
//!
//! The trip is lossy (numbering, captions, extra environments), so these tests compare the
//! parts that must survive rather than the text.

use crate::common::{fixture_path, read_fixture};
use testspec_babel::batch::{markdown_to_sheets, sheets_to_markdown};
use testspec_babel::common::grid::{render_grid, SheetLayout};
use testspec_babel::format::ReadOptions;
use testspec_babel::grammar::Grammar;
use testspec_babel::ir::nodes::{Row, TestSpec};
use testspec_babel::registry::SheetFormatRegistry;
use testspec_babel::{parse_test_spec, serialize_test_sheet, SheetContext};

fn parse(source: &str) -> TestSpec {
    parse_test_spec(source, "sheet", &Grammar::default())
        .unwrap()
        .output
}

fn regenerate(spec: &TestSpec) -> String {
    let grammar = Grammar::default();
    let grid = render_grid(spec, &grammar, &SheetLayout::default());
    let context = SheetContext {
        name: "sheet",
        position: 1,
        category: &spec.category,
    };
    serialize_test_sheet(&grid, &grammar, &context)
        .unwrap()
        .output
}

fn items(spec: &TestSpec) -> Vec<&Row> {
    spec.rows.iter().filter(|row| !row.is_viewpoint()).collect()
}

#[test]
fn test_structure_survives() {
    let original = parse(&read_fixture("kitchensink.md"));
    let again = parse(&regenerate(&original));

    assert_eq!(again.category, original.category);
    assert_eq!(again.summary[0], original.summary[0]);

    let marks = |spec: &TestSpec| spec.rows.iter().map(|row| row.mark).collect::<Vec<_>>();
    assert_eq!(marks(&again), marks(&original));

    for (a, b) in again.rows.iter().zip(&original.rows) {
        assert_eq!(a.levels, b.levels);
        assert_eq!(a.number, b.number);
    }
    for (a, b) in items(&again).into_iter().zip(items(&original)) {
        assert_eq!(a.steps, b.steps);
        assert_eq!(a.expected, b.expected);
        assert_eq!(a.precondition, b.precondition);
    }
}

#[test]
fn test_only_the_first_environment_survives() {
    let original = parse(&read_fixture("kitchensink.md"));
    let again = parse(&regenerate(&original));

    assert_eq!(again.environments, vec!["Windows"]);
    let first_intentions = |spec: &TestSpec| {
        items(spec)
            .iter()
            .map(|row| row.intentions[0].clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(first_intentions(&again), first_intentions(&original));
}

#[test]
fn test_through_csv_files() {
    let grammar = Grammar::default();
    let dir = tempfile::tempdir().unwrap();

    let paths = vec![fixture_path("settings.md"), fixture_path("kitchensink.md")];
    let sheets = markdown_to_sheets(&paths, &grammar, &SheetLayout::default(), "表紙").unwrap();
    let names: Vec<_> = sheets.outputs.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["表紙", "settings", "kitchensink"]);

    let registry = SheetFormatRegistry::default();
    let mut written = Vec::new();
    for sheet in &sheets.outputs {
        written.push(registry.write(sheet, dir.path(), "csv").unwrap());
    }

    let generated = sheets_to_markdown(
        &written,
        &grammar,
        &ReadOptions::default(),
        &registry,
        None,
        "共通",
    )
    .unwrap();
    assert!(generated.warnings.is_empty());

    let files: Vec<_> = generated
        .outputs
        .iter()
        .map(|f| f.file_name.as_str())
        .collect();
    assert_eq!(files, vec!["settings.md", "kitchensink.md"]);

    // a CSV file is its own workbook, so every sheet lands at position 1
    let direct_grid = &sheets.outputs[2].grid;
    let context = SheetContext {
        name: "kitchensink",
        position: 1,
        category: "製品A",
    };
    let direct = serialize_test_sheet(direct_grid, &grammar, &context)
        .unwrap()
        .output;
    assert_eq!(generated.outputs[1].contents, direct);

    let reparsed = parse(&generated.outputs[0].contents);
    assert_eq!(reparsed.category, "製品A");
    assert_eq!(items(&reparsed)[0].steps, "1. 設定を開く\n");
}
