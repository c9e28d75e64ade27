//! Import tests for Markdown format (Markdown → row table → grid)

use crate::common::read_fixture;
use testspec_babel::common::grid::{render_grid, SheetLayout};
use testspec_babel::error::{Position, TranscodeError, WarningKind};
use testspec_babel::grammar::{Grammar, GrammarSpec};
use testspec_babel::ir::nodes::{ColumnKey, Row, TestSpec};
use testspec_babel::parse_test_spec;

fn parse(source: &str) -> TestSpec {
    parse_test_spec(source, "sheet", &Grammar::default())
        .expect("Should parse markdown")
        .output
}

fn items(spec: &TestSpec) -> Vec<&Row> {
    spec.rows.iter().filter(|row| !row.is_viewpoint()).collect()
}

#[test]
fn test_kitchensink_header_area() {
    let spec = parse(&read_fixture("kitchensink.md"));

    assert_eq!(spec.category, "製品A");
    assert_eq!(spec.summary, vec!["ログイン機能の試験仕様"]);
    assert_eq!(spec.environments, vec!["Windows", "macOS"]);
}

#[test]
fn test_kitchensink_rows() {
    let spec = parse(&read_fixture("kitchensink.md"));
    let marks: Vec<_> = spec.rows.iter().map(|row| row.mark).collect();
    assert_eq!(
        marks,
        vec![
            ColumnKey::Level(1),
            ColumnKey::Level(2),
            ColumnKey::Number,
            ColumnKey::Number,
            ColumnKey::Level(2),
            ColumnKey::Number,
        ]
    );

    assert_eq!(spec.rows[0].levels[0], "1");
    assert_eq!(spec.rows[0].environment, "ログイン");
    assert_eq!(spec.rows[1].levels[1], "1");
    assert_eq!(spec.rows[4].levels[1], "2");
    assert_eq!(spec.rows[4].environment, "異常系");

    let numbers: Vec<_> = items(&spec).iter().map(|row| row.number.as_str()).collect();
    assert_eq!(numbers, vec!["1", "2", "3"]);
}

#[test]
fn test_kitchensink_first_item_cells() {
    let spec = parse(&read_fixture("kitchensink.md"));
    let item = items(&spec)[0];

    assert_eq!(item.environment, "・ブラウザ\n");
    assert_eq!(item.precondition, "・ユーザー登録済み\n");
    assert_eq!(
        item.steps,
        "1. ログイン画面を開く\n2. IDを入力する\n  1. 全角\n  2. 半角\n3. ログインする\n"
    );
    assert_eq!(
        item.expected,
        "・トップ画面に遷移する\n  ・ヘッダーに名前\n    長い説明\n"
    );
    assert_eq!(item.notes, "・Windows\n・macOS\n");
    assert_eq!(item.intentions, vec!["実施", "省略"]);
}

#[test]
fn test_kitchensink_omission_per_environment() {
    let spec = parse(&read_fixture("kitchensink.md"));
    let intentions: Vec<_> = items(&spec)
        .iter()
        .map(|row| row.intentions.clone())
        .collect();
    assert_eq!(
        intentions,
        vec![
            vec!["実施".to_string(), "省略".to_string()],
            vec!["省略".to_string(), "実施".to_string()],
            vec!["実施".to_string(), "実施".to_string()],
        ]
    );
}

#[test]
fn test_kitchensink_has_no_warnings() {
    let parsed = parse_test_spec(
        &read_fixture("kitchensink.md"),
        "kitchensink",
        &Grammar::default(),
    )
    .unwrap();
    assert!(parsed.warnings.is_empty(), "{:?}", parsed.warnings);
    assert_eq!(parsed.output.sheet_name, "kitchensink");
}

#[test]
fn test_category_counters_reset_deeper_levels() {
    let source = "\
Cat
===
# a
## b
## c
# d
## e
";
    let spec = parse(source);
    let levels: Vec<_> = spec
        .rows
        .iter()
        .map(|row| (row.levels[0].as_str(), row.levels[1].as_str()))
        .collect();
    assert_eq!(
        levels,
        vec![("1", ""), ("", "1"), ("", "2"), ("2", ""), ("", "1")]
    );
}

#[test]
fn test_item_numbers_never_reset() {
    let source = "\
Cat
===
# a
1. s
- e
# b
1. s
- e
";
    let spec = parse(source);
    let numbers: Vec<_> = items(&spec).iter().map(|row| row.number.as_str()).collect();
    assert_eq!(numbers, vec!["1", "2"]);
}

#[test]
fn test_precondition_without_steps_is_fatal() {
    let source = "Cat\n===\n# V\n* only a precondition\n# W\n";
    let err = parse_test_spec(source, "sheet", &Grammar::default()).unwrap_err();
    assert_eq!(
        err,
        TranscodeError::InconsistentItem {
            position: Position::line(5)
        }
    );
}

#[test]
fn test_unrecognized_line_is_a_warning() {
    let source = "Cat\n===\n# V\nstray\n1. s\n- e\n";
    let parsed = parse_test_spec(source, "sheet", &Grammar::default()).unwrap();
    assert_eq!(parsed.warnings.len(), 1);
    assert_eq!(parsed.warnings[0].kind, WarningKind::UnrecognizedLine);
    assert_eq!(parsed.warnings[0].position, Position::line(4));
    assert_eq!(items(&parsed.output).len(), 1);
}

#[test]
fn test_custom_grammar() {
    let mut spec = GrammarSpec::default();
    spec.mark_for_read.environment = r"^• ".into();
    spec.test_intention.inclusion_word = "Run".into();
    let grammar = Grammar::try_from(spec).unwrap();

    let source = "Cat\n===\n# V\n• chrome\n1. s\n- e\n";
    let parsed = parse_test_spec(source, "sheet", &grammar).unwrap();
    let item = items(&parsed.output)[0];
    assert_eq!(item.environment, "・chrome\n");
    assert_eq!(item.intentions, vec!["Run"]);
}

#[test]
fn test_rendered_grid_layout() {
    let grammar = Grammar::default();
    let spec = parse(&read_fixture("kitchensink.md"));
    let grid = render_grid(&spec, &grammar, &SheetLayout::default());

    assert_eq!(grid.len(), 5 + spec.rows.len());
    assert_eq!(grid[0][4], "ログイン機能の試験仕様");
    assert_eq!(grid[3][12], "Windows");
    assert_eq!(grid[3][13], "macOS");
    assert_eq!(grid[4][0], "1");
    assert_eq!(grid[4][11], "備考");
    assert_eq!(grid[4][12], "実施判定");
    assert_eq!(grid[4][13], "実施判定");
    assert_eq!(grid[5][0], "1");
    assert_eq!(grid[5][7], "ログイン");
    assert_eq!(grid[7][6], "1");
    assert_eq!(grid[7][13], "省略");
}
