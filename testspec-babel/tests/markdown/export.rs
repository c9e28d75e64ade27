//! Export tests for Markdown format (sheet grid → Markdown)

use crate::common::{quoted, read_fixture};
use insta::assert_snapshot;
use testspec_babel::common::grid::{render_grid, Grid, SheetLayout};
use testspec_babel::error::{CellAddress, Position, TranscodeError, WarningKind};
use testspec_babel::formats::markdown::serializer::serialize_to_lines;
use testspec_babel::grammar::Grammar;
use testspec_babel::{parse_test_spec, serialize_test_sheet, SheetContext};

const CONTEXT: SheetContext<'static> = SheetContext {
    name: "sheet",
    position: 1,
    category: "製品A",
};

fn fixture_grid(name: &str) -> Grid {
    let grammar = Grammar::default();
    let spec = parse_test_spec(&read_fixture(name), "sheet", &grammar)
        .unwrap()
        .output;
    render_grid(&spec, &grammar, &SheetLayout::default())
}

const HEADER: [&str; 13] = [
    "1", "2", "3", "4", "5", "6", "番号", "環境", "準備", "手順", "確認", "備考", "実施判定",
];

fn header() -> Vec<String> {
    HEADER.iter().map(|s| s.to_string()).collect()
}

fn row(cells: &[(usize, &str)]) -> Vec<String> {
    let mut row = vec![String::new(); 13];
    for (c, text) in cells {
        row[*c] = text.to_string();
    }
    row
}

/// Minimal hand-made sheet: header at row 1, frame row 0.
fn grid_with(body: Vec<Vec<String>>) -> Grid {
    let mut grid = vec![row(&[(12, "Linux")]), header()];
    grid.extend(body);
    grid
}

#[test]
fn test_kitchensink_export() {
    let grid = fixture_grid("kitchensink.md");
    let generated = serialize_to_lines(&grid, &Grammar::default(), &CONTEXT).unwrap();
    assert!(generated.warnings.is_empty());

    assert_snapshot!(quoted(&generated.output), @r#######"
    "製品A"
    "="
    "ログイン機能の試験仕様"
    ""
    "```"
    "Windows"
    "```"
    ""
    "# ログイン"
    "## 正常系"
    "> 環境"
    "+ ブラウザ"
    "> 準備"
    "* ユーザー登録済み"
    "> 手順"
    "1. ログイン画面を開く"
    "1. IDを入力する"
    "    1. 全角"
    "    1. 半角"
    "1. ログインする"
    "> 確認"
    "- トップ画面に遷移する"
    "    - ヘッダーに名前  "
    "    長い説明"
    "> 備考"
    "- [ ] Windows"
    "- [ ] macOS"
    "---"
    ""
    "###### "
    "> 環境"
    "+ "
    "> 準備"
    "* "
    "> 手順"
    "1. ログアウトする"
    "> 確認"
    "- ログイン画面に戻る"
    "> 備考"
    "- [x] Windows"
    "---"
    ""
    "## 異常系"
    "> 環境"
    "+ "
    "> 準備"
    "* "
    "> 手順"
    "1. 誤ったパスワード"
    "> 確認"
    "- エラー表示"
    "> 備考"
    "- [ ] "
    "---"
    ""
    "#######);
}

#[test]
fn test_title_repeats_sheet_position() {
    let grid = fixture_grid("settings.md");
    let context = SheetContext {
        position: 3,
        ..CONTEXT
    };
    let text = serialize_test_sheet(&grid, &Grammar::default(), &context)
        .unwrap()
        .output;
    assert!(text.starts_with("製品A\n===\n"));
    assert!(text.ends_with("---\n\n"));
}

#[test]
fn test_grid_without_header_is_fatal() {
    let grid = vec![row(&[(0, "just text")])];
    let err = serialize_test_sheet(&grid, &Grammar::default(), &CONTEXT).unwrap_err();
    assert!(matches!(err, TranscodeError::HeaderNotFound { .. }));
}

#[test]
fn test_empty_mandatory_cell_is_fatal() {
    let grid = grid_with(vec![
        row(&[(0, "1"), (7, "V")]),
        row(&[(6, "1"), (9, "1. go"), (12, "実施")]),
    ]);
    let err = serialize_test_sheet(&grid, &Grammar::default(), &CONTEXT).unwrap_err();
    assert_eq!(
        err,
        TranscodeError::EmptyMandatoryCell {
            cell: CellAddress::new(3, 10)
        }
    );
}

#[test]
fn test_missing_intention_is_fatal() {
    let grid = grid_with(vec![row(&[(6, "1"), (9, "1. go"), (10, "・ok")])]);
    let err = serialize_test_sheet(&grid, &Grammar::default(), &CONTEXT).unwrap_err();
    assert_eq!(err.to_string(), "cell M3: mandatory cell is empty");
}

#[test]
fn test_row_without_viewpoint_or_number_is_fatal() {
    let grid = grid_with(vec![row(&[(9, "1. go")])]);
    let err = serialize_test_sheet(&grid, &Grammar::default(), &CONTEXT).unwrap_err();
    assert_eq!(err, TranscodeError::MissingViewpoint { row: 3 });
}

#[test]
fn test_orphan_continuation_is_fatal() {
    let grid = grid_with(vec![row(&[
        (6, "1"),
        (9, "no marker here"),
        (10, "・ok"),
        (12, "実施"),
    ])]);
    let err = serialize_test_sheet(&grid, &Grammar::default(), &CONTEXT).unwrap_err();
    assert!(matches!(
        err,
        TranscodeError::OrphanContinuation { text, .. } if text == "no marker here"
    ));
}

#[test]
fn test_summary_row_with_two_cells_warns_once() {
    let mut grid = grid_with(vec![row(&[(0, "1"), (7, "V")])]);
    grid.insert(0, row(&[(4, "first"), (6, "second")]));

    let generated = serialize_to_lines(&grid, &Grammar::default(), &CONTEXT).unwrap();
    assert_eq!(generated.output[2], "first");
    assert_eq!(generated.warnings.len(), 1);
    assert_eq!(generated.warnings[0].kind, WarningKind::UnexpectedCell);
    assert_eq!(generated.warnings[0].position, Position::cell(0, 6));
    assert_eq!(generated.warnings[0].text, "second");
}

#[test]
fn test_stray_cells_in_table_rows_warn() {
    let grid = grid_with(vec![
        row(&[(0, "1"), (7, "V"), (9, "1. early")]),
        row(&[
            (0, "x"),
            (6, "1"),
            (9, "1. go"),
            (10, "・ok"),
            (12, "実施"),
        ]),
    ]);

    let generated = serialize_to_lines(&grid, &Grammar::default(), &CONTEXT).unwrap();
    let found: Vec<_> = generated
        .warnings
        .iter()
        .map(|w| (w.kind, w.position, w.text.as_str()))
        .collect();
    assert_eq!(
        found,
        vec![
            (WarningKind::UnexpectedCell, Position::cell(2, 9), "1. early"),
            (WarningKind::UnexpectedCell, Position::cell(3, 0), "x"),
        ]
    );
    assert!(generated.output.contains(&"# V".to_string()));
    assert!(generated.output.contains(&"1. go".to_string()));
}

#[test]
fn test_stray_cell_in_frame_row_warns() {
    let mut grid = grid_with(vec![row(&[(0, "1"), (7, "V")])]);
    grid[0][3] = "memo".to_string();

    let generated = serialize_to_lines(&grid, &Grammar::default(), &CONTEXT).unwrap();
    assert_eq!(generated.warnings.len(), 1);
    assert_eq!(generated.warnings[0].kind, WarningKind::UnexpectedCell);
    assert_eq!(generated.warnings[0].position, Position::cell(0, 3));
    assert_eq!(generated.warnings[0].text, "memo");
    assert!(generated.output.contains(&"Linux".to_string()));
}

#[test]
fn test_omitted_item_ticks_every_checkbox() {
    let grid = grid_with(vec![
        row(&[(0, "1"), (7, "V")]),
        row(&[
            (6, "1"),
            (9, "1. go"),
            (10, "・ok"),
            (11, "・Linux\n・note"),
            (12, "省略"),
        ]),
    ]);
    let generated = serialize_to_lines(&grid, &Grammar::default(), &CONTEXT).unwrap();
    let notes: Vec<_> = generated
        .output
        .iter()
        .filter(|line| line.starts_with("- ["))
        .cloned()
        .collect();
    assert_eq!(notes, vec!["- [x] Linux", "- [x] note"]);
}
