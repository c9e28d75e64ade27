//! Row table ⇄ sheet grid mapping.
//!
//! A grid is a row-major matrix of string cells, blank cells as empty strings. Sheet
//! formats read and write grids; this module lays a parsed [`TestSpec`] out on one.
//!
//! Layout of a rendered sheet (0-based rows):
//!
//!     0 .. n            summary lines, in the summary column
//!     header - 1        test environment names, above their intention columns
//!     header            column names from column A, then one intention label per environment
//!     header + 1 ..     one row per viewpoint or test item
//!
//! where `header = max(n, min_offset_rows) + 1`, so the table never starts above the
//! minimum offset however short the summary is.

use crate::grammar::Grammar;
use crate::ir::nodes::{ColumnKey, TestSpec};

pub type Grid = Vec<Vec<String>>;

/// Where the summary goes and how far down the table starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetLayout {
    pub summary_column: usize,
    pub min_offset_rows: usize,
}

impl Default for SheetLayout {
    fn default() -> Self {
        SheetLayout {
            summary_column: 4,
            min_offset_rows: 3,
        }
    }
}

/// Cell text at `column`, empty when the row is shorter.
pub fn cell(row: &[String], column: usize) -> &str {
    row.get(column).map_or("", String::as_str)
}

/// Spreadsheet column name for a zero-based index: 0 → A, 25 → Z, 26 → AA.
pub fn column_name(index: usize) -> String {
    let mut name = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        name.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }
    name.iter().rev().collect()
}

const TABLE_COLUMNS: [ColumnKey; 12] = [
    ColumnKey::Level(1),
    ColumnKey::Level(2),
    ColumnKey::Level(3),
    ColumnKey::Level(4),
    ColumnKey::Level(5),
    ColumnKey::Level(6),
    ColumnKey::Number,
    ColumnKey::Environment,
    ColumnKey::Precondition,
    ColumnKey::Steps,
    ColumnKey::Expected,
    ColumnKey::Notes,
];

/// Lay a parsed specification out on a grid.
pub fn render_grid(spec: &TestSpec, grammar: &Grammar, layout: &SheetLayout) -> Grid {
    let environments = spec.environments.len();
    let width = (TABLE_COLUMNS.len() + environments).max(layout.summary_column + 1);
    let header_row = spec.summary.len().max(layout.min_offset_rows) + 1;

    let mut grid = vec![vec![String::new(); width]; header_row + 1 + spec.rows.len()];

    for (r, line) in spec.summary.iter().enumerate() {
        grid[r][layout.summary_column].clone_from(line);
    }

    let frame = &mut grid[header_row - 1];
    for (idx, name) in spec.environments.iter().enumerate() {
        frame[ColumnKey::TestIntention(idx).offset()].clone_from(name);
    }

    let header = &mut grid[header_row];
    for (c, name) in grammar.columns().header().iter().enumerate() {
        header[c] = name.to_string();
    }
    let label = &grammar.spec().col_name_res_area.test_intention;
    for idx in 0..environments {
        header[ColumnKey::TestIntention(idx).offset()].clone_from(label);
    }

    for (row, out) in spec.rows.iter().zip(&mut grid[header_row + 1..]) {
        for key in TABLE_COLUMNS {
            out[key.offset()] = row.get(key).to_string();
        }
        for idx in 0..environments {
            let key = ColumnKey::TestIntention(idx);
            out[key.offset()] = row.get(key).to_string();
        }
    }

    grid
}
