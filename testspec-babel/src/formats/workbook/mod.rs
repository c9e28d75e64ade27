//! Spreadsheet workbook format (xlsx, xlsm, xlsb, xls, ods), read only.
//!
//! Every worksheet that is neither ignored nor the cover sheet becomes a [`Sheet`]. Cell
//! coordinates are kept absolute: calamine trims leading empty rows and columns from a
//! range, so the range start is added back when the grid is built.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};

use crate::common::grid::Grid;
use crate::error::SheetError;
use crate::format::{ReadOptions, Sheet, SheetFormat, Workbook};

#[derive(Debug, Clone, Copy, Default)]
pub struct WorkbookFormat;

/// Text of a cell as a user would see it.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::Error(e) => format!("#ERR:{e:?}"),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

fn range_to_grid(range: &Range<Data>) -> Grid {
    let Some((row0, col0)) = range.start() else {
        return Grid::new();
    };
    let (row0, col0) = (row0 as usize, col0 as usize);
    let (height, width) = range.get_size();

    let mut grid = vec![vec![String::new(); col0 + width]; row0 + height];
    for (r, c, cell) in range.used_cells() {
        grid[row0 + r][col0 + c] = cell_text(cell);
    }
    grid
}

impl SheetFormat for WorkbookFormat {
    fn name(&self) -> &str {
        "workbook"
    }

    fn description(&self) -> &str {
        "Spreadsheet workbooks read through calamine"
    }

    fn file_extensions(&self) -> &[&str] {
        &["xlsx", "xlsm", "xlsb", "xls", "ods"]
    }

    fn supports_reading(&self) -> bool {
        true
    }

    fn read(&self, path: &Path, options: &ReadOptions) -> Result<Workbook, SheetError> {
        let mut workbook = open_workbook_auto(path)?;
        let mut result = Workbook::default();

        for name in workbook.sheet_names() {
            if name == options.cover_sheet {
                let range = workbook.worksheet_range(&name)?;
                result.category = range
                    .get_value((0, 0))
                    .map(cell_text)
                    .filter(|category| !category.is_empty());
                continue;
            }
            if !options.is_data_sheet(&name) {
                tracing::debug!(sheet = %name, "skipping administrative sheet");
                continue;
            }
            let range = workbook.worksheet_range(&name)?;
            result.sheets.push(Sheet {
                grid: range_to_grid(&range),
                name,
            });
        }

        tracing::debug!(
            path = %path.display(),
            sheets = result.sheets.len(),
            "read workbook"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Float(1.0)), "1");
        assert_eq!(cell_text(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::String("番号".into())), "番号");
    }

    #[test]
    fn test_range_keeps_absolute_positions() {
        let mut range = Range::new((2, 1), (3, 2));
        range.set_value((2, 1), Data::String("top".into()));
        range.set_value((3, 2), Data::Float(3.0));

        let grid = range_to_grid(&range);
        assert_eq!(grid.len(), 4);
        assert_eq!(grid[2][1], "top");
        assert_eq!(grid[3][2], "3");
        assert_eq!(grid[0][0], "");
    }

    #[test]
    fn test_empty_range() {
        let range: Range<Data> = Range::empty();
        assert!(range_to_grid(&range).is_empty());
    }

    #[test]
    fn test_missing_workbook() {
        let err = WorkbookFormat
            .read(Path::new("/nonexistent/book.xlsx"), &ReadOptions::default())
            .unwrap_err();
        assert!(matches!(err, SheetError::Workbook(_)));
    }
}
