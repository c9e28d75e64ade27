//! CSV sheet format
//!
//! One CSV file holds exactly one sheet, named after the file stem. Cells may contain
//! newlines; the `csv` crate quotes them on write and restores them on read. Rows may have
//! different lengths, short rows read as if padded with blank cells.
//!
//! A directory of CSV files stands in for a workbook: the cover sheet is the sibling file
//! named after it, and its A1 cell holds the category for every sheet next to it.

use std::path::{Path, PathBuf};

use crate::common::grid::Grid;
use crate::error::SheetError;
use crate::format::{ReadOptions, Sheet, SheetFormat, Workbook};

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvFormat;

impl CsvFormat {
    pub fn read_grid(path: &Path) -> Result<Grid, SheetError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;

        let mut grid = Grid::new();
        for record in reader.records() {
            grid.push(record?.iter().map(str::to_string).collect());
        }
        Ok(grid)
    }
}

impl SheetFormat for CsvFormat {
    fn name(&self) -> &str {
        "csv"
    }

    fn description(&self) -> &str {
        "Comma-separated values, one sheet per file"
    }

    fn file_extensions(&self) -> &[&str] {
        &["csv"]
    }

    fn supports_reading(&self) -> bool {
        true
    }

    fn supports_writing(&self) -> bool {
        true
    }

    fn read(&self, path: &Path, options: &ReadOptions) -> Result<Workbook, SheetError> {
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
            .to_string();
        let cover = path.with_file_name(format!("{}.csv", options.cover_sheet));
        let category = if cover.is_file() {
            Self::read_grid(&cover)?
                .into_iter()
                .next()
                .and_then(|row| row.into_iter().next())
                .filter(|category| !category.is_empty())
        } else {
            None
        };

        if !options.is_data_sheet(&name) {
            tracing::debug!(sheet = %name, "skipping administrative sheet");
            return Ok(Workbook {
                sheets: Vec::new(),
                category,
            });
        }

        let grid = Self::read_grid(path)?;
        tracing::debug!(path = %path.display(), rows = grid.len(), "read csv sheet");

        Ok(Workbook {
            sheets: vec![Sheet { name, grid }],
            category,
        })
    }

    fn write(&self, sheet: &Sheet, dir: &Path) -> Result<PathBuf, SheetError> {
        let path = self.output_path(sheet, dir);
        let mut writer = csv::WriterBuilder::new().flexible(true).from_path(&path)?;
        for row in &sheet.grid {
            writer.write_record(row)?;
        }
        writer.flush()?;
        tracing::debug!(path = %path.display(), rows = sheet.grid.len(), "wrote csv sheet");
        Ok(path)
    }
}
