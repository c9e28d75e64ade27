//! Sheet format trait definition
//!
//! This module defines the SheetFormat trait that spreadsheet-like containers implement.
//! A sheet format moves [`Grid`]s between files and memory; it knows nothing about the
//! Markdown dialect.

use std::path::{Path, PathBuf};

use crate::common::grid::Grid;
use crate::error::SheetError;

/// One named page of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub grid: Grid,
}

/// The data sheets of a file, in file order, plus the category if the file records one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
    pub category: Option<String>,
}

/// Which sheets are administrative and where the category lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    /// Sheets skipped entirely
    pub ignored_sheets: Vec<String>,
    /// Sheet whose A1 cell holds the product category; never converted itself
    pub cover_sheet: String,
}

impl Default for ReadOptions {
    fn default() -> Self {
        ReadOptions {
            ignored_sheets: vec![
                "レビュー記録".to_string(),
                "消化率".to_string(),
                "マクロ起動".to_string(),
            ],
            cover_sheet: "表紙".to_string(),
        }
    }
}

impl ReadOptions {
    pub fn is_data_sheet(&self, name: &str) -> bool {
        name != self.cover_sheet && !self.ignored_sheets.iter().any(|ignored| ignored == name)
    }
}

/// Trait for sheet containers
///
/// Formats can support reading, writing, or both.
///
/// # Examples
///
/// ```ignore
/// struct TsvFormat;
///
/// impl SheetFormat for TsvFormat {
///     fn name(&self) -> &str {
///         "tsv"
///     }
///
///     fn file_extensions(&self) -> &[&str] {
///         &["tsv"]
///     }
///
///     fn supports_reading(&self) -> bool {
///         true
///     }
///
///     fn read(&self, path: &Path, options: &ReadOptions) -> Result<Workbook, SheetError> {
///         todo!()
///     }
/// }
/// ```
pub trait SheetFormat: Send + Sync {
    /// The name of this format (e.g., "csv", "workbook")
    fn name(&self) -> &str;

    /// Optional description of this format
    fn description(&self) -> &str {
        ""
    }

    /// File extensions associated with this format, without the leading dot.
    fn file_extensions(&self) -> &[&str] {
        &[]
    }

    fn supports_reading(&self) -> bool {
        false
    }

    fn supports_writing(&self) -> bool {
        false
    }

    /// Read the data sheets of a file.
    ///
    /// Default implementation returns NotSupported error.
    fn read(&self, _path: &Path, _options: &ReadOptions) -> Result<Workbook, SheetError> {
        Err(SheetError::NotSupported(format!(
            "Format '{}' does not support reading",
            self.name()
        )))
    }

    /// Write one sheet into `dir`, returning the path of the created file.
    ///
    /// Default implementation returns NotSupported error.
    fn write(&self, _sheet: &Sheet, _dir: &Path) -> Result<PathBuf, SheetError> {
        Err(SheetError::NotSupported(format!(
            "Format '{}' does not support writing",
            self.name()
        )))
    }

    /// Path `write` would create for `sheet` in `dir`.
    fn output_path(&self, sheet: &Sheet, dir: &Path) -> PathBuf {
        let extension = self.file_extensions().first().copied().unwrap_or("txt");
        dir.join(format!("{}.{extension}", sheet.name))
    }
}
