//! Format registry for sheet format discovery and selection
//!
//! Formats are registered by name and found again by name or by file extension.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::SheetError;
use crate::format::{ReadOptions, Sheet, SheetFormat, Workbook};

/// Registry of sheet formats
///
/// # Examples
///
/// ```ignore
/// let registry = SheetFormatRegistry::default();
/// let name = registry.detect_format_from_filename("spec.xlsx").unwrap();
/// let workbook = registry.read(Path::new("spec.xlsx"), &name, &ReadOptions::default())?;
/// ```
pub struct SheetFormatRegistry {
    formats: HashMap<String, Box<dyn SheetFormat>>,
}

impl SheetFormatRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        SheetFormatRegistry {
            formats: HashMap::new(),
        }
    }

    /// Register a format
    ///
    /// If a format with the same name already exists, it will be replaced.
    pub fn register<F: SheetFormat + 'static>(&mut self, format: F) {
        self.formats
            .insert(format.name().to_string(), Box::new(format));
    }

    /// Get a format by name
    pub fn get(&self, name: &str) -> Result<&dyn SheetFormat, SheetError> {
        self.formats
            .get(name)
            .map(|f| f.as_ref())
            .ok_or_else(|| SheetError::FormatNotFound(name.to_string()))
    }

    /// List all available format names (sorted)
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formats.keys().cloned().collect();
        names.sort();
        names
    }

    /// Detect format from filename based on file extension (case-insensitive)
    pub fn detect_format_from_filename(&self, filename: &str) -> Option<String> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())?
            .to_ascii_lowercase();

        self.formats
            .values()
            .find(|format| format.file_extensions().contains(&extension.as_str()))
            .map(|format| format.name().to_string())
    }

    /// Read a file using the specified format
    pub fn read(
        &self,
        path: &Path,
        format: &str,
        options: &ReadOptions,
    ) -> Result<Workbook, SheetError> {
        let fmt = self.get(format)?;
        if !fmt.supports_reading() {
            return Err(SheetError::NotSupported(format!(
                "Format '{format}' does not support reading"
            )));
        }
        fmt.read(path, options)
    }

    /// Write a sheet using the specified format
    pub fn write(&self, sheet: &Sheet, dir: &Path, format: &str) -> Result<PathBuf, SheetError> {
        let fmt = self.get(format)?;
        if !fmt.supports_writing() {
            return Err(SheetError::NotSupported(format!(
                "Format '{format}' does not support writing"
            )));
        }
        fmt.write(sheet, dir)
    }

    /// Create a registry with default formats
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(crate::formats::csv::CsvFormat);
        #[cfg(feature = "workbook")]
        registry.register(crate::formats::workbook::WorkbookFormat);

        registry
    }
}

impl Default for SheetFormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
