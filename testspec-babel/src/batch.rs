//! Multi-file conversion
//!
//! Runs the Markdown parser and the sheet serializer over many files. Every file is
//! converted with fresh state, the first fatal error stops the batch and names the file,
//! and warnings are collected per file so the caller can report them once at the end.
//!
//! Markdown inputs are put in sheet order first: the generator writes the title marker
//! once per sheet position, so sorting by marker count restores the workbook order.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::common::grid::{render_grid, SheetLayout};
use crate::error::{
    BatchError, SheetError, TranscodeError, Warning, INVALID_SHEET_NAME_CHARS, MAX_SHEET_NAME_LEN,
};
use crate::format::{ReadOptions, Sheet};
use crate::formats::markdown::{parse_test_spec, serialize_test_sheet, SheetContext};
use crate::grammar::Grammar;
use crate::registry::SheetFormatRegistry;

/// A generated Markdown document, not yet written anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownFile {
    /// `<sheet>.md`
    pub file_name: String,
    pub contents: String,
}

/// A warning together with the file (and sheet) it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileWarning {
    pub origin: String,
    pub warning: Warning,
}

impl fmt::Display for FileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.origin, self.warning)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutput<T> {
    pub outputs: Vec<T>,
    pub warnings: Vec<FileWarning>,
}

impl<T> Default for BatchOutput<T> {
    fn default() -> Self {
        BatchOutput {
            outputs: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl<T> BatchOutput<T> {
    fn collect(&mut self, origin: &str, warnings: Vec<Warning>) {
        self.warnings
            .extend(warnings.into_iter().map(|warning| FileWarning {
                origin: origin.to_string(),
                warning,
            }));
    }
}

/// Sheet name for a Markdown file: its stem, checked against workbook naming rules.
pub fn sheet_name_from_path(path: &Path) -> Result<String, TranscodeError> {
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    let length = name.chars().count();
    if length == 0 || length > MAX_SHEET_NAME_LEN || name.contains(INVALID_SHEET_NAME_CHARS) {
        return Err(TranscodeError::InvalidSheetName { name });
    }
    Ok(name)
}

/// Number of leading `marker` repetitions on the first line that starts with it.
pub fn title_marker_count(source: &str, marker: &str) -> Option<usize> {
    if marker.is_empty() {
        return None;
    }
    source
        .lines()
        .find(|line| line.starts_with(marker))
        .map(|line| {
            let mut rest = line;
            let mut count = 0;
            while let Some(tail) = rest.strip_prefix(marker) {
                rest = tail;
                count += 1;
            }
            count
        })
}

/// Sort `(path, source)` pairs by title marker count, then path.
///
/// When any source has no title line the input order is kept untouched.
pub fn order_by_sheet_position(files: &mut [(PathBuf, String)], marker: &str) {
    let counts: Option<Vec<usize>> = files
        .iter()
        .map(|(_, source)| title_marker_count(source, marker))
        .collect();
    if counts.is_none() {
        debug!("at least one file has no title line, keeping the given order");
        return;
    }
    files.sort_by_cached_key(|(path, source)| {
        (
            title_marker_count(source, marker).unwrap_or(0),
            path.clone(),
        )
    });
}

/// One-cell sheet recording the product category in A1.
pub fn cover_sheet(name: &str, category: &str) -> Sheet {
    Sheet {
        name: name.to_string(),
        grid: vec![vec![category.to_string()]],
    }
}

/// Parse Markdown files into sheets, in sheet order.
///
/// The first output is the cover sheet named `cover_sheet`, carrying the category of the
/// first document in sheet order; the data sheets follow.
pub fn markdown_to_sheets(
    paths: &[PathBuf],
    grammar: &Grammar,
    layout: &SheetLayout,
    cover_sheet_name: &str,
) -> Result<BatchOutput<Sheet>, BatchError> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let source = fs::read_to_string(path).map_err(|err| BatchError::Sheet {
            path: path.display().to_string(),
            source: SheetError::Io(err),
        })?;
        files.push((path.clone(), source));
    }
    order_by_sheet_position(&mut files, &grammar.write_marks().title);

    let mut batch = BatchOutput::default();
    for (path, source) in &files {
        let origin = path.display().to_string();
        let transcode_err = |source| BatchError::Transcode {
            path: origin.clone(),
            source,
        };

        let name = sheet_name_from_path(path).map_err(transcode_err)?;
        let parsed = parse_test_spec(source, &name, grammar).map_err(transcode_err)?;
        info!(
            file = %origin,
            rows = parsed.output.rows.len(),
            environments = parsed.output.environments.len(),
            "parsed test specification"
        );

        if batch.outputs.is_empty() {
            batch
                .outputs
                .push(cover_sheet(cover_sheet_name, &parsed.output.category));
        }
        batch.collect(&origin, parsed.warnings);
        batch.outputs.push(Sheet {
            grid: render_grid(&parsed.output, grammar, layout),
            name,
        });
    }
    Ok(batch)
}

/// Read sheet files and generate one Markdown document per data sheet.
///
/// The category is `category` when given, otherwise the one recorded in the file, otherwise
/// `default_category`.
pub fn sheets_to_markdown(
    paths: &[PathBuf],
    grammar: &Grammar,
    options: &ReadOptions,
    registry: &SheetFormatRegistry,
    category: Option<&str>,
    default_category: &str,
) -> Result<BatchOutput<MarkdownFile>, BatchError> {
    let mut batch = BatchOutput::default();
    for path in paths {
        let origin = path.display().to_string();
        let sheet_err = |source| BatchError::Sheet {
            path: origin.clone(),
            source,
        };

        let format = registry
            .detect_format_from_filename(&origin)
            .ok_or_else(|| sheet_err(SheetError::FormatNotFound(origin.clone())))?;
        let workbook = registry.read(path, &format, options).map_err(sheet_err)?;
        let file_category = category
            .or(workbook.category.as_deref())
            .unwrap_or(default_category);
        debug!(
            file = %origin,
            sheets = workbook.sheets.len(),
            category = file_category,
            "read workbook"
        );

        for (index, sheet) in workbook.sheets.iter().enumerate() {
            let sheet_origin = format!("{origin} [{}]", sheet.name);
            let context = SheetContext {
                name: &sheet.name,
                position: index + 1,
                category: file_category,
            };
            let generated = serialize_test_sheet(&sheet.grid, grammar, &context)
                .map_err(|source| BatchError::Transcode {
                    path: sheet_origin.clone(),
                    source,
                })?;
            info!(sheet = %sheet_origin, "generated markdown");

            batch.collect(&sheet_origin, generated.warnings);
            batch.outputs.push(MarkdownFile {
                file_name: format!("{}.md", sheet.name),
                contents: generated.output,
            });
        }
    }
    Ok(batch)
}
