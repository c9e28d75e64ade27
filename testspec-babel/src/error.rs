//! Error and warning types for transcoding operations
//!
//! Fatal conditions abort the current file and are reported through
//! [`TranscodeError`]. Everything else is collected as a [`Warning`] and
//! returned next to the successful output.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Characters that a sheet name may not contain (ASCII and full-width forms).
pub const INVALID_SHEET_NAME_CHARS: &[char] = &[
    ':', '\\', '/', '?', '*', '[', ']', '：', '￥', '／', '？', '＊', '［', '］',
];

/// Longest sheet name a workbook accepts, in characters.
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Zero-based spreadsheet cell coordinate, displayed in A1 notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellAddress {
    pub row: usize,
    pub column: usize,
}

impl CellAddress {
    pub fn new(row: usize, column: usize) -> Self {
        CellAddress { row, column }
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            crate::common::grid::column_name(self.column),
            self.row + 1
        )
    }
}

/// Where a diagnostic was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Position {
    /// One-based Markdown line number
    Line { line: usize },
    /// After the last line of a Markdown document
    EndOfDocument,
    /// Spreadsheet cell
    Cell { cell: CellAddress },
}

impl Position {
    pub fn line(line: usize) -> Self {
        Position::Line { line }
    }

    pub fn cell(row: usize, column: usize) -> Self {
        Position::Cell {
            cell: CellAddress::new(row, column),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Line { line } => write!(f, "line {line}"),
            Position::EndOfDocument => write!(f, "end of document"),
            Position::Cell { cell } => write!(f, "cell {cell}"),
        }
    }
}

/// Non-fatal diagnostic categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A line inside the test item region matched no known construct
    UnrecognizedLine,
    /// A viewpoint heading is two or more levels deeper than the previous one
    ViewpointLevelSkipped,
    /// A spreadsheet cell holds content where none is expected
    UnexpectedCell,
}

/// A non-fatal diagnostic collected during transcoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub position: Position,
    pub text: String,
}

impl Warning {
    pub fn new(kind: WarningKind, position: Position, text: impl Into<String>) -> Self {
        Warning {
            kind,
            position,
            text: text.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            WarningKind::UnrecognizedLine => "unrecognized line",
            WarningKind::ViewpointLevelSkipped => "viewpoint level skipped",
            WarningKind::UnexpectedCell => "unexpected cell content",
        };
        write!(f, "{}: {what}: {}", self.position, self.text)
    }
}

/// Fatal errors that abort transcoding of the current file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscodeError {
    #[error("invalid sheet name '{name}': must be 1-31 characters without : \\ / ? * [ ]")]
    InvalidSheetName { name: String },

    #[error("no title line found")]
    MissingTitle,

    #[error("{position}: test environment frame is not closed or declares duplicate names")]
    UnclosedEnvironmentFrame { position: Position },

    #[error("{position}: the preceding test item is missing its steps or expected results")]
    InconsistentItem { position: Position },

    #[error("header row ({expected}) not found")]
    HeaderNotFound { expected: String },

    #[error("row {row}: neither a viewpoint level nor an item number is set")]
    MissingViewpoint { row: usize },

    #[error("cell {cell}: mandatory cell is empty")]
    EmptyMandatoryCell { cell: CellAddress },

    #[error("cell {cell}: continuation line has no list item to attach to: {text}")]
    OrphanContinuation { cell: CellAddress, text: String },
}

/// Errors raised while compiling a configured grammar.
#[derive(Debug, Clone, Error)]
pub enum GrammarError {
    #[error("invalid pattern for {field}: {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    #[error(
        "nested_list_indent_lv has {indents} entries but {patterns} nesting levels are configured"
    )]
    IndentTableTooShort { indents: usize, patterns: usize },
}

/// Errors raised by sheet formats while reading or writing files.
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("format '{0}' not found")]
    FormatNotFound(String),

    #[error("operation not supported: {0}")]
    NotSupported(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("spreadsheet error: {0}")]
    Workbook(String),
}

#[cfg(feature = "workbook")]
impl From<calamine::Error> for SheetError {
    fn from(err: calamine::Error) -> Self {
        SheetError::Workbook(err.to_string())
    }
}

/// A failure tied to the input file that caused it.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("{path}: {source}")]
    Transcode {
        path: String,
        #[source]
        source: TranscodeError,
    },

    #[error("{path}: {source}")]
    Sheet {
        path: String,
        #[source]
        source: SheetError,
    },
}
