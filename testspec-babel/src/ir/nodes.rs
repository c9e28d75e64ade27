//! Core data structures for the row table.

use std::fmt;

use serde::Serialize;

use crate::error::Warning;

/// Identifies a column of the test table, and doubles as the kind of a row.
///
/// A viewpoint row carries `Level(1..=6)`, a test item row carries `Number`. The content
/// fields are also used to tag which field Markdown text is currently flowing into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(into = "String")]
pub enum ColumnKey {
    Level(u8),
    #[default]
    Number,
    Environment,
    Precondition,
    Steps,
    Expected,
    Notes,
    /// Zero-based test environment index
    TestIntention(usize),
}

impl ColumnKey {
    /// Fields that hold list content, in the order they appear in a row.
    pub const CONTENT_FIELDS: [ColumnKey; 5] = [
        ColumnKey::Environment,
        ColumnKey::Precondition,
        ColumnKey::Steps,
        ColumnKey::Expected,
        ColumnKey::Notes,
    ];

    /// Offset of this column from the first viewpoint level column.
    pub fn offset(self) -> usize {
        match self {
            ColumnKey::Level(level) => usize::from(level.clamp(1, 6)) - 1,
            ColumnKey::Number => 6,
            ColumnKey::Environment => 7,
            ColumnKey::Precondition => 8,
            ColumnKey::Steps => 9,
            ColumnKey::Expected => 10,
            ColumnKey::Notes => 11,
            ColumnKey::TestIntention(idx) => 12 + idx,
        }
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKey::Level(level) => write!(f, "lv{level}"),
            ColumnKey::Number => write!(f, "number"),
            ColumnKey::Environment => write!(f, "environment"),
            ColumnKey::Precondition => write!(f, "precondition"),
            ColumnKey::Steps => write!(f, "steps"),
            ColumnKey::Expected => write!(f, "expected"),
            ColumnKey::Notes => write!(f, "notes"),
            ColumnKey::TestIntention(idx) => write!(f, "test_intention_{}", idx + 1),
        }
    }
}

impl From<ColumnKey> for String {
    fn from(key: ColumnKey) -> Self {
        key.to_string()
    }
}

/// Outcome of checking a pending test item before it is flushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completeness {
    /// Steps and expected results are both present
    Complete,
    /// No content at all; nothing to flush
    Empty,
    /// Some content, but steps or expected results are missing
    Inconsistent,
}

/// One row of the test table: either a viewpoint heading or a test item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Row {
    pub mark: ColumnKey,
    pub levels: [String; 6],
    pub number: String,
    pub environment: String,
    pub precondition: String,
    pub steps: String,
    pub expected: String,
    pub notes: String,
    pub intentions: Vec<String>,
}

impl Row {
    /// An empty row with one (empty) intention cell per test environment.
    pub fn with_intentions(count: usize) -> Self {
        Row {
            intentions: vec![String::new(); count],
            ..Row::default()
        }
    }

    pub fn is_viewpoint(&self) -> bool {
        matches!(self.mark, ColumnKey::Level(_))
    }

    pub fn get(&self, key: ColumnKey) -> &str {
        match key {
            ColumnKey::Level(level @ 1..=6) => &self.levels[usize::from(level) - 1],
            ColumnKey::Level(_) => "",
            ColumnKey::Number => &self.number,
            ColumnKey::Environment => &self.environment,
            ColumnKey::Precondition => &self.precondition,
            ColumnKey::Steps => &self.steps,
            ColumnKey::Expected => &self.expected,
            ColumnKey::Notes => &self.notes,
            ColumnKey::TestIntention(idx) => self.intentions.get(idx).map_or("", String::as_str),
        }
    }

    /// Mutable access to a cell. Intention cells outside the materialized range are `None`.
    pub fn field_mut(&mut self, key: ColumnKey) -> Option<&mut String> {
        match key {
            ColumnKey::Level(level @ 1..=6) => Some(&mut self.levels[usize::from(level) - 1]),
            ColumnKey::Level(_) => None,
            ColumnKey::Number => Some(&mut self.number),
            ColumnKey::Environment => Some(&mut self.environment),
            ColumnKey::Precondition => Some(&mut self.precondition),
            ColumnKey::Steps => Some(&mut self.steps),
            ColumnKey::Expected => Some(&mut self.expected),
            ColumnKey::Notes => Some(&mut self.notes),
            ColumnKey::TestIntention(idx) => self.intentions.get_mut(idx),
        }
    }

    pub fn completeness(&self) -> Completeness {
        if !self.steps.is_empty() && !self.expected.is_empty() {
            Completeness::Complete
        } else if ColumnKey::CONTENT_FIELDS
            .iter()
            .all(|key| self.get(*key).is_empty())
        {
            Completeness::Empty
        } else {
            Completeness::Inconsistent
        }
    }
}

/// A parsed test specification document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TestSpec {
    /// Target sheet name, derived from the source file name
    pub sheet_name: String,
    /// Text of the line right before the title line
    pub category: String,
    /// Free-text summary lines between the title and the first viewpoint
    pub summary: Vec<String>,
    /// Declared test environment names, one intention column each
    pub environments: Vec<String>,
    pub rows: Vec<Row>,
}

/// A transcoding result together with the warnings raised while producing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transcoded<T> {
    pub output: T,
    pub warnings: Vec<Warning>,
}
