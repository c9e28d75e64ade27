//! Markdown format implementation
//!
//! This module implements bidirectional conversion between the Markdown test
//! specification dialect and the row table / sheet grid.
//!
//! # Document Layout
//!
//! ~~~text
//! free memo text            ignored
//! Category                  line before the title: product category
//! ===                       title; its length is the sheet position on export
//! summary text              free text until the first viewpoint
//! ```                       test environment frame
//! Windows                   one environment name per line
//! ```
//! # Viewpoint               # to ######: viewpoint levels 1-6
//! > 環境                     captions are decorative
//! + environment             bullet lists per field
//! * precondition
//! 1. step                   every step may be written as "1."
//!     1. nested step        4 spaces per nesting level
//! - expected result
//! - [x] Windows             notes; a ticked box omits the item for an environment
//! ---
//! ######                    bare level 6 marker: next test item
//! ~~~
//!
//! # Element Mapping Table
//!
//! | Markdown                | Cell content              | Export Notes                       |
//! |-------------------------|---------------------------|------------------------------------|
//! | `# ` .. `###### ` text  | level counter + text      | marker for the level + text        |
//! | `+ ` / `* ` / `- ` item | `・item`                  | field marker                       |
//! | `1. ` step              | sequential `N. step`      | always written back as `1. `       |
//! | nested item (4n spaces) | 2n spaces + item          | 4n spaces + nested marker          |
//! | trailing two spaces     | next line joins the cell  | two spaces appended to line before |
//! | `- [x] NAME`            | intention "omission"      | first environment only             |
//!
//! # Lossy Conversions
//!
//! - Explicit step numbers are normalized on import and replaced by `1. ` on export.
//! - Only the first test environment survives export (frame name and omission checkbox).
//! - Caption and separator lines are regenerated, not preserved.
//! - Blank bullets (`+ ` with nothing after it) are dropped on import.

pub mod layout;
pub mod parser;
pub mod renumber;
pub mod serializer;

pub use parser::parse_test_spec;
pub use serializer::{serialize_test_sheet, SheetContext};

use crate::error::TranscodeError;
use crate::grammar::Grammar;
use crate::ir::nodes::{TestSpec, Transcoded};

/// Markdown dialect bound to a compiled grammar.
#[derive(Debug, Clone, Default)]
pub struct MarkdownFormat {
    grammar: Grammar,
}

impl MarkdownFormat {
    pub fn new(grammar: Grammar) -> Self {
        MarkdownFormat { grammar }
    }

    pub fn file_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    pub fn parse(
        &self,
        source: &str,
        sheet_name: &str,
    ) -> Result<Transcoded<TestSpec>, TranscodeError> {
        parse_test_spec(source, sheet_name, &self.grammar)
    }
}
