//! Bidirectional conversion between Markdown test specifications and spreadsheets
//!
//!     This crate converts manual test case specifications written in a small Markdown dialect
//!     into spreadsheet grids, and generates that Markdown back from spreadsheet files.
//!
//!     This is a pure lib, that is, it powers the testspec cli but is shell agnostic: no code
//!     here prints, reads env vars or exits the process. Diagnostics come back as values, fatal
//!     ones as [`TranscodeError`] and the rest as [`Warning`]s next to the output.
//!
//! Architecture
//!
//!     The Markdown dialect is line oriented, so there is no document tree. A parse produces a
//!     flat row table (./ir/nodes.rs) with one row per viewpoint or test item, and that table is
//!     laid out on a grid of string cells (./common/grid.rs). Sheet formats only move grids in
//!     and out of files, the generator reads grids back into Markdown.
//!
//!     Every marker of the dialect comes from a [`Grammar`], compiled once from a
//!     serde-friendly [`GrammarSpec`] so that configuration can replace any of them.
//!
//!     The file structure :
//!     .
//!     ├── error.rs                # TranscodeError, Warning and friends
//!     ├── grammar.rs              # Marker configuration and its compiled form
//!     ├── format.rs               # SheetFormat trait
//!     ├── registry.rs             # SheetFormatRegistry for discovery and selection
//!     ├── batch.rs                # Multi-file drivers
//!     ├── formats
//!     │   ├── markdown            # parser.rs, serializer.rs, renumber.rs, layout.rs
//!     │   ├── csv
//!     │   └── workbook            # xlsx/xlsm/xls/ods reading (feature "workbook")
//!     ├── ir                      # Row table and item counters
//!     └── common                  # Grid rendering
//!
//! Testing
//!     tests
//!     ├── lib.rs
//!     ├── markdown
//!     │   └── <testname>.rs
//!     └── fixtures
//!         └── <docname>.md
//!
//!     Note that rust does not by default discover tests in subdirectories, so we need to include these
//!     in the mod.
//!
//! Lossiness
//!
//!     Markdown → sheet → Markdown is not an identity. Step numbers are normalized, captions and
//!     separators are regenerated, and only the first test environment is written back. See
//!     ./formats/markdown/mod.rs for the full list.
//!
pub mod batch;
pub mod error;
pub mod format;
pub mod formats;
pub mod grammar;
pub mod registry;

pub mod common;
pub mod ir;

pub use batch::{markdown_to_sheets, sheets_to_markdown, BatchOutput, FileWarning, MarkdownFile};
pub use common::grid::{render_grid, Grid, SheetLayout};
pub use error::{BatchError, GrammarError, SheetError, TranscodeError, Warning, WarningKind};
pub use format::{ReadOptions, Sheet, SheetFormat, Workbook};
pub use formats::markdown::{parse_test_spec, serialize_test_sheet, MarkdownFormat, SheetContext};
pub use grammar::{Grammar, GrammarSpec};
pub use ir::nodes::{ColumnKey, Row, TestSpec, Transcoded};
pub use registry::SheetFormatRegistry;
