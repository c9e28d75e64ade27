//! Format implementations
//!
//! The Markdown dialect lives in [`markdown`]; the other modules are sheet containers
//! implementing [`crate::format::SheetFormat`].

pub mod csv;
pub mod markdown;
#[cfg(feature = "workbook")]
pub mod workbook;

pub use self::csv::CsvFormat;
pub use markdown::MarkdownFormat;
#[cfg(feature = "workbook")]
pub use workbook::WorkbookFormat;
