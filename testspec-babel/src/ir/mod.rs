//! Intermediate Representation (IR) for test specifications.
//!
//! The IR is the row table both directions meet at: the Markdown parser produces it, the
//! grid renderer lays it out on a sheet, and the inspect command dumps it as JSON.

pub mod counter;
pub mod nodes;
