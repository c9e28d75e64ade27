//! Markdown format tests
//!
//! Tests for Markdown → sheet grid (import), sheet grid → Markdown (export) and the
//! trip through both, including a CSV file in between.

mod export;
mod import;
mod roundtrip;
