//! Column layout of a test sheet
//!
//! A sheet does not put its table at fixed coordinates: the summary block above it has a
//! variable height and the table may be shifted right. The layout is found by looking for
//! the header row, the first row that carries the twelve configured column names in a
//! contiguous run. Every other position is derived from that match by fixed offsets.

use crate::common::grid::Grid;
use crate::error::TranscodeError;
use crate::grammar::Grammar;
use crate::ir::nodes::ColumnKey;

/// Row and column positions resolved from a grid's header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    header_row: usize,
    origin: usize,
    intention_columns: Vec<usize>,
}

impl ColumnLayout {
    /// Locates the header row in `grid`.
    ///
    /// The environment frame row sits directly above the header, so a header found on the
    /// very first row is rejected like a missing one.
    pub fn resolve(grid: &Grid, grammar: &Grammar) -> Result<Self, TranscodeError> {
        let header = grammar.columns().header();
        let label = &grammar.spec().col_name_res_area.test_intention;

        let found = grid.iter().enumerate().find_map(|(r, row)| {
            row.windows(header.len())
                .position(|window| {
                    window
                        .iter()
                        .zip(header.iter())
                        .all(|(cell, name)| cell.as_str() == *name)
                })
                .map(|origin| (r, origin, row))
        });

        match found {
            Some((header_row, origin, row)) if header_row > 0 => {
                let intention_columns = row
                    .iter()
                    .enumerate()
                    .filter(|(_, cell)| *cell == label)
                    .map(|(c, _)| c)
                    .collect();
                Ok(ColumnLayout {
                    header_row,
                    origin,
                    intention_columns,
                })
            }
            _ => Err(TranscodeError::HeaderNotFound {
                expected: header.join(", "),
            }),
        }
    }

    pub fn header_row(&self) -> usize {
        self.header_row
    }

    /// The row holding the test environment names.
    pub fn frame_row(&self) -> usize {
        self.header_row - 1
    }

    /// Column index of the first viewpoint level; nothing left of it is read.
    pub fn origin(&self) -> usize {
        self.origin
    }

    pub fn column(&self, key: ColumnKey) -> usize {
        self.origin + key.offset()
    }

    /// Columns labelled as test intention columns in the header row.
    pub fn intention_columns(&self) -> &[usize] {
        &self.intention_columns
    }

    /// The intention column of the first test environment.
    pub fn first_intention_column(&self) -> usize {
        self.intention_columns
            .first()
            .copied()
            .unwrap_or_else(|| self.column(ColumnKey::TestIntention(0)))
    }
}
