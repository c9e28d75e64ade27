//! Contains logic for mapping between the row table and sheet grids.

pub mod grid;
