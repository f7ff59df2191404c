//! Cell-related types and utilities
//!
//! This module contains:
//! - [`AddressCell`], [`AddressRange`] and [`Address`] - canonical locations
//! - [`Boundaries`] and [`range_boundaries`] - the A1 boundary parser
//! - [`CellValue`] and [`CellError`] - operand values and error codes

mod address;
mod boundaries;
mod value;

pub use address::{Address, AddressCell, AddressRange, AddressSize, ResolvedRange};
pub use boundaries::{
    column_to_letters, is_row_column_span, letters_to_column, range_boundaries, split_sheetname,
    unquote_sheetname, Boundaries,
};
pub use value::{CellError, CellValue, SharedString};
