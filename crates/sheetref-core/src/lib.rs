//! # sheetref-core
//!
//! Core data structures for spreadsheet reference resolution.
//!
//! This crate provides the fundamental types used throughout sheetref:
//! - [`Address`], [`AddressCell`] and [`AddressRange`] - canonical cell and range locations
//! - [`Boundaries`] - the `(min_col, min_row, max_col, max_row)` extent of a reference
//! - [`CellValue`] and [`CellError`] - loosely typed operand values and error codes
//! - [`Workbook`] - sheet, defined-name, table and formula metadata
//!
//! ## Example
//!
//! ```rust
//! use sheetref_core::{Address, AddressCell};
//!
//! let range = Address::parse("Sheet1!A1:C3").unwrap();
//! assert_eq!(range.size().width, 3);
//!
//! // Relative offsets wrap around the sheet edge
//! let cell = AddressCell::parse("XFD1").unwrap();
//! assert_eq!(cell.address_at_offset(0, 1).coordinate(), "A1");
//! ```

pub mod cell;
pub mod error;
pub mod named_range;
pub mod table;
pub mod workbook;

// Re-exports for convenience
pub use cell::{
    column_to_letters, is_row_column_span, letters_to_column, range_boundaries, split_sheetname,
    unquote_sheetname, Address, AddressCell, AddressRange, AddressSize, Boundaries, CellError,
    CellValue, ResolvedRange, SharedString,
};
pub use error::{Error, Result};
pub use named_range::{NameProvider, NameScope, NamedRange, NamedRangeCollection};
pub use table::{TableCollection, TableDefinition, TableProvider};
pub use workbook::{FormulaSource, SheetTable, Workbook, WorkbookMetadata};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u32 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
