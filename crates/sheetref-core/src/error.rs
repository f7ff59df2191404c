//! Error types for sheetref-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in sheetref-core
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Invalid cell address format
    #[error("{0} is not a valid coordinate or range")]
    InvalidAddress(String),

    /// A range was supplied where a single cell is required
    #[error("{0} is not a valid coordinate")]
    NotACell(String),

    /// Row index out of bounds
    #[error("Row index {0} out of bounds (max: {1})")]
    RowOutOfBounds(u32, u32),

    /// Column index out of bounds
    #[error("Column index {0} out of bounds (max: {1})")]
    ColumnOutOfBounds(u32, u32),

    /// An address carries a different sheet than the one requested
    #[error("Mismatched sheets '{0}' and '{1}'")]
    MismatchedSheets(String, String),

    /// More than one sheet separator in a reference
    #[error("Only rectangular references are supported: {0}")]
    NotRectangular(String),

    /// Invalid sheet name
    #[error("Invalid sheet name: {0}")]
    InvalidSheetName(String),

    /// Duplicate sheet name
    #[error("Sheet name already exists: {0}")]
    DuplicateSheetName(String),

    /// Invalid named range
    #[error("Invalid named range: {0}")]
    InvalidName(String),

    /// Invalid table definition
    #[error("Invalid table: {0}")]
    InvalidTable(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }
}
