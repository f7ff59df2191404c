//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Structural faults raised while resolving a reference
///
/// Value faults such as division by zero are never reported through this
/// type; operators return them in-band as error-code values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    /// The reference matched no notation
    #[error("{0} is not a valid coordinate or range")]
    InvalidReference(String),

    /// A relative or this-row reference was resolved without an anchor cell
    #[error("Must pass a cell to decode a relative address {0}")]
    MissingAnchor(String),

    /// Structured reference to a table that does not exist
    #[error("Table {table} not found for Structured Reference: {reference}")]
    UnknownTable { table: String, reference: String },

    /// Structured reference to a column the table does not have
    #[error("Column {column} not found for Structured Reference: {reference}")]
    UnknownColumn { column: String, reference: String },

    /// Selector syntax this resolver does not handle
    #[error("Unknown Structured Reference Selector: {0}")]
    UnsupportedSelector(String),

    /// Resolved rows or columns run backwards
    #[error("Columns out of order : {0}")]
    OutOfOrder(String),

    /// Operator token with no entry in the operator table
    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    /// Malformed criteria for a conditional function
    #[error("Invalid criteria: {0}")]
    Criteria(String),

    /// Date component outside the supported calendar
    #[error("Invalid date: {0}")]
    Date(String),

    /// Address or sheet fault from the coordinate model
    #[error(transparent)]
    Core(#[from] sheetref_core::Error),
}
