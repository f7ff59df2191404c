//! # sheetref-formula
//!
//! Reference resolution and operator evaluation for sheetref.
//!
//! This crate provides:
//! - Reference resolution in A1, R1C1, structured table and defined-name
//!   notation ([`ReferenceResolver`])
//! - Binary operators with spreadsheet coercion rules ([`apply`])
//! - Helpers for function implementations: criteria matching, serial dates,
//!   nested argument flattening and the LINEST degree scan
//!
//! ## Example
//!
//! ```rust
//! use sheetref_core::{AddressCell, CellError, CellValue};
//! use sheetref_formula::{apply, BinaryOperator, Diagnostic, ReferenceResolver};
//!
//! let resolver = ReferenceResolver::new();
//! let anchor = AddressCell::new(2, 2, "Sheet1");
//! let cell = resolver.create_cell("R[-1]C[1]", "Sheet1", Some(&anchor)).unwrap();
//! assert_eq!(cell.address(), "Sheet1!C1");
//!
//! let mut diagnostics: Vec<Diagnostic> = Vec::new();
//! let sum = apply(&"2".into(), BinaryOperator::Add, &true.into(), &mut diagnostics);
//! assert_eq!(sum, CellValue::Number(3.0));
//!
//! let quotient = apply(&1.into(), BinaryOperator::Divide, &0.into(), &mut diagnostics);
//! assert_eq!(quotient, CellValue::Error(CellError::Div0));
//! assert_eq!(diagnostics.len(), 1);
//! ```

pub mod coerce;
pub mod criteria;
pub mod date;
pub mod error;
pub mod linest;
pub mod operator;
pub mod reference;
pub mod util;

pub use coerce::{
    apply, coerce_to_number, is_number, Diagnostic, DiagnosticSink, IgnoreDiagnostics, Operand,
    Severity,
};
pub use criteria::{criteria_parser, find_corresponding_index, Criteria};
pub use error::{FormulaError, FormulaResult};
pub use linest::linest_degree;
pub use operator::BinaryOperator;
pub use reference::{ReferenceInput, ReferenceResolver, Resolved};
pub use util::{flatten, uniqueify, Nested};
