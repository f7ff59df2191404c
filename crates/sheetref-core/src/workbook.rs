//! Workbook type - the metadata a reference resolver consults
//!
//! The workbook holds sheet names, defined names, tables and per-cell formula
//! text. It answers lookups for all three collaborator traits
//! ([`NameProvider`], [`TableProvider`], [`FormulaSource`]).

use crate::cell::AddressCell;
use crate::error::{Error, Result};
use crate::named_range::{NameProvider, NameScope, NamedRange, NamedRangeCollection};
use crate::table::{TableCollection, TableDefinition, TableProvider};
use crate::MAX_SHEET_NAME_LEN;
use ahash::AHashMap;
use std::collections::BTreeMap;

/// Lookup of the formula text stored in a cell
pub trait FormulaSource {
    /// Formula text of a sheet-qualified cell, or `None` for value cells
    fn formula_at(&self, cell: &AddressCell) -> Option<&str>;
}

/// A workbook (spreadsheet document metadata)
#[derive(Debug, Default, Clone)]
pub struct Workbook {
    /// Sheet names in tab order
    sheets: Vec<String>,
    /// Defined names
    named_ranges: NamedRangeCollection,
    tables: TableCollection,
    formulas: AHashMap<AddressCell, String>,
}

impl Workbook {
    /// Create a workbook with a single sheet called `Sheet1`
    pub fn new() -> Self {
        Self {
            sheets: vec!["Sheet1".to_string()],
            ..Self::default()
        }
    }

    /// Create an empty workbook with no sheets
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a workbook from serialized metadata
    ///
    /// Sheets are added first so that names, tables and formulas can be
    /// checked against them.
    pub fn from_metadata(metadata: WorkbookMetadata) -> Result<Self> {
        let mut wb = Self::empty();
        for sheet in &metadata.sheets {
            wb.add_sheet(sheet)?;
        }
        for name in metadata.names {
            wb.named_ranges.define(name)?;
        }
        for SheetTable { sheet, table } in metadata.tables {
            wb.add_table(&sheet, table)?;
        }
        for (address, formula) in metadata.formulas {
            wb.set_formula(&address, formula)?;
        }
        Ok(wb)
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Sheet names in tab order
    pub fn sheets(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(String::as_str)
    }

    /// Index of a sheet, matched case-insensitively
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        let name_lower = name.to_lowercase();
        self.sheets
            .iter()
            .position(|s| s.to_lowercase() == name_lower)
    }

    pub fn has_sheet(&self, name: &str) -> bool {
        self.sheet_index(name).is_some()
    }

    /// Add a sheet with the given name
    pub fn add_sheet(&mut self, name: &str) -> Result<usize> {
        self.validate_sheet_name(name)?;
        self.sheets.push(name.to_string());
        Ok(self.sheets.len() - 1)
    }

    // ==================== Defined Names ====================

    /// Define a workbook-scoped name
    ///
    /// # Example
    /// ```
    /// use sheetref_core::Workbook;
    ///
    /// let mut wb = Workbook::new();
    /// wb.define_name("TaxRate", "Sheet1!$B$1").unwrap();
    /// ```
    pub fn define_name(&mut self, name: &str, refers_to: &str) -> Result<()> {
        self.named_ranges
            .define(NamedRange::new(name, refers_to, NameScope::Workbook))
    }

    /// Define a name visible only from `sheet`
    pub fn define_name_for_sheet(&mut self, name: &str, refers_to: &str, sheet: &str) -> Result<()> {
        self.require_sheet(sheet)?;
        self.named_ranges
            .define(NamedRange::sheet_scope(name, refers_to, sheet))
    }

    pub fn named_ranges(&self) -> &NamedRangeCollection {
        &self.named_ranges
    }

    // ==================== Tables ====================

    /// Add a table on `sheet`
    pub fn add_table(&mut self, sheet: &str, table: TableDefinition) -> Result<()> {
        self.require_sheet(sheet)?;
        self.tables.add(sheet, table)
    }

    pub fn tables(&self) -> &TableCollection {
        &self.tables
    }

    // ==================== Formulas ====================

    /// Store formula text for a sheet-qualified cell, e.g. `Sheet1!B2`
    pub fn set_formula(&mut self, address: &str, formula: impl Into<String>) -> Result<()> {
        let cell = AddressCell::parse(address)?;
        if !cell.has_sheet() {
            return Err(Error::other(format!(
                "formula cell {} must name its sheet",
                address
            )));
        }
        self.require_sheet(cell.sheet())?;
        self.formulas.insert(cell, formula.into());
        Ok(())
    }

    fn require_sheet(&self, sheet: &str) -> Result<()> {
        if self.has_sheet(sheet) {
            Ok(())
        } else {
            Err(Error::InvalidSheetName(format!("no sheet named '{}'", sheet)))
        }
    }

    /// Validate a sheet name
    fn validate_sheet_name(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::InvalidSheetName("Sheet name cannot be empty".into()));
        }
        if name.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(Error::InvalidSheetName(format!(
                "Sheet name too long (max {} characters)",
                MAX_SHEET_NAME_LEN
            )));
        }

        const INVALID_CHARS: &[char] = &[':', '\\', '/', '?', '*', '[', ']'];
        if let Some(c) = name.chars().find(|c| INVALID_CHARS.contains(c)) {
            return Err(Error::InvalidSheetName(format!(
                "Sheet name cannot contain '{}'",
                c
            )));
        }

        // Duplicates are checked case-insensitively
        if self.has_sheet(name) {
            return Err(Error::DuplicateSheetName(name.into()));
        }

        Ok(())
    }
}

impl NameProvider for Workbook {
    fn defined_name(&self, name: &str, sheet: &str) -> Option<(String, String)> {
        self.named_ranges.defined_name(name, sheet)
    }
}

impl TableProvider for Workbook {
    fn table(&self, name: &str, sheet_hint: &str) -> Option<(&TableDefinition, &str)> {
        self.tables.table(name, sheet_hint)
    }
}

impl FormulaSource for Workbook {
    fn formula_at(&self, cell: &AddressCell) -> Option<&str> {
        self.formulas.get(cell).map(String::as_str)
    }
}

/// A table together with the sheet it lives on
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SheetTable {
    pub sheet: String,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub table: TableDefinition,
}

/// Serializable description of a workbook
///
/// ```json
/// {
///   "sheets": ["Sheet1"],
///   "names": [{ "name": "Rate", "refers_to": "Sheet1!$B$1" }],
///   "tables": [{ "sheet": "Sheet1", "name": "T", "reference": "A1:B5", "columns": ["x", "y"] }],
///   "formulas": { "Sheet1!C2": "=A2*B2" }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WorkbookMetadata {
    pub sheets: Vec<String>,
    pub names: Vec<NamedRange>,
    pub tables: Vec<SheetTable>,
    /// Formula text keyed by sheet-qualified cell address
    pub formulas: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_workbook() {
        let wb = Workbook::new();
        assert_eq!(wb.sheet_count(), 1);
        assert_eq!(wb.sheets().collect::<Vec<_>>(), vec!["Sheet1"]);
    }

    #[test]
    fn test_duplicate_name() {
        let mut wb = Workbook::new();

        // Case-insensitive duplicate check
        assert!(wb.add_sheet("SHEET1").is_err());
        assert!(wb.add_sheet("sheet1").is_err());
        assert_eq!(wb.add_sheet("Data").unwrap(), 1);
    }

    #[test]
    fn test_invalid_sheet_name() {
        let mut wb = Workbook::new();

        assert!(wb.add_sheet("").is_err());
        assert!(wb.add_sheet("Sheet/1").is_err());
        assert!(wb.add_sheet("Sheet:1").is_err());
        assert!(wb.add_sheet("Sheet[1]").is_err());

        let long_name = "A".repeat(MAX_SHEET_NAME_LEN + 1);
        assert!(wb.add_sheet(&long_name).is_err());
    }

    #[test]
    fn test_collaborator_lookups() {
        let mut wb = Workbook::new();
        wb.define_name("Rate", "Sheet1!$B$1").unwrap();
        wb.add_table(
            "Sheet1",
            TableDefinition::new("T", "A1:B4").with_columns(["x", "y"]),
        )
        .unwrap();
        wb.set_formula("Sheet1!C2", "=A2*B2").unwrap();

        assert_eq!(
            wb.defined_name("rate", "Sheet1"),
            Some(("$B$1".to_string(), "Sheet1".to_string()))
        );
        assert_eq!(wb.table("t", "").map(|(_, sheet)| sheet), Some("Sheet1"));
        assert_eq!(
            wb.formula_at(&AddressCell::new(3, 2, "Sheet1")),
            Some("=A2*B2")
        );
        assert_eq!(wb.formula_at(&AddressCell::new(3, 3, "Sheet1")), None);
    }

    #[test]
    fn test_unknown_sheet_rejected() {
        let mut wb = Workbook::new();
        assert!(wb.set_formula("C2", "=1").is_err());
        assert!(wb.set_formula("Nope!C2", "=1").is_err());
        assert!(wb
            .add_table("Nope", TableDefinition::new("T", "A1:A2").with_columns(["a"]))
            .is_err());
        assert!(wb.define_name_for_sheet("Local", "A1", "Nope").is_err());
    }

    #[test]
    fn test_from_metadata() {
        let metadata = WorkbookMetadata {
            sheets: vec!["Data".into(), "Calc".into()],
            names: vec![NamedRange::sheet_scope("Rate", "$A$1", "Calc")],
            tables: vec![SheetTable {
                sheet: "Data".into(),
                table: TableDefinition::new("Sales", "A1:B3").with_columns(["a", "b"]),
            }],
            formulas: BTreeMap::from([("Calc!B1".to_string(), "=Rate*2".to_string())]),
        };

        let wb = Workbook::from_metadata(metadata).unwrap();
        assert_eq!(wb.sheet_count(), 2);
        assert_eq!(
            wb.defined_name("RATE", "Calc"),
            Some(("$A$1".to_string(), "Calc".to_string()))
        );
        assert_eq!(wb.defined_name("Rate", "Data"), None);
        assert!(wb.table("sales", "Calc").is_some());
    }
}
