//! Table metadata
//!
//! A table occupies a fixed rectangle on one sheet. The top
//! `header_row_count` rows hold column captions, the bottom
//! `totals_row_count` rows hold totals, and everything in between is data.

use crate::cell::{range_boundaries, Boundaries};
use crate::error::{Error, Result};
use ahash::AHashMap;

/// A table definition
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableDefinition {
    /// Table name, matched case-insensitively
    pub name: String,
    /// Extent of the table in A1 notation, e.g. `A1:D10`
    pub reference: String,
    #[cfg_attr(feature = "serde", serde(default = "default_header_rows"))]
    pub header_row_count: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub totals_row_count: u32,
    /// Column names, left to right
    pub columns: Vec<String>,
}

#[cfg(feature = "serde")]
fn default_header_rows() -> u32 {
    1
}

impl TableDefinition {
    /// Create a table with one header row and no totals row
    pub fn new(name: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reference: reference.into(),
            header_row_count: 1,
            totals_row_count: 0,
            columns: Vec::new(),
        }
    }

    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_header_rows(mut self, count: u32) -> Self {
        self.header_row_count = count;
        self
    }

    pub fn with_totals_rows(mut self, count: u32) -> Self {
        self.totals_row_count = count;
        self
    }

    /// The table's extent; always a complete box
    pub fn boundaries(&self) -> Result<Boundaries> {
        let boundaries = range_boundaries(&self.reference)?;
        if !boundaries.is_complete() || boundaries.is_inverted() {
            return Err(Error::InvalidTable(format!(
                "{} has an incomplete reference {}",
                self.name, self.reference
            )));
        }
        Ok(boundaries)
    }

    /// 0-based position of a column; names are case-sensitive
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidTable("table name cannot be empty".into()));
        }
        let b = self.boundaries()?;
        let (min_col, max_col) = (b.min_col.unwrap_or(0), b.max_col.unwrap_or(0));
        let width = (max_col - min_col + 1) as usize;
        if self.columns.len() != width {
            return Err(Error::InvalidTable(format!(
                "{} spans {} columns but names {}",
                self.name,
                width,
                self.columns.len()
            )));
        }
        let height = b.max_row.unwrap_or(0) - b.min_row.unwrap_or(0) + 1;
        if self.header_row_count.saturating_add(self.totals_row_count) > height {
            return Err(Error::InvalidTable(format!(
                "{} has more header and totals rows than its {} rows",
                self.name, height
            )));
        }
        Ok(())
    }
}

/// Lookup of table metadata
pub trait TableProvider {
    /// Find a table by name
    ///
    /// Returns the definition and the sheet it lives on. `sheet_hint` is the
    /// sheet the reference was written against; implementations may ignore it
    /// since table names are unique across a workbook.
    fn table(&self, name: &str, sheet_hint: &str) -> Option<(&TableDefinition, &str)>;
}

/// All tables of a workbook, keyed by lowercase name
#[derive(Debug, Default, Clone)]
pub struct TableCollection {
    tables: AHashMap<String, (String, TableDefinition)>,
}

impl TableCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table living on `sheet`
    ///
    /// Fails if the table's reference is not a complete box, its column list
    /// does not match its width, or the name is already taken.
    pub fn add(&mut self, sheet: impl Into<String>, table: TableDefinition) -> Result<()> {
        table.validate()?;

        let key = table.name.to_lowercase();
        if self.tables.contains_key(&key) {
            return Err(Error::InvalidTable(format!(
                "{} already exists",
                table.name
            )));
        }

        self.tables.insert(key, (sheet.into(), table));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<(&TableDefinition, &str)> {
        self.tables
            .get(&name.to_lowercase())
            .map(|(sheet, table)| (table, sheet.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TableDefinition, &str)> {
        self.tables.values().map(|(sheet, table)| (table, sheet.as_str()))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl TableProvider for TableCollection {
    fn table(&self, name: &str, _sheet_hint: &str) -> Option<(&TableDefinition, &str)> {
        self.get(name)
    }
}
