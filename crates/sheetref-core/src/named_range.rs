//! Defined names
//!
//! A defined name maps a case-insensitive identifier to a stored reference
//! such as `Sheet1!$B$1:$B$10`. Names are either workbook wide or scoped to a
//! single sheet, and a sheet-scoped name shadows a workbook name of the same
//! spelling.
//!
//! # Example
//!
//! ```
//! use sheetref_core::named_range::{NameProvider, NamedRange, NamedRangeCollection};
//!
//! let mut names = NamedRangeCollection::new();
//! names.define(NamedRange::workbook_scope("TaxRate", "Rates!$B$1")).unwrap();
//!
//! let (coordinate, sheet) = names.defined_name("taxrate", "").unwrap();
//! assert_eq!(coordinate, "$B$1");
//! assert_eq!(sheet, "Rates");
//! ```

use crate::cell::split_sheetname;
use crate::error::{Error, Result};
use ahash::AHashMap;

/// Scope of a defined name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NameScope {
    /// Available throughout the workbook
    Workbook,
    /// Visible only from the named sheet
    Sheet(String),
}

impl Default for NameScope {
    fn default() -> Self {
        NameScope::Workbook
    }
}

/// A defined name
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NamedRange {
    /// The name as written, e.g. `SalesData`
    pub name: String,
    /// Workbook or sheet scope
    #[cfg_attr(feature = "serde", serde(default))]
    pub scope: NameScope,
    /// The stored reference, e.g. `Sheet1!$A$1:$D$10`
    pub refers_to: String,
}

impl NamedRange {
    pub fn new(name: impl Into<String>, refers_to: impl Into<String>, scope: NameScope) -> Self {
        Self {
            name: name.into(),
            scope,
            refers_to: refers_to.into(),
        }
    }

    /// Create a workbook-scoped name
    pub fn workbook_scope(name: impl Into<String>, refers_to: impl Into<String>) -> Self {
        Self::new(name, refers_to, NameScope::Workbook)
    }

    /// Create a sheet-scoped name
    pub fn sheet_scope(
        name: impl Into<String>,
        refers_to: impl Into<String>,
        sheet: impl Into<String>,
    ) -> Self {
        Self::new(name, refers_to, NameScope::Sheet(sheet.into()))
    }

    /// The reference with any leading `=` removed
    pub fn expression(&self) -> &str {
        self.refers_to.strip_prefix('=').unwrap_or(&self.refers_to)
    }

    /// Split the stored reference into `(coordinate, sheet)`
    ///
    /// A reference without an embedded sheet inherits the scope's sheet.
    pub fn target(&self) -> Result<(String, String)> {
        let scope_sheet = match &self.scope {
            NameScope::Workbook => "",
            NameScope::Sheet(sheet) => sheet.as_str(),
        };
        let (sheet, coordinate) = split_sheetname(self.expression(), "")?;
        let sheet = if sheet.is_empty() {
            scope_sheet.to_string()
        } else {
            sheet
        };
        Ok((coordinate.to_string(), sheet))
    }
}

/// Lookup of defined names
///
/// Implementations must treat names case-insensitively and prefer a name
/// scoped to `sheet` over a workbook-scoped one.
pub trait NameProvider {
    /// The `(coordinate, sheet)` a name refers to, or `None` if undefined
    fn defined_name(&self, name: &str, sheet: &str) -> Option<(String, String)>;
}

/// Collection of defined names keyed for case-insensitive lookup
#[derive(Debug, Default, Clone)]
pub struct NamedRangeCollection {
    /// Keyed by (lowercase name, scope)
    ranges: AHashMap<(String, NameScope), NamedRange>,
}

impl NamedRangeCollection {
    pub fn new() -> Self {
        Self::default()
    }

    fn make_key(name: &str, scope: &NameScope) -> (String, NameScope) {
        let scope = match scope {
            NameScope::Workbook => NameScope::Workbook,
            NameScope::Sheet(sheet) => NameScope::Sheet(sheet.to_lowercase()),
        };
        (name.to_lowercase(), scope)
    }

    /// Define a new name
    ///
    /// Fails if the name is blank, its reference has more than one sheet
    /// separator, or the name already exists in the same scope.
    pub fn define(&mut self, range: NamedRange) -> Result<()> {
        if range.name.trim().is_empty() {
            return Err(Error::InvalidName("name cannot be empty".into()));
        }
        range.target()?;

        let key = Self::make_key(&range.name, &range.scope);
        if self.ranges.contains_key(&key) {
            return Err(Error::InvalidName(format!(
                "'{}' already exists in this scope",
                range.name
            )));
        }

        self.ranges.insert(key, range);
        Ok(())
    }

    /// Get a name as seen from `sheet`: sheet scope first, then workbook scope
    pub fn get(&self, name: &str, sheet: &str) -> Option<&NamedRange> {
        if !sheet.is_empty() {
            let sheet_key = Self::make_key(name, &NameScope::Sheet(sheet.to_string()));
            if let Some(range) = self.ranges.get(&sheet_key) {
                return Some(range);
            }
        }
        self.ranges.get(&Self::make_key(name, &NameScope::Workbook))
    }

    pub fn remove(&mut self, name: &str, scope: &NameScope) -> Option<NamedRange> {
        self.ranges.remove(&Self::make_key(name, scope))
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedRange> {
        self.ranges.values()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

impl NameProvider for NamedRangeCollection {
    fn defined_name(&self, name: &str, sheet: &str) -> Option<(String, String)> {
        let range = self.get(name, sheet)?;
        match range.target() {
            Ok(target) => Some(target),
            Err(err) => {
                log::warn!("ignoring defined name {}: {}", range.name, err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_splits_sheet() {
        let nr = NamedRange::workbook_scope("Sales", "='Q1 Data'!$A$1:$A$5");
        assert_eq!(
            nr.target().unwrap(),
            ("$A$1:$A$5".to_string(), "Q1 Data".to_string())
        );

        let nr = NamedRange::sheet_scope("Local", "B2", "Inputs");
        assert_eq!(nr.target().unwrap(), ("B2".to_string(), "Inputs".to_string()));
    }

    #[test]
    fn test_collection_scope_lookup() {
        let mut coll = NamedRangeCollection::new();
        coll.define(NamedRange::workbook_scope("Rate", "Global!A1"))
            .unwrap();
        coll.define(NamedRange::sheet_scope("Rate", "B1", "Calc"))
            .unwrap();

        // Calc sees its own version
        assert_eq!(
            coll.defined_name("Rate", "Calc"),
            Some(("B1".to_string(), "Calc".to_string()))
        );

        // Any other sheet falls back to the workbook scope
        assert_eq!(
            coll.defined_name("Rate", "Other"),
            Some(("A1".to_string(), "Global".to_string()))
        );
        assert_eq!(coll.defined_name("Missing", "Calc"), None);
    }

    #[test]
    fn test_case_insensitive() {
        let mut coll = NamedRangeCollection::new();
        coll.define(NamedRange::workbook_scope("TaxRate", "S!B1"))
            .unwrap();

        assert!(coll.get("taxrate", "").is_some());
        assert!(coll.get("TAXRATE", "S").is_some());

        assert!(coll
            .define(NamedRange::workbook_scope("TAXRATE", "S!B2"))
            .is_err());
    }

    #[test]
    fn test_define_rejects_bad_names() {
        let mut coll = NamedRangeCollection::new();
        assert!(coll.define(NamedRange::workbook_scope(" ", "A1")).is_err());
        assert!(coll
            .define(NamedRange::workbook_scope("Two", "S1!A1!B2"))
            .is_err());
        assert!(coll.is_empty());
    }
}
