//! Reference resolution
//!
//! A raw reference is resolved to boundaries by trying each notation in
//! turn, first match wins:
//!
//! 1. absolute A1 notation (`B2`, `$A$1:C3`, `A:C`)
//! 2. row-column notation (`R2C3`, `R[-1]C`, `R1C1:R5C5`)
//! 3. structured table references (`Sales[[#Data],[Units]]`)
//! 4. defined names
//!
//! A notation that does not recognise the string reports "not applicable"
//! and the next one is tried. A notation that recognises the string but finds
//! it malformed fails the whole resolution.

mod r1c1;
mod structured;

use crate::error::{FormulaError, FormulaResult};
use sheetref_core::{
    is_row_column_span, range_boundaries, split_sheetname, Address, AddressCell, AddressRange,
    Boundaries, NameProvider, TableProvider, Workbook,
};

/// Resolved boundaries and the sheet they live on
pub type Resolved = (Boundaries, String);

/// One reference to resolve
#[derive(Debug, Clone, Copy)]
struct Request<'r> {
    /// The reference with any sheet prefix removed
    raw: &'r str,
    anchor: Option<&'r AddressCell>,
    sheet: &'r str,
}

type Strategy = fn(&ReferenceResolver<'_>, &Request<'_>) -> FormulaResult<Option<Resolved>>;

static STRATEGIES: [(&str, Strategy); 4] = [
    ("absolute", absolute),
    ("row-column", r1c1::resolve),
    ("structured", structured::resolve),
    ("defined name", defined_name),
];

/// Anything [`ReferenceResolver::create`] accepts
#[derive(Debug, Clone, PartialEq)]
pub enum ReferenceInput<'r> {
    /// An already canonical address
    Address(Address),
    /// Reference text in any supported notation
    Text(&'r str),
    /// A boundary tuple
    Boundaries(Boundaries),
}

impl<'r> From<&'r str> for ReferenceInput<'r> {
    fn from(s: &'r str) -> Self {
        ReferenceInput::Text(s)
    }
}

impl<'r> From<&'r String> for ReferenceInput<'r> {
    fn from(s: &'r String) -> Self {
        ReferenceInput::Text(s)
    }
}

impl From<Address> for ReferenceInput<'_> {
    fn from(address: Address) -> Self {
        ReferenceInput::Address(address)
    }
}

impl From<AddressCell> for ReferenceInput<'_> {
    fn from(cell: AddressCell) -> Self {
        ReferenceInput::Address(cell.into())
    }
}

impl From<AddressRange> for ReferenceInput<'_> {
    fn from(range: AddressRange) -> Self {
        ReferenceInput::Address(range.into())
    }
}

impl From<Boundaries> for ReferenceInput<'_> {
    fn from(boundaries: Boundaries) -> Self {
        ReferenceInput::Boundaries(boundaries)
    }
}

impl From<(u32, u32, u32, u32)> for ReferenceInput<'_> {
    fn from(tuple: (u32, u32, u32, u32)) -> Self {
        ReferenceInput::Boundaries(tuple.into())
    }
}

/// Resolves reference text into canonical addresses
///
/// Table and defined-name lookups are delegated to the providers given at
/// construction; without them, structured references and names fail to
/// resolve.
///
/// # Example
///
/// ```
/// use sheetref_core::{Address, AddressCell};
/// use sheetref_formula::ReferenceResolver;
///
/// let resolver = ReferenceResolver::new();
/// let anchor = AddressCell::new(3, 5, "Sheet1");
///
/// let addr = resolver.create("R[2]C[2]", "Sheet1", Some(&anchor)).unwrap();
/// assert_eq!(addr.address(), "Sheet1!E7");
/// ```
#[derive(Clone, Copy, Default)]
pub struct ReferenceResolver<'a> {
    tables: Option<&'a dyn TableProvider>,
    names: Option<&'a dyn NameProvider>,
}

impl<'a> ReferenceResolver<'a> {
    /// A resolver for A1 and row-column notation only
    pub fn new() -> Self {
        Self::default()
    }

    /// A resolver that consults a workbook for tables and defined names
    pub fn for_workbook(workbook: &'a Workbook) -> Self {
        Self {
            tables: Some(workbook),
            names: Some(workbook),
        }
    }

    pub fn with_tables(mut self, tables: &'a dyn TableProvider) -> Self {
        self.tables = Some(tables);
        self
    }

    pub fn with_names(mut self, names: &'a dyn NameProvider) -> Self {
        self.names = Some(names);
        self
    }

    /// Resolve reference text to boundaries and a sheet name
    ///
    /// `anchor` is the cell relative references are resolved against and
    /// `sheet` overrides (and must agree with) any sheet named in `raw`.
    pub fn resolve(
        &self,
        raw: &str,
        anchor: Option<&AddressCell>,
        sheet: &str,
    ) -> FormulaResult<Resolved> {
        let (sheet, raw) = split_sheetname(raw, sheet)?;
        let request = Request {
            raw,
            anchor,
            sheet: &sheet,
        };

        for (name, strategy) in &STRATEGIES {
            if let Some(resolved) = strategy(self, &request)? {
                log::debug!("resolved {} as {} reference", raw, name);
                return Ok(resolved);
            }
        }

        Err(FormulaError::InvalidReference(raw.to_string()))
    }

    /// Build the canonical address for a reference
    ///
    /// An [`Address`] passes through, re-qualified with `sheet` when it has
    /// none; boundaries are taken as given; text is resolved with
    /// [`resolve`](Self::resolve).
    pub fn create<'r>(
        &self,
        input: impl Into<ReferenceInput<'r>>,
        sheet: &str,
        anchor: Option<&AddressCell>,
    ) -> FormulaResult<Address> {
        match input.into() {
            ReferenceInput::Address(address) => Ok(address.with_sheet(sheet)?),
            ReferenceInput::Boundaries(boundaries) => {
                Ok(Address::from_boundaries(boundaries, sheet))
            }
            ReferenceInput::Text(raw) => {
                let (boundaries, sheet) = self.resolve(raw, anchor, sheet)?;
                Ok(Address::from_boundaries(boundaries, &sheet))
            }
        }
    }

    /// Like [`create`](Self::create), but the result must be a single cell
    pub fn create_cell<'r>(
        &self,
        input: impl Into<ReferenceInput<'r>>,
        sheet: &str,
        anchor: Option<&AddressCell>,
    ) -> FormulaResult<AddressCell> {
        match self.create(input, sheet, anchor)? {
            Address::Cell(cell) => Ok(cell),
            Address::Range(range) => {
                Err(sheetref_core::Error::NotACell(range.address()).into())
            }
        }
    }
}

impl std::fmt::Debug for ReferenceResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceResolver")
            .field("tables", &self.tables.is_some())
            .field("names", &self.names.is_some())
            .finish()
    }
}

/// A1 notation: accepted when complete or an explicit range
///
/// A range written back to front (`C3:A1`) is put in order, except for the
/// `R1:C5` shape, which is left for the row-column grammar.
fn absolute(_: &ReferenceResolver<'_>, request: &Request<'_>) -> FormulaResult<Option<Resolved>> {
    if is_row_column_span(request.raw) {
        return Ok(None);
    }
    let accepted = range_boundaries(request.raw)
        .ok()
        .filter(|b| b.is_complete() || request.raw.contains(':'));
    Ok(accepted.map(|b| (b.normalized(), request.sheet.to_string())))
}

fn defined_name(
    resolver: &ReferenceResolver<'_>,
    request: &Request<'_>,
) -> FormulaResult<Option<Resolved>> {
    let Some(names) = resolver.names else {
        return Ok(None);
    };
    let Some((coordinate, sheet)) = names.defined_name(request.raw, request.sheet) else {
        return Ok(None);
    };

    let boundaries = range_boundaries(&coordinate)?;
    let sheet = if sheet.is_empty() {
        request.sheet.to_string()
    } else {
        sheet
    };
    Ok(Some((boundaries, sheet)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetref_core::{
        NameScope, NamedRange, NamedRangeCollection, TableCollection, TableDefinition,
    };

    #[test]
    fn test_absolute_strategy() {
        let resolver = ReferenceResolver::new();
        assert_eq!(
            resolver.resolve("B2:C3", None, "S").unwrap(),
            (Boundaries::range(2, 2, 3, 3), "S".to_string())
        );
        assert_eq!(
            resolver.resolve("Data!A:B", None, "").unwrap(),
            (Boundaries::new(Some(1), None, Some(2), None), "Data".to_string())
        );
    }

    #[test]
    fn test_absolute_backwards_range() {
        let resolver = ReferenceResolver::new();
        assert_eq!(
            resolver.resolve("C3:A1", None, "S").unwrap(),
            (Boundaries::range(1, 1, 3, 3), "S".to_string())
        );
        assert_eq!(
            resolver.create("C3:A1", "S", None).unwrap(),
            Address::parse("S!C3:A1").unwrap()
        );
        assert_eq!(
            resolver.resolve("R1:C5", None, "S"),
            Err(FormulaError::InvalidReference("R1:C5".into()))
        );
    }

    #[test]
    fn test_sheet_conflict() {
        let resolver = ReferenceResolver::new();
        assert!(matches!(
            resolver.resolve("Data!A1", None, "Other"),
            Err(FormulaError::Core(sheetref_core::Error::MismatchedSheets(_, _)))
        ));
    }

    #[test]
    fn test_unknown_reference() {
        let resolver = ReferenceResolver::new();
        assert_eq!(
            resolver.resolve("NoSuchName", None, ""),
            Err(FormulaError::InvalidReference("NoSuchName".into()))
        );
    }

    #[test]
    fn test_defined_name_strategy() {
        let mut names = NamedRangeCollection::new();
        names
            .define(NamedRange::new("Inputs", "Calc!$B$2:$B$9", NameScope::Workbook))
            .unwrap();
        names
            .define(NamedRange::workbook_scope("Loose", "$C$3"))
            .unwrap();
        let resolver = ReferenceResolver::new().with_names(&names);

        assert_eq!(
            resolver.resolve("inputs", None, "Report").unwrap(),
            (Boundaries::range(2, 2, 2, 9), "Calc".to_string())
        );
        assert_eq!(
            resolver.resolve("Loose", None, "Report").unwrap(),
            (Boundaries::cell(3, 3), "Report".to_string())
        );
    }

    #[test]
    fn test_table_provider_strategy() {
        let mut tables = TableCollection::new();
        tables
            .add(
                "Calc",
                TableDefinition::new("Grid", "B2:D8")
                    .with_columns(["X", "Y", "Z"])
                    .with_header_rows(2),
            )
            .unwrap();
        let resolver = ReferenceResolver::new().with_tables(&tables);

        assert_eq!(
            resolver.resolve("Grid[Y]", None, "Report").unwrap(),
            (Boundaries::range(3, 4, 3, 8), "Calc".to_string())
        );
        assert_eq!(
            resolver.resolve("Grid[#Headers]", None, "Report").unwrap(),
            (Boundaries::range(2, 2, 4, 3), "Calc".to_string())
        );
    }

    #[test]
    fn test_create_passthrough() {
        let resolver = ReferenceResolver::new();
        let cell = AddressCell::new(2, 2, "");

        let created = resolver.create(cell.clone(), "S", None).unwrap();
        assert_eq!(created.address(), "S!B2");
        assert_eq!(resolver.create(created.clone(), "S", None).unwrap(), created);
        assert!(resolver.create(created, "T", None).is_err());

        let from_tuple = resolver.create((1, 1, 2, 2), "S", None).unwrap();
        assert_eq!(from_tuple.address(), "S!A1:B2");
    }

    #[test]
    fn test_create_cell_rejects_ranges() {
        let resolver = ReferenceResolver::new();
        assert_eq!(resolver.create_cell("C3", "", None).unwrap().coordinate(), "C3");
        assert!(matches!(
            resolver.create_cell("A1:B2", "", None),
            Err(FormulaError::Core(sheetref_core::Error::NotACell(_)))
        ));
    }
}
