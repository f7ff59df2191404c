//! Cell address and range types
//!
//! Addresses are immutable values. Indices are 1-based; an index of 0 means
//! "unspecified", which is how whole-row (`3:3`) and whole-column (`C:C`)
//! references are stored.

use super::boundaries::{
    column_to_letters, is_row_column_span, range_boundaries, split_sheetname, Boundaries,
};
use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;
use std::str::FromStr;

/// Height and width of an address, in cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressSize {
    pub height: u32,
    pub width: u32,
}

/// A single cell, optionally qualified by a sheet name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AddressCell {
    sheet: String,
    col_idx: u32,
    row: u32,
}

impl AddressCell {
    /// Create a cell from a 1-based column and row
    pub fn new(col_idx: u32, row: u32, sheet: impl Into<String>) -> Self {
        Self {
            sheet: sheet.into(),
            col_idx,
            row,
        }
    }

    /// Parse an A1-style cell address such as `Sheet1!B2`
    ///
    /// # Examples
    /// ```
    /// use sheetref_core::AddressCell;
    ///
    /// let cell = AddressCell::parse("Sheet1!$C$7").unwrap();
    /// assert_eq!(cell.col_idx(), 3);
    /// assert_eq!(cell.row(), 7);
    /// assert_eq!(cell.address(), "Sheet1!C7");
    ///
    /// assert!(AddressCell::parse("A1:B2").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        match Address::parse(s)? {
            Address::Cell(cell) => Ok(cell),
            Address::Range(_) => Err(Error::NotACell(s.to_string())),
        }
    }

    /// Sheet name (may be empty)
    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    /// True when the cell is sheet qualified
    pub fn has_sheet(&self) -> bool {
        !self.sheet.is_empty()
    }

    /// 1-based column index, 0 when unspecified
    pub fn col_idx(&self) -> u32 {
        self.col_idx
    }

    /// 1-based row index, 0 when unspecified
    pub fn row(&self) -> u32 {
        self.row
    }

    /// Column letters, empty when the column is unspecified
    pub fn column(&self) -> String {
        column_to_letters(self.col_idx)
    }

    /// `B2`, or `B` / `2` for a whole column / whole row endpoint
    pub fn coordinate(&self) -> String {
        let mut coordinate = self.column();
        if self.row > 0 {
            coordinate.push_str(&self.row.to_string());
        }
        coordinate
    }

    /// The sheet qualified address, e.g. `Sheet1!B2`
    pub fn address(&self) -> String {
        qualify(&self.sheet, &self.coordinate())
    }

    pub fn is_range(&self) -> bool {
        false
    }

    pub fn size(&self) -> AddressSize {
        AddressSize {
            height: 1,
            width: 1,
        }
    }

    pub fn sort_key(&self) -> (&str, u32, u32) {
        (&self.sheet, self.col_idx, self.row)
    }

    /// Qualify with `sheet`
    ///
    /// Returns the cell unchanged when `sheet` is blank or already matches;
    /// an unqualified cell adopts `sheet`. A cell on a different sheet is an error.
    pub fn with_sheet(self, sheet: &str) -> Result<Self> {
        if sheet.is_empty() || sheet == self.sheet {
            Ok(self)
        } else if self.sheet.is_empty() {
            Ok(Self {
                sheet: sheet.to_string(),
                ..self
            })
        } else {
            Err(Error::MismatchedSheets(self.address(), sheet.to_string()))
        }
    }

    /// Column index `inc` columns away, wrapping around the sheet edge
    pub fn inc_col(&self, inc: i64) -> u32 {
        wrap(self.col_idx, inc, MAX_COLS)
    }

    /// Row index `inc` rows away, wrapping around the sheet edge
    pub fn inc_row(&self, inc: i64) -> u32 {
        wrap(self.row, inc, MAX_ROWS)
    }

    /// The cell at a relative offset, on the same sheet
    ///
    /// Moving past the last row or column wraps back to the first, the way a
    /// relative reference behaves when copied across the sheet boundary.
    pub fn address_at_offset(&self, row_inc: i64, col_inc: i64) -> AddressCell {
        AddressCell::new(self.inc_col(col_inc), self.inc_row(row_inc), self.sheet.as_str())
    }
}

impl fmt::Display for AddressCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address())
    }
}

impl FromStr for AddressCell {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A rectangular range of cells on one sheet
///
/// Never a single cell: a degenerate box is always represented as an
/// [`AddressCell`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AddressRange {
    sheet: String,
    start: AddressCell,
    end: AddressCell,
}

impl AddressRange {
    fn from_boundaries(b: Boundaries, sheet: &str) -> Self {
        let b = b.normalized();
        Self {
            sheet: sheet.to_string(),
            start: AddressCell::new(b.min_col.unwrap_or(0), b.min_row.unwrap_or(0), sheet),
            end: AddressCell::new(b.max_col.unwrap_or(0), b.max_row.unwrap_or(0), sheet),
        }
    }

    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    pub fn has_sheet(&self) -> bool {
        !self.sheet.is_empty()
    }

    /// Top-left corner
    pub fn start(&self) -> &AddressCell {
        &self.start
    }

    /// Bottom-right corner
    pub fn end(&self) -> &AddressCell {
        &self.end
    }

    /// `A1:B2`
    pub fn coordinate(&self) -> String {
        format!("{}:{}", self.start.coordinate(), self.end.coordinate())
    }

    /// The sheet qualified address, e.g. `Sheet1!A1:B2`
    pub fn address(&self) -> String {
        qualify(&self.sheet, &self.coordinate())
    }

    pub fn is_range(&self) -> bool {
        true
    }

    /// Size in cells; whole-row/column ranges report the sheet maximum
    pub fn size(&self) -> AddressSize {
        let height = if self.start.row == 0 || self.end.row == 0 {
            MAX_ROWS
        } else {
            self.end.row - self.start.row + 1
        };

        let width = if self.start.col_idx == 0 || self.end.col_idx == 0 {
            MAX_COLS
        } else {
            self.end.col_idx - self.start.col_idx + 1
        };

        AddressSize { height, width }
    }

    pub fn sort_key(&self) -> (&str, u32, u32) {
        (&self.sheet, self.start.col_idx, self.start.row)
    }

    /// Boundaries of this range, with unspecified indices as `None`
    pub fn boundaries(&self) -> Boundaries {
        let known = |n: u32| (n > 0).then_some(n);
        Boundaries::new(
            known(self.start.col_idx),
            known(self.start.row),
            known(self.end.col_idx),
            known(self.end.row),
        )
    }

    /// Qualify with `sheet`, see [`AddressCell::with_sheet`]
    pub fn with_sheet(self, sheet: &str) -> Result<Self> {
        if sheet.is_empty() || sheet == self.sheet {
            Ok(self)
        } else if self.sheet.is_empty() {
            Ok(Self::from_boundaries(self.boundaries(), sheet))
        } else {
            Err(Error::MismatchedSheets(self.address(), sheet.to_string()))
        }
    }

    /// Every cell in the range, one row at a time
    pub fn rows(&self) -> impl Iterator<Item = impl Iterator<Item = AddressCell> + '_> + '_ {
        let (start_col, end_col) = (self.start.col_idx, self.end.col_idx);
        (self.start.row..=self.end.row).map(move |row| {
            (start_col..=end_col).map(move |col| AddressCell::new(col, row, self.sheet.as_str()))
        })
    }

    /// Every cell in the range, one column at a time
    pub fn cols(&self) -> impl Iterator<Item = impl Iterator<Item = AddressCell> + '_> + '_ {
        let (start_row, end_row) = (self.start.row, self.end.row);
        (self.start.col_idx..=self.end.col_idx).map(move |col| {
            (start_row..=end_row).map(move |row| AddressCell::new(col, row, self.sheet.as_str()))
        })
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address())
    }
}

/// Either a single cell or a rectangular range
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Address {
    Cell(AddressCell),
    Range(AddressRange),
}

/// The cells of an address laid out by shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedRange {
    /// A single cell
    Cell(AddressCell),
    /// A single row or a single column, in order
    Line(Vec<AddressCell>),
    /// A full rectangle, row-major
    Grid(Vec<Vec<AddressCell>>),
}

impl Address {
    /// Build the canonical address for a boundary tuple
    ///
    /// Equal, fully known corners give a cell; anything else gives a range
    /// with its corners put in order.
    pub fn from_boundaries(boundaries: Boundaries, sheet: &str) -> Self {
        match boundaries.as_tuple() {
            (Some(col), Some(row), _, _) if boundaries.is_single_cell() => {
                Address::Cell(AddressCell::new(col, row, sheet))
            }
            _ => Address::Range(AddressRange::from_boundaries(boundaries, sheet)),
        }
    }

    /// Parse an A1-style address such as `Sheet1!A1:B2`, `'My Sheet'!C3` or `A:C`
    ///
    /// Only the absolute notation is understood here; row-column, structured
    /// and defined-name references need the resolver in `sheetref-formula`.
    ///
    /// # Examples
    /// ```
    /// use sheetref_core::Address;
    ///
    /// let addr = Address::parse("Sheet1!A1:B3").unwrap();
    /// assert!(addr.is_range());
    /// assert_eq!(addr.size().height, 3);
    /// assert_eq!(addr.to_string(), "Sheet1!A1:B3");
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let (sheet, coordinate) = split_sheetname(s, "")?;
        let boundaries = range_boundaries(coordinate)?;
        if (!boundaries.is_complete() && !coordinate.contains(':'))
            || is_row_column_span(coordinate)
        {
            return Err(Error::InvalidAddress(s.to_string()));
        }
        Ok(Self::from_boundaries(boundaries, &sheet))
    }

    pub fn sheet(&self) -> &str {
        match self {
            Address::Cell(c) => c.sheet(),
            Address::Range(r) => r.sheet(),
        }
    }

    pub fn has_sheet(&self) -> bool {
        !self.sheet().is_empty()
    }

    pub fn is_range(&self) -> bool {
        matches!(self, Address::Range(_))
    }

    pub fn size(&self) -> AddressSize {
        match self {
            Address::Cell(c) => c.size(),
            Address::Range(r) => r.size(),
        }
    }

    pub fn sort_key(&self) -> (&str, u32, u32) {
        match self {
            Address::Cell(c) => c.sort_key(),
            Address::Range(r) => r.sort_key(),
        }
    }

    pub fn coordinate(&self) -> String {
        match self {
            Address::Cell(c) => c.coordinate(),
            Address::Range(r) => r.coordinate(),
        }
    }

    pub fn address(&self) -> String {
        match self {
            Address::Cell(c) => c.address(),
            Address::Range(r) => r.address(),
        }
    }

    pub fn boundaries(&self) -> Boundaries {
        match self {
            Address::Cell(c) => Boundaries::cell(c.col_idx(), c.row()),
            Address::Range(r) => r.boundaries(),
        }
    }

    /// Qualify with `sheet`, see [`AddressCell::with_sheet`]
    pub fn with_sheet(self, sheet: &str) -> Result<Self> {
        match self {
            Address::Cell(c) => c.with_sheet(sheet).map(Address::Cell),
            Address::Range(r) => r.with_sheet(sheet).map(Address::Range),
        }
    }

    /// Lay out the cells of this address
    ///
    /// A single column or single row range gives a flat line; any other range
    /// gives rows of cells.
    pub fn resolve_range(&self) -> ResolvedRange {
        let range = match self {
            Address::Cell(c) => return ResolvedRange::Cell(c.clone()),
            Address::Range(r) => r,
        };

        if range.start.col_idx == range.end.col_idx {
            ResolvedRange::Line(range.cols().next().map(Iterator::collect).unwrap_or_default())
        } else if range.start.row == range.end.row {
            ResolvedRange::Line(range.rows().next().map(Iterator::collect).unwrap_or_default())
        } else {
            ResolvedRange::Grid(range.rows().map(Iterator::collect).collect())
        }
    }
}

impl From<AddressCell> for Address {
    fn from(cell: AddressCell) -> Self {
        Address::Cell(cell)
    }
}

impl From<AddressRange> for Address {
    fn from(range: AddressRange) -> Self {
        Address::Range(range)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Cell(c) => c.fmt(f),
            Address::Range(r) => r.fmt(f),
        }
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn qualify(sheet: &str, coordinate: &str) -> String {
    if sheet.is_empty() {
        coordinate.to_string()
    } else {
        format!("{}!{}", sheet, coordinate)
    }
}

/// 1-based modular step: `((idx - 1 + delta) mod max) + 1`
fn wrap(idx: u32, delta: i64, max: u32) -> u32 {
    let max = i64::from(max);
    ((i64::from(idx) - 1 + delta.rem_euclid(max)).rem_euclid(max) + 1) as u32
}
