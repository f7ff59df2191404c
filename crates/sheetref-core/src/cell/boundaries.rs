//! Boundary tuples, A1 notation parsing and sheet-name splitting

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use lazy_regex::regex;

/// The `(min_col, min_row, max_col, max_row)` extent of a rectangular reference
///
/// All indices are 1-based. `None` means the component was not given, e.g. the
/// row components of a whole-column reference like `A:C`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Boundaries {
    pub min_col: Option<u32>,
    pub min_row: Option<u32>,
    pub max_col: Option<u32>,
    pub max_row: Option<u32>,
}

impl Boundaries {
    /// Create boundaries from the four (possibly missing) components
    pub fn new(
        min_col: Option<u32>,
        min_row: Option<u32>,
        max_col: Option<u32>,
        max_row: Option<u32>,
    ) -> Self {
        Self {
            min_col,
            min_row,
            max_col,
            max_row,
        }
    }

    /// Boundaries of a fully specified box
    pub fn range(min_col: u32, min_row: u32, max_col: u32, max_row: u32) -> Self {
        Self::new(Some(min_col), Some(min_row), Some(max_col), Some(max_row))
    }

    /// Boundaries of a single cell
    pub fn cell(col: u32, row: u32) -> Self {
        Self::range(col, row, col, row)
    }

    /// True when all four components are known
    pub fn is_complete(&self) -> bool {
        self.min_col.is_some()
            && self.min_row.is_some()
            && self.max_col.is_some()
            && self.max_row.is_some()
    }

    /// True when both corners are known and identical
    pub fn is_single_cell(&self) -> bool {
        self.is_complete() && self.min_col == self.max_col && self.min_row == self.max_row
    }

    /// True when a known max component lies before its min component
    pub fn is_inverted(&self) -> bool {
        let inverted =
            |min: Option<u32>, max: Option<u32>| matches!((min, max), (Some(a), Some(b)) if a > b);
        inverted(self.min_col, self.max_col) || inverted(self.min_row, self.max_row)
    }

    /// The same extent with each axis running from low to high
    ///
    /// A relative range that wraps past the sheet edge, or a range written
    /// back to front (`C3:A1`), comes out with its corners swapped.
    pub fn normalized(self) -> Self {
        let order = |min: Option<u32>, max: Option<u32>| match (min, max) {
            (Some(a), Some(b)) if a > b => (Some(b), Some(a)),
            other => other,
        };
        let (min_col, max_col) = order(self.min_col, self.max_col);
        let (min_row, max_row) = order(self.min_row, self.max_row);
        Self::new(min_col, min_row, max_col, max_row)
    }

    /// The components as a plain tuple
    pub fn as_tuple(&self) -> (Option<u32>, Option<u32>, Option<u32>, Option<u32>) {
        (self.min_col, self.min_row, self.max_col, self.max_row)
    }
}

impl From<(u32, u32, u32, u32)> for Boundaries {
    fn from((min_col, min_row, max_col, max_row): (u32, u32, u32, u32)) -> Self {
        Self::range(min_col, min_row, max_col, max_row)
    }
}

/// Convert a 1-based column index to letters (1 = A, 26 = Z, 27 = AA, etc.)
///
/// Index 0 means "no column" and yields an empty string.
pub fn column_to_letters(col: u32) -> String {
    let mut result = String::new();
    let mut n = col;

    while n > 0 {
        n -= 1;
        let c = ((n % 26) as u8 + b'A') as char;
        result.insert(0, c);
        n /= 26;
    }

    result
}

/// Convert column letters to a 1-based index (A = 1, Z = 26, AA = 27, etc.)
pub fn letters_to_column(letters: &str) -> Result<u32> {
    if letters.is_empty() {
        return Err(Error::InvalidAddress("empty column letters".into()));
    }

    let mut col: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(Error::InvalidAddress(format!(
                "invalid column letter '{}'",
                c
            )));
        }
        col = col
            .checked_mul(26)
            .and_then(|v| v.checked_add(c.to_ascii_uppercase() as u32 - 'A' as u32 + 1))
            .ok_or_else(|| Error::InvalidAddress(letters.to_string()))?;
    }

    if col > MAX_COLS {
        return Err(Error::ColumnOutOfBounds(col, MAX_COLS));
    }

    Ok(col)
}

fn parse_row(digits: &str, address: &str) -> Result<u32> {
    let row: u32 = digits
        .parse()
        .map_err(|_| Error::InvalidAddress(address.to_string()))?;
    if row == 0 {
        return Err(Error::InvalidAddress(address.to_string()));
    }
    if row > MAX_ROWS {
        return Err(Error::RowOutOfBounds(row, MAX_ROWS));
    }
    Ok(row)
}

/// Parse an A1-style reference (`B2`, `$A$1:C3`, `A:C`, `2:5`) into boundaries
///
/// A missing max component defaults to the matching min component, so `A1`
/// yields `(1, 1, 1, 1)` and `C` yields `(3, None, 3, None)`. A range must be a
/// complete box, columns only, or rows only.
///
/// # Examples
/// ```
/// use sheetref_core::{range_boundaries, Boundaries};
///
/// assert_eq!(range_boundaries("B2:C4").unwrap(), Boundaries::range(2, 2, 3, 4));
/// assert_eq!(range_boundaries("$A$1").unwrap(), Boundaries::cell(1, 1));
/// assert_eq!(
///     range_boundaries("A:B").unwrap(),
///     Boundaries::new(Some(1), None, Some(2), None)
/// );
/// ```
pub fn range_boundaries(address: &str) -> Result<Boundaries> {
    let caps = regex!(
        r"^\$?(?P<min_col>[A-Za-z]{1,3})?\$?(?P<min_row>\d+)?(?P<sep>:\$?(?P<max_col>[A-Za-z]{1,3})?\$?(?P<max_row>\d+)?)?$"
    )
    .captures(address)
    .ok_or_else(|| Error::InvalidAddress(address.to_string()))?;

    let group = |name: &str| caps.name(name).map(|m| m.as_str());
    let (min_col, min_row) = (group("min_col"), group("min_row"));
    let (max_col, max_row) = (group("max_col"), group("max_row"));

    if group("sep").is_some() {
        let all_cols = min_col.is_some() && max_col.is_some();
        let all_rows = min_row.is_some() && max_row.is_some();
        let any_cols = min_col.is_some() || max_col.is_some();
        let any_rows = min_row.is_some() || max_row.is_some();
        let valid = (all_cols && all_rows) || (all_cols && !any_rows) || (all_rows && !any_cols);
        if !valid {
            return Err(Error::InvalidAddress(address.to_string()));
        }
    }

    let min_col = min_col.map(letters_to_column).transpose()?;
    let min_row = min_row.map(|r| parse_row(r, address)).transpose()?;
    let max_col = max_col.map(letters_to_column).transpose()?.or(min_col);
    let max_row = max_row
        .map(|r| parse_row(r, address))
        .transpose()?
        .or(min_row);

    Ok(Boundaries::new(min_col, min_row, max_col, max_row))
}

/// True for text like `R1:C5` that reads as a backwards A1 range
///
/// A1 would take `R1:C5` as columns R back to C. It is row-column text (row 1
/// to column 5) and is left to that grammar rather than reordered.
pub fn is_row_column_span(address: &str) -> bool {
    regex!(r"^(R\d+:C\d+|C\d+:R\d+)$").is_match(address)
        && range_boundaries(address).is_ok_and(|b| b.is_inverted())
}

/// Remove quotes from around, and embedded `''` in, a quoted sheet name
///
/// Sheet names with special characters are quoted in formulas (`'My Sheet'!A1`).
pub fn unquote_sheetname(sheetname: &str) -> String {
    if sheetname.len() >= 2 && sheetname.starts_with('\'') && sheetname.ends_with('\'') {
        sheetname[1..sheetname.len() - 1].replace("''", "'")
    } else {
        sheetname.to_string()
    }
}

/// Split `Sheet!A1` into the sheet name and the remaining address
///
/// The `sheet` override wins when given; an embedded sheet name that differs
/// from a non-empty override is an error.
pub fn split_sheetname<'a>(address: &'a str, sheet: &str) -> Result<(String, &'a str)> {
    let separator = if address.starts_with('\'') {
        closing_quote(address).and_then(|end| {
            address[end + 1..]
                .starts_with('!')
                .then_some(end + 1)
        })
    } else {
        address.find('!')
    };

    let Some(pos) = separator else {
        return Ok((sheet.to_string(), address));
    };

    let (embedded, rest) = (&address[..pos], &address[pos + 1..]);
    if rest.contains('!') {
        return Err(Error::NotRectangular(address.to_string()));
    }

    let embedded = unquote_sheetname(embedded);
    if !embedded.is_empty() && !sheet.is_empty() && embedded != sheet {
        return Err(Error::MismatchedSheets(embedded, sheet.to_string()));
    }

    if sheet.is_empty() {
        Ok((embedded, rest))
    } else {
        Ok((sheet.to_string(), rest))
    }
}

/// Byte index of the quote closing a leading quoted sheet name
fn closing_quote(address: &str) -> Option<usize> {
    let bytes = address.as_bytes();
    let mut i = 1;
    while i < bytes.len() {
        if bytes[i] == b'\'' {
            if bytes.get(i + 1) == Some(&b'\'') {
                i += 2;
                continue;
            }
            return Some(i);
        }
        i += 1;
    }
    None
}
