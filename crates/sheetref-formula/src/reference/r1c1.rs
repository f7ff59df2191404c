//! Row-column (R1C1) notation
//!
//! | Reference  | Meaning                                          |
//! |------------|--------------------------------------------------|
//! | `R2C2`     | the cell in row 2, column 2                      |
//! | `R[2]C[2]` | two rows down and two columns right of the anchor |
//! | `R[-2]C`   | two rows up, in the anchor's column              |
//! | `R1:R5`    | rows 1 through 5                                 |
//! | `C1:C5`    | columns 1 through 5                              |

use super::{ReferenceResolver, Request, Resolved};
use crate::error::{FormulaError, FormulaResult};
use lazy_regex::regex;
use sheetref_core::{AddressCell, Boundaries, MAX_COLS, MAX_ROWS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Row,
    Col,
}

impl Axis {
    fn max(self) -> u32 {
        match self {
            Axis::Row => MAX_ROWS,
            Axis::Col => MAX_COLS,
        }
    }

    fn anchor_index(self, anchor: &AddressCell) -> u32 {
        match self {
            Axis::Row => anchor.row(),
            Axis::Col => anchor.col_idx(),
        }
    }

    fn offset(self, anchor: &AddressCell, delta: i64) -> u32 {
        match self {
            Axis::Row => anchor.inc_row(delta),
            Axis::Col => anchor.inc_col(delta),
        }
    }
}

/// Presence of (min_col, min_row, max_col, max_row) allowed for a range
const VALID_RANGE_COMBOS: [(bool, bool, bool, bool); 3] = [
    (false, true, false, true),
    (true, false, true, false),
    (true, true, true, true),
];

pub(super) fn resolve(
    _: &ReferenceResolver<'_>,
    request: &Request<'_>,
) -> FormulaResult<Option<Resolved>> {
    let address = request.raw;
    let Some(caps) = regex!(
        r"^(?P<min_row>R(\[-?\d+\]|\d+)?)?(?P<min_col>C(\[-?\d+\]|\d+)?)?(:(?P<max_row>R(\[-?\d+\]|\d+)?)?(?P<max_col>C(\[-?\d+\]|\d+)?)?)?$"
    )
    .captures(address) else {
        return Ok(None);
    };

    let component = |name: &str, axis: Axis| {
        caps.name(name)
            .map(|m| to_absolute(m.as_str(), axis, request.anchor, address))
            .transpose()
    };
    let min_col = component("min_col", Axis::Col)?;
    let min_row = component("min_row", Axis::Row)?;
    let max_col = component("max_col", Axis::Col)?;
    let max_row = component("max_row", Axis::Row)?;

    let present = (
        min_col.is_some(),
        min_row.is_some(),
        max_col.is_some(),
        max_row.is_some(),
    );
    let count = [present.0, present.1, present.2, present.3]
        .iter()
        .filter(|p| **p)
        .count();

    let valid = if address.contains(':') {
        VALID_RANGE_COMBOS.contains(&present)
    } else {
        count >= 2
    };
    if !valid {
        return Err(FormulaError::InvalidReference(address.to_string()));
    }

    let boundaries = Boundaries::new(
        min_col,
        min_row,
        max_col.or(min_col),
        max_row.or(min_row),
    );
    Ok(Some((boundaries, request.sheet.to_string())))
}

/// Turn one `R…` / `C…` component into an absolute index
fn to_absolute(
    component: &str,
    axis: Axis,
    anchor: Option<&AddressCell>,
    address: &str,
) -> FormulaResult<u32> {
    let index_text = &component[1..];
    let require_anchor =
        || anchor.ok_or_else(|| FormulaError::MissingAnchor(address.to_string()));
    let invalid = || FormulaError::InvalidReference(address.to_string());

    if index_text.is_empty() {
        // bare R or C: the anchor's own row or column
        return Ok(axis.anchor_index(require_anchor()?));
    }

    if let Some(delta) = index_text.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        let delta: i64 = delta.parse().map_err(|_| invalid())?;
        return Ok(axis.offset(require_anchor()?, delta));
    }

    let index: u32 = index_text.parse().map_err(|_| invalid())?;
    if index == 0 || index > axis.max() {
        return Err(invalid());
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve_r1c1(raw: &str, anchor: Option<&AddressCell>) -> FormulaResult<Option<Boundaries>> {
        let request = Request {
            raw,
            anchor,
            sheet: "S",
        };
        resolve(&ReferenceResolver::new(), &request).map(|r| r.map(|(b, _)| b))
    }

    #[test]
    fn test_absolute_components() {
        assert_eq!(
            resolve_r1c1("R2C3", None).unwrap(),
            Some(Boundaries::cell(3, 2))
        );
        assert_eq!(
            resolve_r1c1("R1C1:R5C5", None).unwrap(),
            Some(Boundaries::range(1, 1, 5, 5))
        );
    }

    #[test]
    fn test_relative_components() {
        let anchor = AddressCell::new(3, 5, "S");
        assert_eq!(
            resolve_r1c1("R[2]C[2]", Some(&anchor)).unwrap(),
            Some(Boundaries::cell(5, 7))
        );
        assert_eq!(
            resolve_r1c1("R[-1]C", Some(&anchor)).unwrap(),
            Some(Boundaries::cell(3, 4))
        );
        assert_eq!(
            resolve_r1c1("RC[-3]", Some(&anchor)).unwrap(),
            Some(Boundaries::cell(MAX_COLS, 5))
        );
    }

    #[test]
    fn test_line_ranges() {
        let anchor = AddressCell::new(3, 5, "S");
        assert_eq!(
            resolve_r1c1("R[-1]:R[1]", Some(&anchor)).unwrap(),
            Some(Boundaries::new(None, Some(4), None, Some(6)))
        );
        assert_eq!(
            resolve_r1c1("C:C[2]", Some(&anchor)).unwrap(),
            Some(Boundaries::new(Some(3), None, Some(5), None))
        );
    }

    #[test]
    fn test_not_applicable() {
        assert_eq!(resolve_r1c1("A1", None).unwrap(), None);
        assert_eq!(resolve_r1c1("Table[Col]", None).unwrap(), None);
        assert_eq!(resolve_r1c1("r1c1", None).unwrap(), None);
    }

    #[test]
    fn test_invalid() {
        assert!(matches!(
            resolve_r1c1("R1:C5", None),
            Err(FormulaError::InvalidReference(_))
        ));
        assert!(matches!(
            resolve_r1c1("R1C1:R5", None),
            Err(FormulaError::InvalidReference(_))
        ));
        assert!(matches!(resolve_r1c1("", None), Err(FormulaError::InvalidReference(_))));
        assert!(matches!(
            resolve_r1c1("R0C1", None),
            Err(FormulaError::InvalidReference(_))
        ));
        assert!(matches!(
            resolve_r1c1("R1C16385", None),
            Err(FormulaError::InvalidReference(_))
        ));
    }

    #[test]
    fn test_missing_anchor() {
        assert!(matches!(
            resolve_r1c1("R[1]C1", None),
            Err(FormulaError::MissingAnchor(_))
        ));
        assert!(matches!(
            resolve_r1c1("RC", None),
            Err(FormulaError::MissingAnchor(_))
        ));
    }
}
