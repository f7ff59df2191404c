//! Degree guess for array-entered LINEST formulas
//!
//! A polynomial fit written as `=LINEST(y, x^{1,2,3})` is entered over a row
//! (or column) of cells, one per coefficient. The degree of the fit is the
//! length of that run of identical formulas, less one.

use sheetref_core::{AddressCell, FormulaSource, MAX_COLS, MAX_ROWS};

/// Returns `(degree, coef)` for the LINEST formula at `cell`
///
/// `coef` is the 1-based position of `cell` in its run, counted from the
/// left (or top), so the highest power comes first. A lone formula is a
/// linear regression with degree 1.
pub fn linest_degree<S>(source: &S, cell: &AddressCell) -> (u32, u32)
where
    S: FormulaSource + ?Sized,
{
    let Some(formula) = source.formula_at(cell) else {
        return (1, 1);
    };

    let (mut before, mut after) = run(source, cell, formula, 0, 1, MAX_COLS);
    if before + after == 0 {
        (before, after) = run(source, cell, formula, 1, 0, MAX_ROWS);
    }

    (before.saturating_add(after).max(1), before + 1)
}

/// Count matching formulas on either side of `cell` along one axis
fn run<S>(
    source: &S,
    cell: &AddressCell,
    formula: &str,
    row_step: i64,
    col_step: i64,
    limit: u32,
) -> (u32, u32)
where
    S: FormulaSource + ?Sized,
{
    let count = |direction: i64| {
        (1..i64::from(limit))
            .take_while(|&n| {
                let neighbour =
                    cell.address_at_offset(direction * n * row_step, direction * n * col_step);
                source.formula_at(&neighbour) == Some(formula)
            })
            .count() as u32
    };
    let before = count(-1);
    let after = count(1).min(limit.saturating_sub(1).saturating_sub(before));
    (before, after)
}
