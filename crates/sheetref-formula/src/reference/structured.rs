//! Structured references to table rows and columns
//!
//! `Sales[Units]`, `Sales[[#Totals],[Units]]`, `Sales[@Price]`,
//! `Sales[[#All],[Region]:[Units]]` and friends. See
//! <https://support.microsoft.com/en-us/office/using-structured-references-with-excel-tables-f5ed2452-2337-4f71-bed3-c8ae6d2b276e>.

use super::{ReferenceResolver, Request, Resolved};
use crate::error::{FormulaError, FormulaResult};
use lazy_regex::regex;
use sheetref_core::{Boundaries, TableDefinition};

/// Which rows of the table a reference selects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowSpan {
    All,
    Data,
    Headers,
    Totals,
    ThisRow,
}

impl RowSpan {
    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "#All" => Some(RowSpan::All),
            "#Data" => Some(RowSpan::Data),
            "#Headers" => Some(RowSpan::Headers),
            "#Totals" => Some(RowSpan::Totals),
            "#This Row" => Some(RowSpan::ThisRow),
            _ => None,
        }
    }
}

/// A parsed selector: rows plus an optional `start:end` column span
#[derive(Debug, Clone, PartialEq, Eq)]
struct Selector<'s> {
    rows: RowSpan,
    start_col: Option<&'s str>,
    end_col: Option<&'s str>,
}

pub(super) fn resolve(
    resolver: &ReferenceResolver<'_>,
    request: &Request<'_>,
) -> FormulaResult<Option<Resolved>> {
    let address = request.raw;
    let Some(caps) = regex!(r"^(?P<table_name>[^\[]+)\[(?P<table_selector>.*)\]$").captures(address)
    else {
        return Ok(None);
    };
    let name = caps.name("table_name").map_or("", |m| m.as_str());
    let selector = caps.name("table_selector").map_or("", |m| m.as_str());

    let unknown_table = || FormulaError::UnknownTable {
        table: name.to_string(),
        reference: address.to_string(),
    };
    let tables = resolver.tables.ok_or_else(unknown_table)?;
    let (table, sheet) = tables
        .table(name, request.sheet)
        .ok_or_else(unknown_table)?;
    let bounds = table.boundaries()?;

    let selector = parse_selector(selector, address)?;

    let rows = row_span(table, &bounds, selector.rows, request, address)?;
    let cols = col_span(table, &bounds, &selector, address)?;

    if rows.0 > rows.1 || cols.0 > cols.1 {
        return Err(FormulaError::OutOfOrder(address.to_string()));
    }
    let to_index = |n: i64| u32::try_from(n).map_err(|_| FormulaError::OutOfOrder(address.to_string()));
    let boundaries = Boundaries::range(
        to_index(cols.0)?,
        to_index(rows.0)?,
        to_index(cols.1)?,
        to_index(rows.1)?,
    );

    Ok(Some((boundaries, sheet.to_string())))
}

fn parse_selector<'s>(selector: &'s str, address: &str) -> FormulaResult<Selector<'s>> {
    let unsupported = || FormulaError::UnsupportedSelector(selector.to_string());

    if selector.is_empty() {
        return Ok(Selector {
            rows: RowSpan::Data,
            start_col: None,
            end_col: None,
        });
    }

    let caps = regex!(
        r"^(?P<row_or_column>[^\[]+)$|^@\[(?P<this_row_column>[^\[]*)\]$|^ *(?P<rows>(\[([^\]]+)\] *, *)*)(\[(?P<start_col>[^\]]+)\] *: *)?(\[(?P<end_col>.+)\] *)?$"
    )
    .captures(selector)
    .ok_or_else(unsupported)?;
    let group = |name: &str| caps.name(name).map(|m| m.as_str());

    let (mut rows, start_col, mut end_col) = if let Some(item) = group("row_or_column") {
        (None, None, Some(item))
    } else if let Some(column) = group("this_row_column") {
        (Some(RowSpan::ThisRow), None, Some(column))
    } else {
        let rows = match group("rows").filter(|r| !r.is_empty()) {
            None => None,
            Some(rows) => {
                let keywords: Vec<&str> = rows
                    .split('[')
                    .skip(1)
                    .filter_map(|r| r.split(']').next())
                    .collect();
                match keywords.as_slice() {
                    [keyword] => Some(RowSpan::from_keyword(keyword).ok_or_else(unsupported)?),
                    // several row selectors in one reference
                    _ => return Err(FormulaError::UnsupportedSelector(address.to_string())),
                }
            }
        };
        (rows, group("start_col"), group("end_col"))
    };

    match end_col {
        Some(item) if item.starts_with('#') => {
            if rows.is_some() {
                // `[#Headers],[#Data]` and the like
                return Err(FormulaError::UnsupportedSelector(address.to_string()));
            }
            if start_col.is_none() {
                rows = Some(RowSpan::from_keyword(item).ok_or_else(unsupported)?);
                end_col = None;
            }
        }
        Some(item) if item.starts_with('@') => {
            rows = Some(RowSpan::ThisRow);
            end_col = Some(&item[1..]).filter(|c| !c.is_empty()).or(start_col);
        }
        Some(_) => {}
        None if start_col.is_some() => return Err(unsupported()),
        None => {}
    }

    Ok(Selector {
        rows: rows.unwrap_or(RowSpan::Data),
        start_col,
        end_col,
    })
}

/// First and last row of the selection
fn row_span(
    table: &TableDefinition,
    bounds: &Boundaries,
    rows: RowSpan,
    request: &Request<'_>,
    address: &str,
) -> FormulaResult<(i64, i64)> {
    let top = i64::from(bounds.min_row.unwrap_or(0));
    let bottom = i64::from(bounds.max_row.unwrap_or(0));
    let headers = i64::from(table.header_row_count);
    let totals = i64::from(table.totals_row_count);

    Ok(match rows {
        RowSpan::All => (top, bottom),
        RowSpan::Data => (top + headers, bottom - totals),
        RowSpan::Headers => (top, top + headers - 1),
        RowSpan::Totals => (bottom - totals + 1, bottom),
        RowSpan::ThisRow => {
            let anchor = request
                .anchor
                .ok_or_else(|| FormulaError::MissingAnchor(address.to_string()))?;
            let row = i64::from(anchor.row());
            (row, row)
        }
    })
}

/// First and last column of the selection
fn col_span(
    table: &TableDefinition,
    bounds: &Boundaries,
    selector: &Selector<'_>,
    address: &str,
) -> FormulaResult<(i64, i64)> {
    let left = i64::from(bounds.min_col.unwrap_or(0));
    let column = |name: &str| {
        table
            .column_index(name)
            .map(|idx| left + idx as i64)
            .ok_or_else(|| FormulaError::UnknownColumn {
                column: name.to_string(),
                reference: address.to_string(),
            })
    };

    let Some(end_col) = selector.end_col else {
        return Ok((left, i64::from(bounds.max_col.unwrap_or(0))));
    };
    let max = column(end_col)?;
    let min = match selector.start_col {
        Some(start_col) => column(start_col)?,
        None => max,
    };
    Ok((min, max))
}
