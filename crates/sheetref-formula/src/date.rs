//! Calendar helpers for the 1900 date system
//!
//! Notes:
//! - Serial dates count days from a base date, serial 1 is 1900-01-01.
//! - The 1900 system keeps the historical "1900 leap year" bug: serial 60 is
//!   the non-existent day 1900-02-29, and 1900 counts as a leap year.

use crate::error::{FormulaError, FormulaResult};
use chrono::{Datelike, Days, NaiveDate};

/// Whether `year` has a February 29th, counting 1900 as a leap year
pub fn is_leap_year(year: i32) -> FormulaResult<bool> {
    if year <= 0 {
        return Err(FormulaError::Date(format!(
            "{} must be strictly positive",
            year
        )));
    }
    Ok((year % 4 == 0 && year % 100 != 0) || year % 400 == 0 || year == 1900)
}

/// Number of days in `month` (1-12) of `year`
pub fn max_days_in_month(month: u32, year: i32) -> FormulaResult<u32> {
    let days = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year)? => 29,
        2 => 28,
        _ => return Err(FormulaError::Date(format!("month {} out of range", month))),
    };
    Ok(days)
}

/// Carry out-of-range months and days into a valid `(year, month, day)`
///
/// Month 0 is December of the previous year, month 13 is January of the
/// next. Day 0 is the last day of the previous month, and days past the
/// end of a month roll into the following ones.
///
/// ```
/// use sheetref_formula::date::normalize_year;
///
/// assert_eq!(normalize_year(2020, 14, 1).unwrap(), (2021, 2, 1));
/// assert_eq!(normalize_year(2020, 3, 0).unwrap(), (2020, 2, 29));
/// assert_eq!(normalize_year(2021, 1, -30).unwrap(), (2020, 12, 1));
/// ```
pub fn normalize_year(year: i32, month: i32, day: i32) -> FormulaResult<(i32, u32, u32)> {
    let months = i64::from(year) * 12 + i64::from(month) - 1;
    let mut y = to_year(months.div_euclid(12))?;
    let mut m = months.rem_euclid(12) as u32 + 1;
    let mut d = i64::from(day);

    while d <= 0 {
        if m == 1 {
            y -= 1;
            m = 12;
        } else {
            m -= 1;
        }
        d += i64::from(max_days_in_month(m, y)?);
    }

    loop {
        let days_in_month = i64::from(max_days_in_month(m, y)?);
        if d <= days_in_month {
            break;
        }
        d -= days_in_month;
        if m == 12 {
            y = y
                .checked_add(1)
                .ok_or_else(|| FormulaError::Date(format!("{}-{}-{}", year, month, day)))?;
            m = 1;
        } else {
            m += 1;
        }
    }

    if y <= 0 {
        return Err(FormulaError::Date(format!(
            "{}-{}-{} falls before year 1",
            year, month, day
        )));
    }
    Ok((y, m, d as u32))
}

fn to_year(year: i64) -> FormulaResult<i32> {
    i32::try_from(year).map_err(|_| FormulaError::Date(format!("year {} out of range", year)))
}

/// Convert a serial date to `(year, month, day)`
///
/// ```
/// use sheetref_formula::date::date_from_int;
///
/// assert_eq!(date_from_int(1).unwrap(), (1900, 1, 1));
/// assert_eq!(date_from_int(60).unwrap(), (1900, 2, 29));
/// assert_eq!(date_from_int(61).unwrap(), (1900, 3, 1));
/// ```
pub fn date_from_int(serial: i64) -> FormulaResult<(i32, u32, u32)> {
    // Serial 60 is the fictional 1900-02-29.
    if serial == 60 {
        return Ok((1900, 2, 29));
    }

    // serials before the fictional day are shifted by one
    let adjusted = if serial < 60 { serial + 1 } else { serial };
    let out_of_range = || FormulaError::Date(format!("serial {} out of range", serial));

    let base = NaiveDate::from_ymd_opt(1899, 12, 30).ok_or_else(out_of_range)?;
    let date = if adjusted >= 0 {
        base.checked_add_days(Days::new(adjusted.unsigned_abs()))
    } else {
        base.checked_sub_days(Days::new(adjusted.unsigned_abs()))
    }
    .ok_or_else(out_of_range)?;

    Ok((date.year(), date.month(), date.day()))
}
