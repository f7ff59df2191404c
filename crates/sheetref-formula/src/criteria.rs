//! Criteria matching for COUNTIF, SUMIF and related functions
//!
//! Criteria can be:
//! - A number: matches numbers equal to it (e.g. `5`)
//! - A comparison expression: `>5`, `>=10`, `<100`, `<=50`, `<>0`, `=5`
//! - A text string: case-insensitive equality (e.g. `"apple"`)
//!
//! Any criteria with a comparison operator compares numerically, so `">abc"`
//! is rejected rather than silently matching nothing.

use crate::coerce::is_number;
use crate::error::{FormulaError, FormulaResult};
use crate::util::Nested;
use sheetref_core::CellValue;

/// A parsed criteria
#[derive(Debug, Clone, PartialEq)]
pub enum Criteria {
    /// Exact number match
    Number(f64),
    /// Comparison with a number
    Comparison(ComparisonOp, f64),
    /// Case-insensitive text equality; holds the lowercase text
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
}

impl ComparisonOp {
    fn eval(self, a: f64, b: f64) -> bool {
        match self {
            ComparisonOp::Equal => a == b,
            ComparisonOp::NotEqual => a != b,
            ComparisonOp::LessThan => a < b,
            ComparisonOp::LessEqual => a <= b,
            ComparisonOp::GreaterThan => a > b,
            ComparisonOp::GreaterEqual => a >= b,
        }
    }
}

/// Split a leading comparison operator off criteria text
fn split_operator(s: &str) -> (Option<ComparisonOp>, &str) {
    // longer operators first
    const PREFIXES: [(&str, ComparisonOp); 6] = [
        (">=", ComparisonOp::GreaterEqual),
        ("<=", ComparisonOp::LessEqual),
        ("<>", ComparisonOp::NotEqual),
        (">", ComparisonOp::GreaterThan),
        ("<", ComparisonOp::LessThan),
        ("=", ComparisonOp::Equal),
    ];

    PREFIXES
        .iter()
        .find_map(|(prefix, op)| s.strip_prefix(prefix).map(|rest| (Some(*op), rest)))
        .unwrap_or((None, s))
}

/// Parse criteria as written in a COUNTIF-style function argument
///
/// # Examples
/// ```
/// use sheetref_core::CellValue;
/// use sheetref_formula::criteria::criteria_parser;
///
/// let criteria = criteria_parser(&">=10".into()).unwrap();
/// assert!(criteria.matches(&CellValue::Number(12.0)));
/// assert!(!criteria.matches(&CellValue::Number(9.0)));
///
/// assert!(criteria_parser(&">apple".into()).is_err());
/// ```
pub fn criteria_parser(criteria: &CellValue) -> FormulaResult<Criteria> {
    match criteria {
        CellValue::Number(n) => Ok(Criteria::Number(*n)),
        CellValue::Boolean(b) => Ok(Criteria::Number(f64::from(u8::from(*b)))),
        CellValue::String(s) => {
            let s = s.as_str();
            if is_number(s) {
                return parse_number(s).map(Criteria::Number);
            }

            match split_operator(s) {
                (Some(op), rest) if is_number(rest) => {
                    parse_number(rest).map(|n| Criteria::Comparison(op, n))
                }
                (Some(_), _) => Err(FormulaError::Criteria(format!(
                    "cannot compare non-numeric items against {}",
                    s
                ))),
                (None, text) => Ok(Criteria::Text(text.to_lowercase())),
            }
        }
        other => Err(FormulaError::Criteria(format!(
            "couldn't parse criteria: {}",
            other
        ))),
    }
}

fn parse_number(s: &str) -> FormulaResult<f64> {
    s.trim()
        .parse()
        .map_err(|_| FormulaError::Criteria(s.to_string()))
}

impl Criteria {
    /// Check if a value matches the criteria
    ///
    /// Numeric criteria only match numbers and booleans, never numeric text.
    pub fn matches(&self, value: &CellValue) -> bool {
        match (self, value) {
            (Criteria::Text(text), CellValue::String(s)) => s.as_str().to_lowercase() == *text,
            (Criteria::Text(text), CellValue::Empty) => text.is_empty(),
            (Criteria::Text(_), _) => false,
            (Criteria::Number(n), value) => value.as_number() == Some(*n),
            (Criteria::Comparison(op, n), value) => {
                value.as_number().map_or(false, |v| op.eval(v, *n))
            }
        }
    }
}

/// Indices of the items in `range` that satisfy `criteria`
///
/// A collection-valued criteria is not supported and matches nothing.
pub fn find_corresponding_index(
    range: &[CellValue],
    criteria: &Nested<CellValue>,
) -> FormulaResult<Vec<usize>> {
    let criteria = match criteria {
        Nested::Item(value) => criteria_parser(value)?,
        Nested::List(_) => return Ok(Vec::new()),
    };

    Ok(range
        .iter()
        .enumerate()
        .filter(|(_, item)| criteria.matches(item))
        .map(|(index, _)| index)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Criteria {
        criteria_parser(&s.into()).unwrap()
    }

    #[test]
    fn test_number_criteria() {
        let criteria = criteria_parser(&CellValue::Number(5.0)).unwrap();
        assert!(criteria.matches(&CellValue::Number(5.0)));
        assert!(!criteria.matches(&CellValue::Number(4.0)));
        assert!(!criteria.matches(&CellValue::from("5")));

        assert_eq!(parse("5"), Criteria::Number(5.0));
        assert!(parse("1").matches(&CellValue::Boolean(true)));
    }

    #[test]
    fn test_comparison_criteria() {
        let gt = parse(">5");
        assert!(gt.matches(&CellValue::Number(6.0)));
        assert!(!gt.matches(&CellValue::Number(5.0)));

        let ge = parse(">=5");
        assert!(ge.matches(&CellValue::Number(5.0)));
        assert!(!ge.matches(&CellValue::Number(4.0)));

        let lt = parse("<5");
        assert!(lt.matches(&CellValue::Number(4.0)));
        assert!(!lt.matches(&CellValue::Number(5.0)));

        let le = parse("<=5");
        assert!(le.matches(&CellValue::Number(5.0)));
        assert!(!le.matches(&CellValue::Number(6.0)));

        let ne = parse("<>5");
        assert!(ne.matches(&CellValue::Number(4.0)));
        assert!(!ne.matches(&CellValue::Number(5.0)));

        let eq = parse("=-2.5");
        assert!(eq.matches(&CellValue::Number(-2.5)));

        // comparisons never match text
        assert!(!gt.matches(&CellValue::from("10")));
    }

    #[test]
    fn test_text_criteria() {
        let apple = parse("apple");
        assert!(apple.matches(&CellValue::from("apple")));
        assert!(apple.matches(&CellValue::from("APPLE")));
        assert!(!apple.matches(&CellValue::from("banana")));
        assert!(!apple.matches(&CellValue::Number(1.0)));

        let blank = parse("");
        assert!(blank.matches(&CellValue::Empty));
        assert!(blank.matches(&CellValue::from("")));
    }

    #[test]
    fn test_invalid_criteria() {
        assert!(matches!(
            criteria_parser(&">apple".into()),
            Err(FormulaError::Criteria(_))
        ));
        assert!(criteria_parser(&CellValue::Empty).is_err());
    }

    #[test]
    fn test_find_corresponding_index() {
        let range: Vec<CellValue> = vec![1.into(), "a".into(), 3.into(), "A".into(), 5.into()];

        assert_eq!(
            find_corresponding_index(&range, &Nested::Item(">2".into())).unwrap(),
            vec![2, 4]
        );
        assert_eq!(
            find_corresponding_index(&range, &Nested::Item("a".into())).unwrap(),
            vec![1, 3]
        );
        assert!(find_corresponding_index(&range, &Nested::List(vec![Nested::Item(1.into())]))
            .unwrap()
            .is_empty());
    }
}
