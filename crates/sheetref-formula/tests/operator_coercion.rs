//! Tests for binary operators over loosely typed values

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use sheetref_core::{CellError, CellValue};
use sheetref_formula::{apply, BinaryOperator, Diagnostic, IgnoreDiagnostics, Severity};

fn eval(left: impl Into<CellValue>, op: &str, right: impl Into<CellValue>) -> CellValue {
    let op: BinaryOperator = op.parse().unwrap();
    apply(&left.into(), op, &right.into(), &mut IgnoreDiagnostics)
}

fn error(code: CellError) -> CellValue {
    CellValue::Error(code)
}

/// Test that numeric text takes part in arithmetic
#[test]
fn test_numeric_text() {
    assert_eq!(eval("5", "+", "3"), CellValue::Number(8.0));
    assert_eq!(eval("5.5", "+", "3"), CellValue::Number(8.5));
    assert_eq!(eval(" 4 ", "*", 2.5), CellValue::Number(10.0));
    assert_eq!(eval("1e3", "-", 1), CellValue::Number(999.0));
    assert_eq!(eval(true, "+", true), CellValue::Number(2.0));
}

/// Test that error codes win before any coercion, DIV/0 first
#[test]
fn test_error_dominance() {
    assert_eq!(eval(CellError::Div0, "+", 1), error(CellError::Div0));
    assert_eq!(eval(CellError::Value, "+", CellError::Div0), error(CellError::Div0));
    assert_eq!(eval(CellError::Na, "*", CellError::Value), error(CellError::Value));
    assert_eq!(eval(CellError::Na, "&", CellError::Ref), error(CellError::Na));
    assert_eq!(eval("abc", "=", CellError::Num), error(CellError::Num));

    // text spelling a dominant code counts as that code
    assert_eq!(eval("#DIV/0!", "=", "x"), error(CellError::Div0));
    assert_eq!(eval("#VALUE!", "&", "x"), error(CellError::Value));
    assert_eq!(eval(CellValue::Empty, "*", "#VALUE!"), error(CellError::Value));
}

/// Test blank cells next to numbers and text
#[test]
fn test_blank_operands() {
    assert_eq!(eval(CellValue::Empty, "+", 5), CellValue::Number(5.0));
    assert_eq!(eval(5, "-", CellValue::Empty), CellValue::Number(5.0));
    assert_eq!(eval(CellValue::Empty, "&", "x"), CellValue::string("x"));
    assert_eq!(eval(CellValue::Empty, "=", ""), CellValue::Boolean(true));
    assert_eq!(eval(CellValue::Empty, "=", 0), CellValue::Boolean(true));
    assert_eq!(eval(CellValue::Empty, "&", CellValue::Empty), CellValue::string("00"));
}

/// Test equality between text, numbers and booleans
#[test]
fn test_equality() {
    assert_eq!(eval("ABC", "=", "abc"), CellValue::Boolean(true));
    assert_eq!(eval("ABC", "<>", "abd"), CellValue::Boolean(true));
    assert_eq!(eval("2", "=", 2), CellValue::Boolean(true));
    assert_eq!(eval("abc", "=", 2), CellValue::Boolean(false));
    assert_eq!(eval("abc", "<>", 2), CellValue::Boolean(true));
    assert_eq!(eval(true, "=", 1), CellValue::Boolean(true));
}

/// Test ordering comparisons
#[test]
fn test_ordering() {
    assert_eq!(eval(3, "<", 5), CellValue::Boolean(true));
    assert_eq!(eval("10", ">", 9.5), CellValue::Boolean(true));
    assert_eq!(eval("apple", "<", "banana"), CellValue::Boolean(true));
    assert_eq!(eval(2, ">=", 2), CellValue::Boolean(true));
    assert_eq!(eval("abc", "<", 2), error(CellError::Value));
}

/// Test the text join operator
#[test]
fn test_text_join() {
    assert_eq!(eval("Hello ", "&", "World"), CellValue::string("Hello World"));
    assert_eq!(eval(1, "&", 2), CellValue::string("12"));
    assert_eq!(eval("2.0", "&", "x"), CellValue::string("2x"));
    assert_eq!(eval(1.5, "&", true), CellValue::string("1.5TRUE"));
}

/// Test division, integer division, modulo and powers
#[test]
fn test_division_and_powers() {
    assert_eq!(eval(1, "/", 0), error(CellError::Div0));
    assert_eq!(eval(7, "/", 2), CellValue::Number(3.5));
    assert_eq!(eval(7, "//", 2), CellValue::Number(3.0));
    assert_eq!(eval(-7, "//", 2), CellValue::Number(-4.0));
    assert_eq!(eval(-7, "%", 3), CellValue::Number(2.0));
    assert_eq!(eval(7, "%", -3), CellValue::Number(-2.0));
    assert_eq!(eval(2, "^", 10), CellValue::Number(1024.0));
    assert_eq!(eval("4", "pow", "0.5"), CellValue::Number(2.0));
    assert_eq!(eval(-8, "^", 0.5), error(CellError::Num));
    assert_eq!(eval(0, "^", -1), error(CellError::Div0));
}

/// Test integer-only operators
#[test]
fn test_bitwise_operators() {
    assert_eq!(eval(1, "<<", 4), CellValue::Number(16.0));
    assert_eq!(eval(256, ">>", 4), CellValue::Number(16.0));
    assert_eq!(eval(6, "|", 3), CellValue::Number(7.0));
    assert_eq!(eval(6, "xor", 3), CellValue::Number(5.0));
    assert_eq!(eval(1.5, "|", 1), error(CellError::Value));
    assert_eq!(eval(1, "<<", -1), error(CellError::Num));
}

/// Test that text which is not a number is a value error
#[test]
fn test_non_numeric_text() {
    assert_eq!(eval("abc", "*", 3), error(CellError::Value));
    assert_eq!(eval("abc", "+", 3), error(CellError::Value));
    assert_eq!(eval("abc", "+", "def"), error(CellError::Value));
    assert_eq!(eval("#DIV/0!", "+", 1), error(CellError::Div0));
    assert_eq!(eval(1, "@", 2), error(CellError::Value));
}

/// Test the severity and wording of reported diagnostics
#[test]
fn test_diagnostics() {
    let mut diagnostics: Vec<Diagnostic> = Vec::new();

    let product = apply(
        &"abc".into(),
        BinaryOperator::Multiply,
        &3.into(),
        &mut diagnostics,
    );
    assert_eq!(product, error(CellError::Value));

    let quotient = apply(&1.into(), BinaryOperator::Divide, &0.into(), &mut diagnostics);
    assert_eq!(quotient, error(CellError::Div0));

    let severities: Vec<Severity> = diagnostics.iter().map(|d| d.severity).collect();
    assert_eq!(severities, vec![Severity::Warning, Severity::Error]);
    assert_eq!(diagnostics[1].message, "Values: 1 div 0");

    // propagated error codes and clean results report nothing
    diagnostics.clear();
    apply(&CellError::Na.into(), BinaryOperator::Add, &1.into(), &mut diagnostics);
    apply(&2.into(), BinaryOperator::Add, &3.into(), &mut diagnostics);
    assert!(diagnostics.is_empty());
}

proptest! {
    #[test]
    fn integer_text_adds_like_numbers(a in -1_000_000i64..1_000_000, b in -1_000_000i64..1_000_000) {
        let sum = eval(a.to_string(), "+", b.to_string());
        prop_assert_eq!(sum, CellValue::Number((a + b) as f64));
    }

    #[test]
    fn text_equality_ignores_case(s in "[a-zA-Z]{1,12}") {
        prop_assert_eq!(eval(s.to_uppercase(), "=", s.to_lowercase()), CellValue::Boolean(true));
    }

    #[test]
    fn division_by_zero_never_escapes(n in any::<f64>().prop_filter("finite", |n| n.is_finite())) {
        prop_assert_eq!(eval(n, "/", 0), error(CellError::Div0));
        prop_assert_eq!(eval(n, "%", CellValue::Empty), error(CellError::Div0));
    }
}
