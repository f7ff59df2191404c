//! Operator evaluation with spreadsheet coercion rules
//!
//! [`apply`] evaluates a single binary operator over two loosely typed values
//! the way a spreadsheet does: error codes dominate, blank cells become `0`
//! or `""`, numeric text is treated as a number, and text comparisons ignore
//! case. Faults never escape as `Err`; they come back as error-code values
//! and are reported to a [`DiagnosticSink`].

use crate::operator::BinaryOperator;
use sheetref_core::{CellError, CellValue};
use std::fmt;

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// An operand was rejected before any arithmetic was attempted
    Warning,
    /// The operation itself failed
    Error,
}

/// A note about an operator that produced an error code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}: {}", level, self.message)
    }
}

/// Receiver for diagnostics emitted while applying operators
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// A sink that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct IgnoreDiagnostics;

impl DiagnosticSink for IgnoreDiagnostics {
    fn report(&mut self, _diagnostic: Diagnostic) {}
}

/// An operand after coercion
///
/// Integers and floats are kept apart so that integer-only operators (shifts,
/// bitwise or/xor) can reject fractional input and integer arithmetic stays
/// exact.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl Operand {
    fn type_name(&self) -> &'static str {
        match self {
            Operand::Int(_) => "int",
            Operand::Float(_) => "float",
            Operand::Bool(_) => "bool",
            Operand::Text(_) => "text",
        }
    }

    fn is_text(&self) -> bool {
        matches!(self, Operand::Text(_))
    }

    fn as_float(&self) -> Option<f64> {
        match self {
            Operand::Int(n) => Some(*n as f64),
            Operand::Float(n) => Some(*n),
            Operand::Bool(b) => Some(f64::from(u8::from(*b))),
            Operand::Text(_) => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Int(n) => write!(f, "{}", n),
            Operand::Float(n) => write!(f, "{}", n),
            Operand::Bool(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            Operand::Text(s) => f.write_str(s),
        }
    }
}

/// True if `s` parses as a real number
pub fn is_number(s: &str) -> bool {
    s.trim().parse::<f64>().is_ok()
}

/// Coerce an operand to its canonical numeric-or-original form
///
/// Text without a decimal point that parses as an integer becomes an
/// integer; other numeric text becomes a float; anything else stays text.
/// Whole floats are narrowed to integers and booleans count as 1 / 0.
/// The text `#DIV/0!` cannot be coerced and yields that error code.
pub fn coerce_to_number(value: Operand) -> Result<Operand, CellError> {
    match value {
        Operand::Text(s) => {
            if s == CellError::Div0.as_str() {
                return Err(CellError::Div0);
            }
            let trimmed = s.trim();
            if !trimmed.contains('.') {
                if let Ok(n) = trimmed.parse::<i64>() {
                    return Ok(Operand::Int(n));
                }
            }
            match trimmed.parse::<f64>() {
                Ok(n) => Ok(Operand::Float(n)),
                Err(_) => Ok(Operand::Text(s)),
            }
        }
        Operand::Float(n) => Ok(narrow(n)),
        Operand::Bool(b) => Ok(Operand::Int(i64::from(b))),
        int => Ok(int),
    }
}

fn narrow(n: f64) -> Operand {
    // i64::MAX is not representable; 2^63 would round-trip through `as` wrongly
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if n.is_finite() && n.fract() == 0.0 && (-LIMIT..LIMIT).contains(&n) {
        Operand::Int(n as i64)
    } else {
        Operand::Float(n)
    }
}

/// Why a primitive refused its operands
enum Fault {
    DivideByZero,
    Type,
    Num,
}

/// Apply a binary operator with spreadsheet semantics
///
/// # Examples
/// ```
/// use sheetref_core::CellValue;
/// use sheetref_formula::coerce::{apply, IgnoreDiagnostics};
/// use sheetref_formula::BinaryOperator;
///
/// let sum = apply(&"5".into(), BinaryOperator::Add, &"3".into(), &mut IgnoreDiagnostics);
/// assert_eq!(sum, CellValue::Number(8.0));
///
/// let same = apply(&"ABC".into(), BinaryOperator::Equal, &"abc".into(), &mut IgnoreDiagnostics);
/// assert_eq!(same, CellValue::Boolean(true));
/// ```
pub fn apply<D>(
    left: &CellValue,
    op: BinaryOperator,
    right: &CellValue,
    diagnostics: &mut D,
) -> CellValue
where
    D: DiagnosticSink + ?Sized,
{
    for dominant in [CellError::Div0, CellError::Value] {
        if error_code(left) == Some(dominant) || error_code(right) == Some(dominant) {
            return CellValue::Error(dominant);
        }
    }
    if let Some(err) = left.error().or_else(|| right.error()) {
        return CellValue::Error(err);
    }

    let left_op = fill_blank(left, right);
    let right_op = fill_blank(right, left);

    let (left_op, right_op) = match op {
        BinaryOperator::Equal | BinaryOperator::NotEqual
            if left_op.is_text() && right_op.is_text() =>
        {
            (lowercase(left_op), lowercase(right_op))
        }
        BinaryOperator::Concat => {
            let joined = text_join(left_op, right_op);
            return match joined {
                Ok(text) => CellValue::string(text),
                Err(err) => coercion_failed(err, op, diagnostics),
            };
        }
        _ => match (coerce_to_number(left_op), coerce_to_number(right_op)) {
            (Ok(l), Ok(r)) => (l, r),
            (Err(err), _) | (_, Err(err)) => return coercion_failed(err, op, diagnostics),
        },
    };

    if op == BinaryOperator::Multiply && (left_op.is_text() || right_op.is_text()) {
        diagnostics.report(Diagnostic::warning(format!(
            "Cannot multiply type: {}({}) * {}({})",
            left_op.type_name(),
            left_op,
            right_op.type_name(),
            right_op
        )));
        return CellValue::Error(CellError::Value);
    }

    let result = match (&left_op, &right_op) {
        (Operand::Int(a), Operand::Int(b)) => int_primitive(op, *a, *b),
        (Operand::Text(a), Operand::Text(b)) => text_primitive(op, a, b),
        (a, b) => match (a.as_float(), b.as_float()) {
            (Some(a), Some(b)) => float_primitive(op, a, b),
            _ => mixed_primitive(op),
        },
    };

    let fault = match result {
        Ok(Operand::Float(n)) if !n.is_finite() => Fault::Num,
        Ok(value) => return into_cell_value(value),
        Err(fault) => fault,
    };

    let code = match fault {
        Fault::DivideByZero => CellError::Div0,
        Fault::Type => CellError::Value,
        Fault::Num => CellError::Num,
    };
    let message = format!("Values: {} {} {}", left_op, op.name(), right_op);
    log::debug!("{} -> {}", message, code);
    diagnostics.report(Diagnostic::error(message));
    CellValue::Error(code)
}

/// The error code a value carries, including text that spells one
fn error_code(value: &CellValue) -> Option<CellError> {
    match value {
        CellValue::Error(e) => Some(*e),
        CellValue::String(s) => CellError::from_code(s.as_str()),
        _ => None,
    }
}

/// A blank becomes `""` next to text and `0` otherwise
fn fill_blank(value: &CellValue, other: &CellValue) -> Operand {
    match value {
        CellValue::Empty if other.is_text() => Operand::Text(String::new()),
        CellValue::Empty => Operand::Int(0),
        CellValue::Boolean(b) => Operand::Bool(*b),
        CellValue::Number(n) => Operand::Float(*n),
        CellValue::String(s) => Operand::Text(s.as_str().to_string()),
        // errors are handled before blanks are filled
        CellValue::Error(e) => Operand::Text(e.as_str().to_string()),
    }
}

fn lowercase(value: Operand) -> Operand {
    match value {
        Operand::Text(s) => Operand::Text(s.to_lowercase()),
        other => other,
    }
}

fn text_join(left: Operand, right: Operand) -> Result<String, CellError> {
    let stringify = |value: Operand| match value {
        Operand::Bool(_) => Ok(value.to_string()),
        other => coerce_to_number(other).map(|v| v.to_string()),
    };
    Ok(stringify(left)? + &stringify(right)?)
}

fn coercion_failed<D>(err: CellError, op: BinaryOperator, diagnostics: &mut D) -> CellValue
where
    D: DiagnosticSink + ?Sized,
{
    diagnostics.report(Diagnostic::error(format!(
        "Cannot coerce {} operand for {}",
        err,
        op.name()
    )));
    CellValue::Error(err)
}

fn into_cell_value(value: Operand) -> CellValue {
    match value {
        Operand::Int(n) => CellValue::Number(n as f64),
        Operand::Float(n) => CellValue::Number(n),
        Operand::Bool(b) => CellValue::Boolean(b),
        Operand::Text(s) => CellValue::string(s),
    }
}

fn compare<T: PartialOrd + ?Sized>(op: BinaryOperator, a: &T, b: &T) -> Option<bool> {
    Some(match op {
        BinaryOperator::Equal => a == b,
        BinaryOperator::NotEqual => a != b,
        BinaryOperator::LessThan => a < b,
        BinaryOperator::GreaterThan => a > b,
        BinaryOperator::LessEqual => a <= b,
        BinaryOperator::GreaterEqual => a >= b,
        _ => return None,
    })
}

fn int_primitive(op: BinaryOperator, a: i64, b: i64) -> Result<Operand, Fault> {
    if let Some(result) = compare(op, &a, &b) {
        return Ok(Operand::Bool(result));
    }

    // Overflowing integer arithmetic continues in floating point
    let (fa, fb) = (a as f64, b as f64);
    let value = match op {
        BinaryOperator::Add => a.checked_add(b).map_or(Operand::Float(fa + fb), Operand::Int),
        BinaryOperator::Subtract => a.checked_sub(b).map_or(Operand::Float(fa - fb), Operand::Int),
        BinaryOperator::Multiply => a.checked_mul(b).map_or(Operand::Float(fa * fb), Operand::Int),
        BinaryOperator::Divide | BinaryOperator::FloorDivide | BinaryOperator::Modulo
            if b == 0 =>
        {
            return Err(Fault::DivideByZero)
        }
        BinaryOperator::Divide => Operand::Float(fa / fb),
        BinaryOperator::FloorDivide => match (a.checked_div(b), a.checked_rem(b)) {
            (Some(q), Some(r)) if r != 0 && (r < 0) != (b < 0) => Operand::Int(q - 1),
            (Some(q), Some(_)) => Operand::Int(q),
            _ => Operand::Float((fa / fb).floor()),
        },
        BinaryOperator::Modulo => match a.checked_rem(b) {
            Some(r) if r != 0 && (r < 0) != (b < 0) => Operand::Int(r + b),
            Some(r) => Operand::Int(r),
            None => Operand::Int(0),
        },
        BinaryOperator::Power if b < 0 && a == 0 => return Err(Fault::DivideByZero),
        BinaryOperator::Power => u32::try_from(b)
            .ok()
            .and_then(|exp| a.checked_pow(exp))
            .map_or(Operand::Float(fa.powf(fb)), Operand::Int),
        BinaryOperator::ShiftLeft | BinaryOperator::ShiftRight if b < 0 => {
            return Err(Fault::Num)
        }
        BinaryOperator::ShiftLeft => u32::try_from(b)
            .ok()
            .and_then(|shift| a.checked_shl(shift).filter(|v| v >> shift == a))
            .map_or(Operand::Float(fa * 2f64.powf(fb)), Operand::Int),
        BinaryOperator::ShiftRight => Operand::Int(a >> b.min(63)),
        BinaryOperator::BitOr => Operand::Int(a | b),
        BinaryOperator::BitXor => Operand::Int(a ^ b),
        _ => return Err(Fault::Type),
    };
    Ok(value)
}

fn float_primitive(op: BinaryOperator, a: f64, b: f64) -> Result<Operand, Fault> {
    if let Some(result) = compare(op, &a, &b) {
        return Ok(Operand::Bool(result));
    }

    let value = match op {
        BinaryOperator::Add => a + b,
        BinaryOperator::Subtract => a - b,
        BinaryOperator::Multiply => a * b,
        BinaryOperator::Divide | BinaryOperator::FloorDivide | BinaryOperator::Modulo
            if b == 0.0 =>
        {
            return Err(Fault::DivideByZero)
        }
        BinaryOperator::Divide => a / b,
        BinaryOperator::FloorDivide => (a / b).floor(),
        BinaryOperator::Modulo => {
            // the result takes the sign of the divisor
            let r = a % b;
            if r != 0.0 && (r < 0.0) != (b < 0.0) {
                r + b
            } else {
                r
            }
        }
        BinaryOperator::Power if a == 0.0 && b < 0.0 => return Err(Fault::DivideByZero),
        // a negative base with a fractional exponent has no real result
        BinaryOperator::Power if a < 0.0 && b.fract() != 0.0 => return Err(Fault::Num),
        BinaryOperator::Power => a.powf(b),
        _ => return Err(Fault::Type),
    };
    Ok(Operand::Float(value))
}

fn text_primitive(op: BinaryOperator, a: &str, b: &str) -> Result<Operand, Fault> {
    compare(op, a, b).map(Operand::Bool).ok_or(Fault::Type)
}

/// Text against a number: only (in)equality has an answer
fn mixed_primitive(op: BinaryOperator) -> Result<Operand, Fault> {
    match op {
        BinaryOperator::Equal => Ok(Operand::Bool(false)),
        BinaryOperator::NotEqual => Ok(Operand::Bool(true)),
        _ => Err(Fault::Type),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(left: CellValue, op: BinaryOperator, right: CellValue) -> CellValue {
        apply(&left, op, &right, &mut IgnoreDiagnostics)
    }

    #[test]
    fn test_coerce_to_number() {
        let text = |s: &str| Operand::Text(s.to_string());
        assert_eq!(coerce_to_number(text("5")), Ok(Operand::Int(5)));
        assert_eq!(coerce_to_number(text(" -12 ")), Ok(Operand::Int(-12)));
        assert_eq!(coerce_to_number(text("5.5")), Ok(Operand::Float(5.5)));
        assert_eq!(coerce_to_number(text("5.")), Ok(Operand::Float(5.0)));
        assert_eq!(coerce_to_number(text("1e3")), Ok(Operand::Float(1000.0)));
        assert_eq!(coerce_to_number(text("abc")), Ok(text("abc")));
        assert_eq!(coerce_to_number(text("#DIV/0!")), Err(CellError::Div0));
        assert_eq!(coerce_to_number(Operand::Float(4.0)), Ok(Operand::Int(4)));
        assert_eq!(coerce_to_number(Operand::Float(4.5)), Ok(Operand::Float(4.5)));
        assert_eq!(coerce_to_number(Operand::Bool(true)), Ok(Operand::Int(1)));
    }

    #[test]
    fn test_error_code_text_dominates() {
        use BinaryOperator::*;
        let div0 = CellValue::Error(CellError::Div0);
        let value = CellValue::Error(CellError::Value);

        assert_eq!(eval("#DIV/0!".into(), Equal, "x".into()), div0);
        assert_eq!(eval("x".into(), Concat, "#VALUE!".into()), value);
        assert_eq!(eval("#VALUE!".into(), Add, "#DIV/0!".into()), div0);
        // only the two dominant codes are read out of text
        assert_eq!(eval("#N/A".into(), Concat, "x".into()), CellValue::string("#N/Ax"));
    }

    #[test]
    fn test_is_number() {
        assert!(is_number("3"));
        assert!(is_number(" 2.5 "));
        assert!(is_number("-1e-3"));
        assert!(!is_number("abc"));
        assert!(!is_number(""));
    }

    #[test]
    fn test_integer_primitives() {
        use BinaryOperator::*;
        assert_eq!(eval(7.into(), FloorDivide, 2.into()), CellValue::Number(3.0));
        assert_eq!(eval((-7).into(), FloorDivide, 2.into()), CellValue::Number(-4.0));
        assert_eq!(eval((-7).into(), Modulo, 3.into()), CellValue::Number(2.0));
        assert_eq!(eval(7.into(), Modulo, (-3).into()), CellValue::Number(-2.0));
        assert_eq!(eval(2.into(), Power, 10.into()), CellValue::Number(1024.0));
        assert_eq!(eval(2.into(), Power, (-1).into()), CellValue::Number(0.5));
        assert_eq!(eval(1.into(), ShiftLeft, 4.into()), CellValue::Number(16.0));
        assert_eq!(eval(256.into(), ShiftRight, 4.into()), CellValue::Number(16.0));
        assert_eq!(eval(6.into(), BitOr, 3.into()), CellValue::Number(7.0));
        assert_eq!(eval(6.into(), BitXor, 3.into()), CellValue::Number(5.0));
    }

    #[test]
    fn test_float_primitives() {
        use BinaryOperator::*;
        assert_eq!(eval(7.5.into(), FloorDivide, 2.into()), CellValue::Number(3.0));
        assert_eq!(eval((-7.5).into(), Modulo, 2.into()), CellValue::Number(0.5));
        assert_eq!(eval(1.5.into(), ShiftLeft, 1.into()), CellValue::Error(CellError::Value));
        assert_eq!(eval((-8).into(), Power, 0.5.into()), CellValue::Error(CellError::Num));
    }

    #[test]
    fn test_overflow() {
        use BinaryOperator::*;
        let big = CellValue::Number(9.0e15);
        assert_eq!(eval(big.clone(), Multiply, big), CellValue::Number(8.1e31));
        assert_eq!(eval(10.into(), Power, 400.into()), CellValue::Error(CellError::Num));
    }

    #[test]
    fn test_other_error_codes_propagate() {
        let na = CellValue::Error(CellError::Na);
        let reference = CellValue::Error(CellError::Ref);
        assert_eq!(eval(na.clone(), BinaryOperator::Add, 1.into()), na);
        assert_eq!(eval(na.clone(), BinaryOperator::Add, reference.clone()), na);
        assert_eq!(
            eval(reference, BinaryOperator::Add, CellValue::Error(CellError::Value)),
            CellValue::Error(CellError::Value)
        );
    }

    #[test]
    fn test_diagnostic_display() {
        assert_eq!(Diagnostic::warning("careful").to_string(), "warning: careful");
        assert_eq!(Diagnostic::error("boom").to_string(), "error: boom");
    }
}
