//! Binary operators
//!
//! Every operator the evaluator can hand to [`apply`](crate::coerce::apply),
//! with its spreadsheet symbol and name. Symbols and names are looked up
//! through a single static table.

use crate::error::{FormulaError, FormulaResult};
use ahash::AHashMap;
use once_cell::sync::Lazy;
use std::fmt;
use std::str::FromStr;

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    // Comparison
    Equal,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,
    NotEqual,

    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    FloorDivide,
    Modulo,
    Power,

    // Bitwise
    ShiftLeft,
    ShiftRight,
    BitOr,
    BitXor,

    /// Text join; Excel spells it `&`, the symbol other languages use for bitwise and
    Concat,

    MatMul,
}

static OPERATORS: Lazy<AHashMap<&'static str, BinaryOperator>> = Lazy::new(|| {
    let mut table = AHashMap::new();
    for op in BinaryOperator::ALL {
        table.insert(op.symbol(), op);
        table.insert(op.name(), op);
    }
    // `**` is the other common spelling of power
    table.insert("**", BinaryOperator::Power);
    table
});

impl BinaryOperator {
    pub const ALL: [BinaryOperator; 19] = [
        BinaryOperator::Equal,
        BinaryOperator::LessThan,
        BinaryOperator::GreaterThan,
        BinaryOperator::LessEqual,
        BinaryOperator::GreaterEqual,
        BinaryOperator::NotEqual,
        BinaryOperator::Add,
        BinaryOperator::Subtract,
        BinaryOperator::Multiply,
        BinaryOperator::Divide,
        BinaryOperator::FloorDivide,
        BinaryOperator::Modulo,
        BinaryOperator::Power,
        BinaryOperator::ShiftLeft,
        BinaryOperator::ShiftRight,
        BinaryOperator::BitOr,
        BinaryOperator::BitXor,
        BinaryOperator::Concat,
        BinaryOperator::MatMul,
    ];

    /// The operator as written in a formula
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Equal => "=",
            BinaryOperator::LessThan => "<",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::NotEqual => "<>",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::FloorDivide => "//",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Power => "^",
            BinaryOperator::ShiftLeft => "<<",
            BinaryOperator::ShiftRight => ">>",
            BinaryOperator::BitOr => "|",
            BinaryOperator::BitXor => "xor",
            BinaryOperator::Concat => "&",
            BinaryOperator::MatMul => "@",
        }
    }

    /// Lowercase operator name, e.g. `add`
    pub fn name(&self) -> &'static str {
        match self {
            BinaryOperator::Equal => "eq",
            BinaryOperator::LessThan => "lt",
            BinaryOperator::GreaterThan => "gt",
            BinaryOperator::LessEqual => "lte",
            BinaryOperator::GreaterEqual => "gte",
            BinaryOperator::NotEqual => "noteq",
            BinaryOperator::Add => "add",
            BinaryOperator::Subtract => "sub",
            BinaryOperator::Multiply => "mult",
            BinaryOperator::Divide => "div",
            BinaryOperator::FloorDivide => "floordiv",
            BinaryOperator::Modulo => "mod",
            BinaryOperator::Power => "pow",
            BinaryOperator::ShiftLeft => "lshift",
            BinaryOperator::ShiftRight => "rshift",
            BinaryOperator::BitOr => "bitor",
            BinaryOperator::BitXor => "bitxor",
            BinaryOperator::Concat => "bitand",
            BinaryOperator::MatMul => "matmult",
        }
    }

    /// Look up an operator by symbol or by (case-insensitive) name
    pub fn lookup(token: &str) -> Option<Self> {
        OPERATORS
            .get(token)
            .or_else(|| OPERATORS.get(token.to_ascii_lowercase().as_str()))
            .copied()
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for BinaryOperator {
    type Err = FormulaError;

    fn from_str(s: &str) -> FormulaResult<Self> {
        Self::lookup(s).ok_or_else(|| FormulaError::UnknownOperator(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_symbol_and_name() {
        assert_eq!(BinaryOperator::lookup("+"), Some(BinaryOperator::Add));
        assert_eq!(BinaryOperator::lookup("&"), Some(BinaryOperator::Concat));
        assert_eq!(BinaryOperator::lookup("<>"), Some(BinaryOperator::NotEqual));
        assert_eq!(BinaryOperator::lookup("**"), Some(BinaryOperator::Power));
        assert_eq!(BinaryOperator::lookup("Mult"), Some(BinaryOperator::Multiply));
        assert_eq!(BinaryOperator::lookup("BitAnd"), Some(BinaryOperator::Concat));
        assert_eq!(BinaryOperator::lookup("?"), None);
    }

    #[test]
    fn test_every_operator_round_trips() {
        for op in BinaryOperator::ALL {
            assert_eq!(op.symbol().parse::<BinaryOperator>().unwrap(), op);
            assert_eq!(op.name().parse::<BinaryOperator>().unwrap(), op);
        }
    }
}
