//! Filter predicate evaluation
//!
//! One operator vocabulary for every screen. The historical UI grew
//! several spellings for the same comparison (`gt` on one panel,
//! `greater` on another); both parse to the same [`CompareOp`] so the
//! evaluation logic exists exactly once.

use thiserror::Error;

/// Tolerance for equality on currency and quantity values. Identifier
/// comparisons do not use it.
pub const MEASURE_EPSILON: f64 = 1e-6;

#[derive(Debug, Error)]
#[error("operador no válido: {0}")]
pub struct UnknownOperator(String);

/// Numeric comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompareOp {
    #[default]
    Equals,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl std::fmt::Display for CompareOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompareOp::Equals => write!(f, "equals"),
            CompareOp::Gt => write!(f, "gt"),
            CompareOp::Gte => write!(f, "gte"),
            CompareOp::Lt => write!(f, "lt"),
            CompareOp::Lte => write!(f, "lte"),
        }
    }
}

impl std::str::FromStr for CompareOp {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "equals" | "eq" | "=" | "==" => Ok(CompareOp::Equals),
            "gt" | "greater" | ">" => Ok(CompareOp::Gt),
            "gte" | "greaterorequal" | ">=" => Ok(CompareOp::Gte),
            "lt" | "less" | "<" => Ok(CompareOp::Lt),
            "lte" | "lessorequal" | "<=" => Ok(CompareOp::Lte),
            other => Err(UnknownOperator(other.to_string())),
        }
    }
}

/// Text comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextOp {
    Equals,
    #[default]
    Contains,
}

impl std::fmt::Display for TextOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextOp::Equals => write!(f, "equals"),
            TextOp::Contains => write!(f, "contains"),
        }
    }
}

impl std::str::FromStr for TextOp {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "equals" | "eq" | "=" => Ok(TextOp::Equals),
            "contains" => Ok(TextOp::Contains),
            other => Err(UnknownOperator(other.to_string())),
        }
    }
}

/// Compare a measured value (currency, quantity) against an operand.
/// Equality tolerates [`MEASURE_EPSILON`].
pub fn measure_matches(value: f64, op: CompareOp, operand: f64) -> bool {
    match op {
        CompareOp::Equals => (value - operand).abs() <= MEASURE_EPSILON,
        CompareOp::Gt => value > operand,
        CompareOp::Gte => value >= operand,
        CompareOp::Lt => value < operand,
        CompareOp::Lte => value <= operand,
    }
}

/// Compare an identifier. Exact, no epsilon.
pub fn id_matches(value: i64, op: CompareOp, operand: i64) -> bool {
    match op {
        CompareOp::Equals => value == operand,
        CompareOp::Gt => value > operand,
        CompareOp::Gte => value >= operand,
        CompareOp::Lt => value < operand,
        CompareOp::Lte => value <= operand,
    }
}

/// Case-insensitive text comparison
pub fn text_matches(value: &str, op: TextOp, operand: &str) -> bool {
    let value = value.to_lowercase();
    let operand = operand.to_lowercase();
    match op {
        TextOp::Equals => value == operand,
        TextOp::Contains => value.contains(&operand),
    }
}

/// Membership test: the field matches when, lower-cased, it equals or
/// contains any one of the selected values (logical OR across the set).
pub fn set_matches(value: &str, allowed: &[String]) -> bool {
    let value = value.to_lowercase();
    allowed.iter().any(|candidate| {
        let candidate = candidate.to_lowercase();
        value == candidate || value.contains(&candidate)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_compare_op_aliases() {
        assert_eq!(CompareOp::from_str("gt").unwrap(), CompareOp::Gt);
        assert_eq!(CompareOp::from_str("greater").unwrap(), CompareOp::Gt);
        assert_eq!(CompareOp::from_str("greaterOrEqual").unwrap(), CompareOp::Gte);
        assert_eq!(CompareOp::from_str("less").unwrap(), CompareOp::Lt);
        assert_eq!(CompareOp::from_str("lessOrEqual").unwrap(), CompareOp::Lte);
        assert_eq!(CompareOp::from_str("equals").unwrap(), CompareOp::Equals);
        assert!(CompareOp::from_str("between").is_err());
    }

    #[test]
    fn test_measure_equality_tolerates_epsilon() {
        assert!(measure_matches(0.1 + 0.2, CompareOp::Equals, 0.3));
        assert!(!measure_matches(0.31, CompareOp::Equals, 0.3));
    }

    #[test]
    fn test_measure_ordering() {
        assert!(measure_matches(10.0, CompareOp::Gt, 9.99));
        assert!(measure_matches(10.0, CompareOp::Gte, 10.0));
        assert!(measure_matches(9.0, CompareOp::Lt, 10.0));
        assert!(measure_matches(10.0, CompareOp::Lte, 10.0));
        assert!(!measure_matches(10.0, CompareOp::Lt, 10.0));
    }

    #[test]
    fn test_id_matches_is_exact() {
        assert!(id_matches(42, CompareOp::Equals, 42));
        assert!(!id_matches(42, CompareOp::Equals, 43));
        assert!(id_matches(44, CompareOp::Gt, 42));
    }

    #[test]
    fn test_text_matches_case_insensitive() {
        assert!(text_matches("Harina 000", TextOp::Contains, "harina"));
        assert!(text_matches("Harina", TextOp::Equals, "HARINA"));
        assert!(!text_matches("Harina", TextOp::Equals, "Harina 000"));
        assert!(!text_matches("Azúcar", TextOp::Contains, "harina"));
    }

    #[test]
    fn test_set_matches_any_of() {
        let allowed = vec!["Efectivo".to_string(), "Tarjeta".to_string()];
        assert!(set_matches("efectivo", &allowed));
        assert!(set_matches("Tarjeta de crédito", &allowed));
        assert!(!set_matches("Transferencia", &allowed));
        assert!(!set_matches("efectivo", &[]));
    }

    #[test]
    fn test_evaluation_is_pure() {
        // Same inputs, same output, across repeated calls
        for _ in 0..3 {
            assert!(measure_matches(5.0, CompareOp::Gte, 5.0));
            assert!(text_matches("abc", TextOp::Contains, "b"));
        }
    }
}
