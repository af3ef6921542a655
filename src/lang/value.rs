use std::cmp::Ordering;

use serde::Serialize;
use thiserror::Error;

use crate::token::{ArithOp, Condition};

/// Runtime value held by a variable or produced for `PRINT`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// 64-bit signed integer.
    Integer(i64),

    /// 64-bit floating-point number.
    Float(f64),

    /// UTF-8 text, only ever produced from a quoted literal.
    Text(String),
}

/// Failure of a single arithmetic or comparison step.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("cannot {op} {left} and {right}")]
    TypeMismatch {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },
}

/// Formats a float so that it always carries a decimal point.
///
/// `2.0` stays `2.0` rather than Rust's default `2`, which keeps rendered
/// literals re-tokenizable as floats.
pub fn format_float(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 {
        format!("{:.1}", n)
    } else {
        format!("{}", n)
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
        }
    }

    fn mismatch(&self, op: &'static str, rhs: &Value) -> ValueError {
        ValueError::TypeMismatch {
            op,
            left: self.type_name(),
            right: rhs.type_name(),
        }
    }

    /// Applies `op` with `self` on the left.
    ///
    /// Integer pairs stay integers unless the result overflows, in which case
    /// the result is promoted to a float. Division of two integers truncates
    /// toward zero.
    pub fn apply(&self, op: ArithOp, rhs: &Value) -> Result<Value, ValueError> {
        let verb = match op {
            ArithOp::Add => "add",
            ArithOp::Sub => "subtract",
            ArithOp::Mul => "multiply",
            ArithOp::Div => "divide",
            ArithOp::Mod => "take the remainder of",
        };

        match (self, rhs) {
            (Value::Integer(a), Value::Integer(b)) => {
                let (a, b) = (*a, *b);
                let checked = match op {
                    ArithOp::Add => a.checked_add(b),
                    ArithOp::Sub => a.checked_sub(b),
                    ArithOp::Mul => a.checked_mul(b),
                    ArithOp::Div => {
                        if b == 0 {
                            return Err(ValueError::DivisionByZero);
                        }
                        a.checked_div(b)
                    }
                    ArithOp::Mod => {
                        if b == 0 {
                            return Err(ValueError::DivisionByZero);
                        }
                        Some(a.wrapping_rem(b))
                    }
                };
                match checked {
                    Some(n) => Ok(Value::Integer(n)),
                    None => float_op(op, a as f64, b as f64),
                }
            }
            (Value::Integer(a), Value::Float(b)) => float_op(op, *a as f64, *b),
            (Value::Float(a), Value::Integer(b)) => float_op(op, *a, *b as f64),
            (Value::Float(a), Value::Float(b)) => float_op(op, *a, *b),
            _ => Err(self.mismatch(verb, rhs)),
        }
    }

    /// Orders two values; `Ok(None)` when floats are unordered (NaN).
    pub fn compare(&self, rhs: &Value) -> Result<Option<Ordering>, ValueError> {
        match (self, rhs) {
            (Value::Integer(a), Value::Integer(b)) => Ok(Some(a.cmp(b))),
            (Value::Integer(a), Value::Float(b)) => Ok((*a as f64).partial_cmp(b)),
            (Value::Float(a), Value::Integer(b)) => Ok(a.partial_cmp(&(*b as f64))),
            (Value::Float(a), Value::Float(b)) => Ok(a.partial_cmp(b)),
            (Value::Text(a), Value::Text(b)) => Ok(Some(a.cmp(b))),
            _ => Err(self.mismatch("compare", rhs)),
        }
    }

    /// Evaluates `self <cond> rhs`.
    pub fn satisfies(&self, cond: Condition, rhs: &Value) -> Result<bool, ValueError> {
        let ord = self.compare(rhs)?;
        Ok(match cond {
            Condition::Eq => ord == Some(Ordering::Equal),
            Condition::NotEq => ord != Some(Ordering::Equal),
            Condition::Lt => ord == Some(Ordering::Less),
            Condition::Gt => ord == Some(Ordering::Greater),
            Condition::Le => matches!(ord, Some(Ordering::Less | Ordering::Equal)),
            Condition::Ge => matches!(ord, Some(Ordering::Greater | Ordering::Equal)),
        })
    }
}

fn float_op(op: ArithOp, a: f64, b: f64) -> Result<Value, ValueError> {
    let result = match op {
        ArithOp::Add => a + b,
        ArithOp::Sub => a - b,
        ArithOp::Mul => a * b,
        ArithOp::Div | ArithOp::Mod if b == 0.0 => return Err(ValueError::DivisionByZero),
        ArithOp::Div => a / b,
        ArithOp::Mod => a % b,
    };
    Ok(Value::Float(result))
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", format_float(*n)),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_arithmetic() {
        let a = Value::Integer(20);
        let b = Value::Integer(3);
        assert_eq!(a.apply(ArithOp::Add, &b), Ok(Value::Integer(23)));
        assert_eq!(a.apply(ArithOp::Sub, &b), Ok(Value::Integer(17)));
        assert_eq!(a.apply(ArithOp::Mul, &b), Ok(Value::Integer(60)));
        assert_eq!(a.apply(ArithOp::Div, &b), Ok(Value::Integer(6)));
        assert_eq!(a.apply(ArithOp::Mod, &b), Ok(Value::Integer(2)));
    }

    #[test]
    fn test_truncating_division() {
        let r = Value::Integer(-7).apply(ArithOp::Div, &Value::Integer(2));
        assert_eq!(r, Ok(Value::Integer(-3)));
        let r = Value::Integer(-7).apply(ArithOp::Mod, &Value::Integer(2));
        assert_eq!(r, Ok(Value::Integer(-1)));
    }

    #[test]
    fn test_float_promotion() {
        let r = Value::Integer(7).apply(ArithOp::Div, &Value::Float(2.0));
        assert_eq!(r, Ok(Value::Float(3.5)));
        let r = Value::Float(1.5).apply(ArithOp::Add, &Value::Integer(1));
        assert_eq!(r, Ok(Value::Float(2.5)));
    }

    #[test]
    fn test_overflow_promotes_to_float() {
        let r = Value::Integer(i64::MAX).apply(ArithOp::Add, &Value::Integer(1));
        assert!(matches!(r, Ok(Value::Float(_))));
    }

    #[test]
    fn test_division_by_zero() {
        for op in [ArithOp::Div, ArithOp::Mod] {
            assert_eq!(
                Value::Integer(1).apply(op, &Value::Integer(0)),
                Err(ValueError::DivisionByZero)
            );
            assert_eq!(
                Value::Float(1.0).apply(op, &Value::Float(0.0)),
                Err(ValueError::DivisionByZero)
            );
        }
    }

    #[test]
    fn test_text_arithmetic_is_mismatch() {
        let r = Value::Text("a".to_string()).apply(ArithOp::Add, &Value::Integer(1));
        assert!(matches!(r, Err(ValueError::TypeMismatch { .. })));
    }

    #[test]
    fn test_conditions() {
        let one = Value::Integer(1);
        let two = Value::Float(2.0);
        assert!(one.satisfies(Condition::Lt, &two).unwrap());
        assert!(one.satisfies(Condition::Le, &two).unwrap());
        assert!(one.satisfies(Condition::NotEq, &two).unwrap());
        assert!(!one.satisfies(Condition::Ge, &two).unwrap());
        assert!(Value::Integer(2).satisfies(Condition::Eq, &two).unwrap());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Integer(5).to_string(), "5");
        assert_eq!(Value::Float(3.0).to_string(), "3.0");
        assert_eq!(Value::Float(0.25).to_string(), "0.25");
        assert_eq!(Value::Text("hi".to_string()).to_string(), "hi");
    }
}
