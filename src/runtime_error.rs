use serde::Serialize;
use thiserror::Error;

/// Diagnostic recorded by an instruction handler.
///
/// Handlers never return these as `Err`; they append them to
/// `ProgramState::errors` and leave variables untouched. `line` is the
/// 1-based source line of the failing instruction.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind")]
pub enum ExecError {
    #[error("Unknown variable {name} on line {line}")]
    UnknownVariable { name: String, line: usize },

    #[error("Unknown label {label} on line {line}")]
    UnknownLabel { label: String, line: usize },

    #[error(
        "Invalid parameter count for {mnemonic} on line {line}: got {found}, expected {expected}"
    )]
    ArityMismatch {
        mnemonic: &'static str,
        expected: usize,
        found: usize,
        line: usize,
    },

    #[error("Division by zero on line {line}")]
    DivisionByZero { line: usize },

    #[error("{mnemonic} expects a {slot} operand on line {line}")]
    MissingOperand {
        mnemonic: &'static str,
        slot: &'static str,
        line: usize,
    },

    #[error("{mnemonic} on line {line}: {detail}")]
    TypeMismatch {
        mnemonic: &'static str,
        detail: String,
        line: usize,
    },
}

impl ExecError {
    pub fn line(&self) -> usize {
        match self {
            ExecError::UnknownVariable { line, .. }
            | ExecError::UnknownLabel { line, .. }
            | ExecError::ArityMismatch { line, .. }
            | ExecError::DivisionByZero { line }
            | ExecError::MissingOperand { line, .. }
            | ExecError::TypeMismatch { line, .. } => *line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let e = ExecError::UnknownVariable {
            name: "y".to_string(),
            line: 3,
        };
        assert_eq!(e.to_string(), "Unknown variable y on line 3");
        assert_eq!(e.line(), 3);

        let e = ExecError::DivisionByZero { line: 7 };
        assert_eq!(e.to_string(), "Division by zero on line 7");
    }

    #[test]
    fn test_serializes_with_kind_tag() {
        let e = ExecError::UnknownLabel {
            label: ".end".to_string(),
            line: 2,
        };
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["kind"], "UnknownLabel");
        assert_eq!(json["label"], ".end");
    }
}
