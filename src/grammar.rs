//! # Instruction grammar
//!
//! The ordered table of instruction shapes. Each entry pairs an
//! [`InstructionKind`] with one operand class per slot; the tokenizer tries
//! the entries top to bottom and the first one that accepts the whole line
//! wins. Where a mnemonic has a two- and a three-operand form, the
//! two-operand form is listed first.

use crate::token::{ArithOp, Condition, Form, InstructionKind};

/// Lexical class an operand must belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandClass {
    /// `[A-Za-z][A-Za-z0-9]*`
    Identifier,
    /// `.` followed by an identifier, as accepted by `DECL`.
    DeclLabel,
    /// `.` followed by one or more ASCII alphanumerics, as accepted by jumps.
    JumpLabel,
    /// Identifier or numeric literal.
    VarOrConst,
    /// Identifier, numeric literal or quoted string literal.
    VarConstOrString,
}

impl OperandClass {
    pub fn accepts(self, word: &str) -> bool {
        match self {
            OperandClass::Identifier => is_identifier(word),
            OperandClass::DeclLabel => word.strip_prefix('.').is_some_and(is_identifier),
            OperandClass::JumpLabel => word.strip_prefix('.').is_some_and(|rest| {
                !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric())
            }),
            OperandClass::VarOrConst => is_identifier(word) || is_number(word),
            OperandClass::VarConstOrString => {
                is_identifier(word) || is_number(word) || is_string_literal(word)
            }
        }
    }
}

/// One row of the grammar table.
#[derive(Debug, Clone, Copy)]
pub struct GrammarEntry {
    pub kind: InstructionKind,
    /// One class per slot of `kind.slots()`, in the same order.
    pub shape: &'static [OperandClass],
}

use OperandClass::*;

const fn entry(kind: InstructionKind, shape: &'static [OperandClass]) -> GrammarEntry {
    GrammarEntry { kind, shape }
}

const fn arith(op: ArithOp) -> [GrammarEntry; 2] {
    [
        entry(
            InstructionKind::Arithmetic(op, Form::Simple),
            &[Identifier, VarOrConst],
        ),
        entry(
            InstructionKind::Arithmetic(op, Form::Full),
            &[Identifier, VarOrConst, VarOrConst],
        ),
    ]
}

const fn jump(cond: Condition) -> [GrammarEntry; 2] {
    [
        entry(
            InstructionKind::Jump(cond, Form::Simple),
            &[JumpLabel, VarOrConst],
        ),
        entry(
            InstructionKind::Jump(cond, Form::Full),
            &[JumpLabel, VarOrConst, VarOrConst],
        ),
    ]
}

const ADD: [GrammarEntry; 2] = arith(ArithOp::Add);
const SUB: [GrammarEntry; 2] = arith(ArithOp::Sub);
const MUL: [GrammarEntry; 2] = arith(ArithOp::Mul);
const DIV: [GrammarEntry; 2] = arith(ArithOp::Div);
const MOD: [GrammarEntry; 2] = arith(ArithOp::Mod);
const JE: [GrammarEntry; 2] = jump(Condition::Eq);
const JNE: [GrammarEntry; 2] = jump(Condition::NotEq);
const JL: [GrammarEntry; 2] = jump(Condition::Lt);
const JG: [GrammarEntry; 2] = jump(Condition::Gt);
const JGE: [GrammarEntry; 2] = jump(Condition::Ge);
const JLE: [GrammarEntry; 2] = jump(Condition::Le);

/// Grammar table in priority order.
pub const GRAMMAR: [GrammarEntry; 30] = [
    entry(InstructionKind::SetSimple, &[Identifier]),
    entry(InstructionKind::Set, &[Identifier, VarOrConst]),
    entry(InstructionKind::Declare, &[DeclLabel]),
    entry(InstructionKind::Increment, &[Identifier]),
    entry(InstructionKind::Decrement, &[Identifier]),
    ADD[0],
    ADD[1],
    SUB[0],
    SUB[1],
    MUL[0],
    MUL[1],
    DIV[0],
    DIV[1],
    MOD[0],
    MOD[1],
    JE[0],
    JE[1],
    JNE[0],
    JNE[1],
    JL[0],
    JL[1],
    JG[0],
    JG[1],
    JGE[0],
    JGE[1],
    JLE[0],
    JLE[1],
    entry(InstructionKind::Nop, &[]),
    entry(InstructionKind::Print, &[VarConstOrString]),
    entry(InstructionKind::Dump, &[]),
];

pub fn is_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric())
}

/// Optional sign, then digits with an optional fractional part, or a bare
/// fractional part. At least one digit is required.
pub fn is_number(word: &str) -> bool {
    let body = word.strip_prefix(['+', '-']).unwrap_or(word);
    let (int_part, frac_part) = match body.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (body, None),
    };

    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    let has_digit = !int_part.is_empty() || frac_part.is_some_and(|f| !f.is_empty());

    has_digit && all_digits(int_part) && frac_part.is_none_or(all_digits)
}

const STRING_PUNCTUATION: &str = "?.!,\\/-`+%#'@&^$~*()_{}[];:<>";

pub fn is_string_char(c: char) -> bool {
    c.is_alphanumeric() || c.is_whitespace() || STRING_PUNCTUATION.contains(c)
}

pub fn is_string_literal(word: &str) -> bool {
    word.len() >= 2
        && word.starts_with('"')
        && word.ends_with('"')
        && word[1..word.len() - 1].chars().all(is_string_char)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grammar_covers_every_kind_once() {
        for kind in InstructionKind::ALL {
            let count = GRAMMAR.iter().filter(|e| e.kind == kind).count();
            assert_eq!(count, 1, "{:?} appears {} times", kind, count);
        }
    }

    #[test]
    fn test_grammar_order_matches_kind_order() {
        let kinds: Vec<InstructionKind> = GRAMMAR.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, InstructionKind::ALL.to_vec());
    }

    #[test]
    fn test_shapes_match_slots() {
        for e in GRAMMAR.iter() {
            assert_eq!(e.shape.len(), e.kind.slots().len(), "{:?}", e.kind);
        }
    }

    #[test]
    fn test_simple_form_precedes_full_form() {
        for (i, e) in GRAMMAR.iter().enumerate() {
            if let InstructionKind::Arithmetic(op, Form::Full) = e.kind {
                assert_eq!(GRAMMAR[i - 1].kind, InstructionKind::Arithmetic(op, Form::Simple));
            }
            if let InstructionKind::Jump(cond, Form::Full) = e.kind {
                assert_eq!(GRAMMAR[i - 1].kind, InstructionKind::Jump(cond, Form::Simple));
            }
        }
    }

    #[test]
    fn test_identifier() {
        assert!(is_identifier("x"));
        assert!(is_identifier("counter2"));
        assert!(!is_identifier("2x"));
        assert!(!is_identifier("my_var"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn test_number() {
        for ok in ["0", "42", "-3", "+7", "2.5", "3.", ".5", "-0.25"] {
            assert!(is_number(ok), "{}", ok);
        }
        for bad in ["", "-", "+", ".", "1.2.3", "1e5", "abc", "--1"] {
            assert!(!is_number(bad), "{}", bad);
        }
    }

    #[test]
    fn test_labels() {
        assert!(DeclLabel.accepts(".loop"));
        assert!(!DeclLabel.accepts(".1loop"));
        assert!(JumpLabel.accepts(".1loop"));
        assert!(!JumpLabel.accepts("loop"));
        assert!(!JumpLabel.accepts("."));
    }

    #[test]
    fn test_string_literal() {
        assert!(is_string_literal("\"Hello, World!\""));
        assert!(is_string_literal("\"\""));
        assert!(!is_string_literal("\"a = b\""));
        assert!(!is_string_literal("\"a | b\""));
        assert!(!is_string_literal("\"open"));
    }
}
