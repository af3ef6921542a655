use serde::Serialize;

use crate::lang::value::format_float;

/// The five arithmetic mnemonics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl ArithOp {
    pub fn mnemonic(self) -> &'static str {
        match self {
            ArithOp::Add => "ADD",
            ArithOp::Sub => "SUB",
            ArithOp::Mul => "MUL",
            ArithOp::Div => "DIV",
            ArithOp::Mod => "MOD",
        }
    }
}

/// Jump conditions, evaluated as `left <cond> right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Condition {
    Eq,
    NotEq,
    Lt,
    Gt,
    Le,
    Ge,
}

impl Condition {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Condition::Eq => "JE",
            Condition::NotEq => "JNE",
            Condition::Lt => "JL",
            Condition::Gt => "JG",
            Condition::Le => "JLE",
            Condition::Ge => "JGE",
        }
    }
}

/// Operand count variant shared by arithmetic and jump instructions.
///
/// `Simple` is the two-operand shape (`ADD x 1`), `Full` the three-operand
/// shape (`ADD x a b`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Form {
    Simple,
    Full,
}

/// Named operand slot of an instruction shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Slot {
    Target,
    Left,
    Right,
    Label,
}

impl Slot {
    pub fn name(self) -> &'static str {
        match self {
            Slot::Target => "target",
            Slot::Left => "left",
            Slot::Right => "right",
            Slot::Label => "label",
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Closed set of instruction shapes recognised by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum InstructionKind {
    /// `SET name`
    SetSimple,
    /// `SET name value`
    Set,
    /// `DECL .label`
    Declare,
    Increment,
    Decrement,
    Arithmetic(ArithOp, Form),
    Jump(Condition, Form),
    Print,
    Dump,
    Nop,
}

const TARGET: &[Slot] = &[Slot::Target];
const TARGET_RIGHT: &[Slot] = &[Slot::Target, Slot::Right];
const TARGET_LEFT_RIGHT: &[Slot] = &[Slot::Target, Slot::Left, Slot::Right];

impl InstructionKind {
    /// Every variant, in grammar priority order.
    pub const ALL: [InstructionKind; 30] = [
        InstructionKind::SetSimple,
        InstructionKind::Set,
        InstructionKind::Declare,
        InstructionKind::Increment,
        InstructionKind::Decrement,
        InstructionKind::Arithmetic(ArithOp::Add, Form::Simple),
        InstructionKind::Arithmetic(ArithOp::Add, Form::Full),
        InstructionKind::Arithmetic(ArithOp::Sub, Form::Simple),
        InstructionKind::Arithmetic(ArithOp::Sub, Form::Full),
        InstructionKind::Arithmetic(ArithOp::Mul, Form::Simple),
        InstructionKind::Arithmetic(ArithOp::Mul, Form::Full),
        InstructionKind::Arithmetic(ArithOp::Div, Form::Simple),
        InstructionKind::Arithmetic(ArithOp::Div, Form::Full),
        InstructionKind::Arithmetic(ArithOp::Mod, Form::Simple),
        InstructionKind::Arithmetic(ArithOp::Mod, Form::Full),
        InstructionKind::Jump(Condition::Eq, Form::Simple),
        InstructionKind::Jump(Condition::Eq, Form::Full),
        InstructionKind::Jump(Condition::NotEq, Form::Simple),
        InstructionKind::Jump(Condition::NotEq, Form::Full),
        InstructionKind::Jump(Condition::Lt, Form::Simple),
        InstructionKind::Jump(Condition::Lt, Form::Full),
        InstructionKind::Jump(Condition::Gt, Form::Simple),
        InstructionKind::Jump(Condition::Gt, Form::Full),
        InstructionKind::Jump(Condition::Ge, Form::Simple),
        InstructionKind::Jump(Condition::Ge, Form::Full),
        InstructionKind::Jump(Condition::Le, Form::Simple),
        InstructionKind::Jump(Condition::Le, Form::Full),
        InstructionKind::Nop,
        InstructionKind::Print,
        InstructionKind::Dump,
    ];

    pub fn mnemonic(self) -> &'static str {
        match self {
            InstructionKind::SetSimple | InstructionKind::Set => "SET",
            InstructionKind::Declare => "DECL",
            InstructionKind::Increment => "INC",
            InstructionKind::Decrement => "DEC",
            InstructionKind::Arithmetic(op, _) => op.mnemonic(),
            InstructionKind::Jump(cond, _) => cond.mnemonic(),
            InstructionKind::Print => "PRINT",
            InstructionKind::Dump => "DUMP",
            InstructionKind::Nop => "NOP",
        }
    }

    /// Operand slots this shape expects, in source order.
    pub fn slots(self) -> &'static [Slot] {
        match self {
            InstructionKind::SetSimple
            | InstructionKind::Increment
            | InstructionKind::Decrement => TARGET,
            InstructionKind::Set => TARGET_RIGHT,
            InstructionKind::Declare => &[Slot::Label],
            InstructionKind::Arithmetic(_, Form::Simple) | InstructionKind::Jump(_, Form::Simple) => {
                TARGET_RIGHT
            }
            InstructionKind::Arithmetic(_, Form::Full) | InstructionKind::Jump(_, Form::Full) => {
                TARGET_LEFT_RIGHT
            }
            InstructionKind::Print => &[Slot::Right],
            InstructionKind::Dump | InstructionKind::Nop => &[],
        }
    }
}

/// A single operand, coerced once at tokenize time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Operand {
    Integer(i64),
    Float(f64),
    /// Variable or label reference, resolved at execution time.
    Name(String),
    /// Quoted string literal, stored without its quotes.
    Text(String),
}

impl Operand {
    /// Coerces raw operand text.
    ///
    /// Numbers containing `.` or an exponent marker become `Float`, other
    /// whole numbers become `Integer` (or `Float` when they overflow `i64`),
    /// quoted spans become `Text` and everything else is kept as a `Name`.
    pub fn coerce(raw: &str) -> Operand {
        if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
            return Operand::Text(raw[1..raw.len() - 1].to_string());
        }

        let numeric_chars = !raw.is_empty()
            && raw
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
            && raw.chars().any(|c| c.is_ascii_digit());

        if numeric_chars {
            if raw.contains(['.', 'e', 'E']) {
                if let Ok(f) = raw.parse::<f64>() {
                    return Operand::Float(f);
                }
            } else if let Ok(n) = raw.parse::<i64>() {
                return Operand::Integer(n);
            } else if let Ok(f) = raw.parse::<f64>() {
                return Operand::Float(f);
            }
        }

        Operand::Name(raw.to_string())
    }
}

impl std::fmt::Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Integer(n) => write!(f, "{}", n),
            Operand::Float(n) => write!(f, "{}", format_float(*n)),
            Operand::Name(name) => write!(f, "{}", name),
            Operand::Text(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// Slot-to-operand mapping of one token, kept in source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Operands(Vec<(Slot, Operand)>);

impl Operands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `slot`, replacing any earlier binding of the same slot.
    pub fn insert(&mut self, slot: Slot, operand: Operand) {
        match self.0.iter_mut().find(|(s, _)| *s == slot) {
            Some(entry) => entry.1 = operand,
            None => self.0.push((slot, operand)),
        }
    }

    pub fn with(mut self, slot: Slot, operand: Operand) -> Self {
        self.insert(slot, operand);
        self
    }

    pub fn get(&self, slot: Slot) -> Option<&Operand> {
        self.0.iter().find(|(s, _)| *s == slot).map(|(_, op)| op)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Slot, Operand)> {
        self.0.iter()
    }
}

/// One tokenized source line. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: InstructionKind,
    pub operands: Operands,
}

impl Token {
    pub fn new(kind: InstructionKind, operands: Operands) -> Self {
        Token { kind, operands }
    }

    pub fn operand(&self, slot: Slot) -> Option<&Operand> {
        self.operands.get(slot)
    }
}

impl std::fmt::Display for Token {
    /// Canonical single-spaced form, e.g. `ADD x 1 2`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind.mnemonic())?;
        for slot in self.kind.slots() {
            if let Some(op) = self.operands.get(*slot) {
                write!(f, " {}", op)?;
            }
        }
        Ok(())
    }
}
