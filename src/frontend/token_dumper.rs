use std::io::{self, Write};

use crate::token::{InstructionKind, Token};

/// Prints a tokenized program, one instruction per line, for `--tokens`.
pub struct TokenDumper {
    pub color: bool,
    pub show_debug_repr: bool, // if false, prints the canonical source form
}

impl Default for TokenDumper {
    fn default() -> Self {
        Self {
            color: true,
            show_debug_repr: true,
        }
    }
}

impl TokenDumper {
    // ANSI colors
    const RESET: &'static str = "\x1b[0m";
    const DIM: &'static str = "\x1b[2m";
    const GRN: &'static str = "\x1b[32m";
    const YEL: &'static str = "\x1b[33m";
    const CYN: &'static str = "\x1b[36m";
    const MAG: &'static str = "\x1b[35m";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn pretty(mut self) -> Self {
        self.show_debug_repr = false;
        self
    }

    pub fn dump<W: Write>(&self, tokens: &[Token], out: &mut W) -> io::Result<()> {
        for (index, token) in tokens.iter().enumerate() {
            self.write_one(index + 1, token, out)?;
        }
        Ok(())
    }

    fn write_one<W: Write>(&self, line: usize, token: &Token, out: &mut W) -> io::Result<()> {
        let kind = self.kind(token.kind);
        let colr = if self.color { self.color(token.kind) } else { "" };
        let reset = if self.color { Self::RESET } else { "" };

        if self.show_debug_repr {
            let operands: Vec<String> = token
                .operands
                .iter()
                .map(|(slot, op)| format!("{}={:?}", slot, op))
                .collect();
            writeln!(
                out,
                "[{:03}] {}{:<6} {:<24} {}{}",
                line,
                colr,
                kind,
                token.to_string(),
                operands.join(" "),
                reset
            )
        } else {
            writeln!(out, "[{:03}] {}{:<6} {}{}", line, colr, kind, token, reset)
        }
    }

    fn kind(&self, kind: InstructionKind) -> &'static str {
        match kind {
            InstructionKind::SetSimple | InstructionKind::Set => "SET",
            InstructionKind::Declare => "LABEL",
            InstructionKind::Increment | InstructionKind::Decrement => "STEP",
            InstructionKind::Arithmetic(..) => "ARITH",
            InstructionKind::Jump(..) => "JUMP",
            InstructionKind::Print | InstructionKind::Dump => "IO",
            InstructionKind::Nop => "NOP",
        }
    }

    fn color(&self, kind: InstructionKind) -> &'static str {
        match kind {
            InstructionKind::Nop => Self::DIM,
            InstructionKind::Declare => Self::YEL,
            InstructionKind::Jump(..) => Self::MAG,
            InstructionKind::Print | InstructionKind::Dump => Self::GRN,
            InstructionKind::Arithmetic(..)
            | InstructionKind::Increment
            | InstructionKind::Decrement => Self::CYN,
            InstructionKind::SetSimple | InstructionKind::Set => Self::RESET,
        }
    }
}
