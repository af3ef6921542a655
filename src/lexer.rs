use crate::grammar::{GRAMMAR, GrammarEntry, OperandClass};
use crate::load_error::{LoadError, UnrecognizedLine};
use crate::token::{InstructionKind, Operand, Operands, Token};

/// Splits a single source line into words.
///
/// Words are separated by spaces and tabs. A double quote at the start of a
/// word opens a string literal that runs to the next double quote and forms
/// one word, quotes included. A `#` outside a string literal starts a
/// comment that runs to end of line.
struct LineScanner {
    source: Vec<char>,
    pos: usize,
}

impl LineScanner {
    fn new(line: &str) -> Self {
        LineScanner {
            source: line.chars().collect(),
            pos: 0,
        }
    }

    fn current(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current();
        self.pos += 1;
        ch
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current() {
            if ch == ' ' || ch == '\t' || ch == '\r' {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Reads a quoted span. Returns `None` if the quote is never closed.
    fn read_string(&mut self) -> Option<String> {
        let mut word = String::new();
        word.extend(self.advance());
        loop {
            let ch = self.advance()?;
            word.push(ch);
            if ch == '"' {
                return Some(word);
            }
        }
    }

    fn read_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(ch) = self.current() {
            if matches!(ch, ' ' | '\t' | '\r' | '#') {
                break;
            }
            word.push(ch);
            self.advance();
        }
        word
    }

    /// All words of the line, or `None` for an unterminated string literal.
    fn words(mut self) -> Option<Vec<String>> {
        let mut words = Vec::new();
        loop {
            self.skip_whitespace();
            match self.current() {
                None | Some('#') => return Some(words),
                Some('"') => words.push(self.read_string()?),
                Some(_) => words.push(self.read_word()),
            }
        }
    }
}

impl GrammarEntry {
    /// Binds `words` (mnemonic first) to this entry's slots when every
    /// word is accepted by its operand class.
    fn bind(&self, words: &[String]) -> Option<Operands> {
        let (mnemonic, rest) = match words.split_first() {
            Some(split) => split,
            None => {
                // A blank or comment-only line is a no-op.
                return (self.kind == InstructionKind::Nop).then(Operands::new);
            }
        };

        if mnemonic != self.kind.mnemonic() || rest.len() != self.shape.len() {
            return None;
        }

        let mut operands = Operands::new();
        for ((word, class), slot) in rest.iter().zip(self.shape).zip(self.kind.slots()) {
            if !class.accepts(word) {
                return None;
            }
            let operand = match class {
                OperandClass::DeclLabel | OperandClass::JumpLabel => Operand::Name(word.clone()),
                _ => Operand::coerce(word),
            };
            operands.insert(*slot, operand);
        }
        Some(operands)
    }
}

/// Tokenizes one source line.
///
/// Returns `None` when no grammar entry matches the whole line.
pub fn tokenize_line(line: &str) -> Option<Token> {
    let words = LineScanner::new(line).words()?;
    GRAMMAR.iter().find_map(|entry| {
        entry
            .bind(&words)
            .map(|operands| Token::new(entry.kind, operands))
    })
}

/// Tokenizes a whole program, one instruction per line.
///
/// Every line is tokenized before any failure is reported, so the error
/// lists all unrecognized lines at once.
pub fn tokenize_program(source: &str) -> Result<Vec<Token>, LoadError> {
    let mut tokens = Vec::new();
    let mut unrecognized = Vec::new();

    for (index, line) in source.lines().enumerate() {
        match tokenize_line(line) {
            Some(token) => tokens.push(token),
            None => unrecognized.push(UnrecognizedLine {
                line: index + 1,
                text: line.to_string(),
            }),
        }
    }

    if unrecognized.is_empty() {
        Ok(tokens)
    } else {
        Err(LoadError::UnrecognizedLines(unrecognized))
    }
}
