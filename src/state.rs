use std::collections::HashMap;
use std::rc::Rc;

use serde::Serialize;

use crate::lang::value::Value;
use crate::runtime_error::ExecError;
use crate::token::Token;

const DUMP_HEADER: &str = "-------------DUMPING PROGRAM STATE-------------";
const DUMP_FOOTER: &str = "-----------END DUMPING PROGRAM STATE-----------";

/// Everything a running program can observe or change.
///
/// The instruction list and label table are fixed at load time; only the
/// variables, the instruction pointer and the diagnostics change while the
/// program runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramState {
    pub variables: HashMap<String, Value>,
    labels: HashMap<String, usize>,
    #[serde(skip)]
    instructions: Rc<[Token]>,
    /// Index of the instruction last executed; `-1` before the first step.
    pub(crate) instruction_pointer: isize,
    pub errors: Vec<ExecError>,
    pub warnings: Vec<String>,
}

impl ProgramState {
    /// Fresh state positioned before the first instruction. Built by
    /// [`crate::loader::load_program`], which binds labels to instructions.
    pub(crate) fn new(instructions: Vec<Token>, labels: HashMap<String, usize>) -> Self {
        ProgramState {
            variables: HashMap::new(),
            labels,
            instructions: instructions.into(),
            instruction_pointer: -1,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn instructions(&self) -> &[Token] {
        &self.instructions
    }

    pub(crate) fn shared_instructions(&self) -> Rc<[Token]> {
        Rc::clone(&self.instructions)
    }

    pub fn labels(&self) -> &HashMap<String, usize> {
        &self.labels
    }

    pub fn label(&self, name: &str) -> Option<usize> {
        self.labels.get(name).copied()
    }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn instruction_pointer(&self) -> isize {
        self.instruction_pointer
    }

    /// True once the pointer sits on (or past) the last instruction, or the
    /// program is empty; stepping a terminal state changes nothing.
    pub fn is_terminal(&self) -> bool {
        self.instruction_pointer >= self.instructions.len() as isize - 1
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Framed multi-line rendering written by `DUMP`.
    pub fn render_dump(&self) -> String {
        format!("{}\n{}\n{}\n", DUMP_HEADER, self, DUMP_FOOTER)
    }
}

fn sorted<'a, V>(map: &'a HashMap<String, V>) -> Vec<(&'a String, &'a V)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}

fn write_list<T: std::fmt::Display>(
    f: &mut std::fmt::Formatter<'_>,
    items: &[T],
) -> std::fmt::Result {
    write!(f, "[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, "]")
}

impl std::fmt::Display for ProgramState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "ProgramState: [")?;
        writeln!(f, "\tcurrent line: {}", self.instruction_pointer + 1)?;

        write!(f, "\tvariables: {{")?;
        for (i, (name, value)) in sorted(&self.variables).into_iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match value {
                Value::Text(s) => write!(f, "{}: \"{}\"", name, s)?,
                other => write!(f, "{}: {}", name, other)?,
            }
        }
        writeln!(f, "}}")?;

        write!(f, "\tlabels: {{")?;
        for (i, (name, index)) in sorted(&self.labels).into_iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, index)?;
        }
        writeln!(f, "}}")?;

        write!(f, "\twarnings: ")?;
        write_list(f, &self.warnings)?;
        writeln!(f)?;

        write!(f, "\terrors: ")?;
        write_list(f, &self.errors)?;
        writeln!(f)?;

        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize_program;

    fn state(source: &str, labels: &[(&str, usize)]) -> ProgramState {
        let labels = labels.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        ProgramState::new(tokenize_program(source).unwrap(), labels)
    }

    #[test]
    fn test_new_state_before_first_instruction() {
        let ps = state("SET x 1\nPRINT x\n", &[]);
        assert_eq!(ps.instruction_pointer(), -1);
        assert_eq!(ps.instructions().len(), 2);
        assert!(!ps.is_terminal());
        assert!(!ps.has_errors());
    }

    #[test]
    fn test_empty_program_is_terminal() {
        let ps = state("", &[]);
        assert!(ps.is_terminal());
    }

    #[test]
    fn test_display() {
        let mut ps = state("DECL .top\nSET b 2\n", &[(".top", 0)]);
        ps.variables.insert("b".to_string(), Value::Integer(2));
        ps.variables.insert("a".to_string(), Value::Float(1.5));
        ps.errors.push(ExecError::DivisionByZero { line: 2 });

        let expected = "ProgramState: [\n\
                        \tcurrent line: 0\n\
                        \tvariables: {a: 1.5, b: 2}\n\
                        \tlabels: {.top: 0}\n\
                        \twarnings: []\n\
                        \terrors: [Division by zero on line 2]\n\
                        ]";
        assert_eq!(ps.to_string(), expected);
    }

    #[test]
    fn test_render_dump_is_framed() {
        let ps = state("NOP\n", &[]);
        let dump = ps.render_dump();
        assert!(dump.starts_with(DUMP_HEADER));
        assert!(dump.ends_with(&format!("{}\n", DUMP_FOOTER)));
    }

    #[test]
    fn test_serialize_skips_instructions() {
        let mut ps = state("SET x 3\n", &[]);
        ps.variables.insert("x".to_string(), Value::Integer(3));
        let json = serde_json::to_value(&ps).unwrap();
        assert_eq!(json["variables"]["x"], 3);
        assert_eq!(json["instruction_pointer"], -1);
        assert!(json.get("instructions").is_none());
    }
}
