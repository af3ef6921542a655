use std::collections::HashMap;

use crate::token::{InstructionKind, Operand, Slot, Token};

/// A `DECL` that re-binds a label declared earlier in the program.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateLabel {
    pub label: String,
    /// Instruction index of the earlier, discarded declaration.
    pub previous: usize,
    /// Instruction index of the declaration that wins.
    pub index: usize,
}

impl std::fmt::Display for DuplicateLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Label {} declared on line {} is redeclared on line {}; using line {}",
            self.label,
            self.previous + 1,
            self.index + 1,
            self.index + 1
        )
    }
}

/// Label name to instruction index, plus any duplicate declarations seen.
#[derive(Debug, Clone, Default)]
pub struct LabelTable {
    pub labels: HashMap<String, usize>,
    pub duplicates: Vec<DuplicateLabel>,
}

/// Builds the label table in one pass over the token sequence.
///
/// A label maps to the index of its own `DECL` instruction. When a label is
/// declared more than once the last declaration wins.
pub fn resolve_labels(tokens: &[Token]) -> LabelTable {
    let mut table = LabelTable::default();

    for (index, token) in tokens.iter().enumerate() {
        if token.kind != InstructionKind::Declare {
            continue;
        }
        let Some(Operand::Name(label)) = token.operand(Slot::Label) else {
            continue;
        };
        if let Some(previous) = table.labels.insert(label.clone(), index) {
            table.duplicates.push(DuplicateLabel {
                label: label.clone(),
                previous,
                index,
            });
        }
    }

    table
}
