use std::fs;
use std::path::Path;

use crate::labels::resolve_labels;
use crate::lexer::tokenize_program;
use crate::load_error::LoadError;
use crate::state::ProgramState;

/// Tokenizes `source`, binds its labels and returns a fresh state ready to
/// run. Fails if any line is unrecognized.
pub fn load_program(source: &str) -> Result<ProgramState, LoadError> {
    let tokens = tokenize_program(source)?;
    let table = resolve_labels(&tokens);

    let mut state = ProgramState::new(tokens, table.labels);
    state.warnings = table.duplicates.iter().map(ToString::to_string).collect();
    Ok(state)
}

/// Reads a program's source text.
pub fn read_source(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

pub fn load_file(path: &Path) -> Result<ProgramState, LoadError> {
    load_program(&read_source(path)?)
}
