//! # lineasm
//!
//! Interpreter for a small line-oriented instruction language: one
//! instruction per line (`SET`, `INC`/`DEC`, `ADD`..`MOD`, conditional jumps
//! to `DECL`ared labels, `PRINT`, `DUMP`).
//!
//! Source text is tokenized line by line against an ordered grammar table
//! ([`grammar`], [`lexer`]), labels are bound to instruction indices
//! ([`labels`]), and the [`vm::Engine`] steps a [`state::ProgramState`]
//! one instruction at a time.

pub mod frontend;
pub mod grammar;
pub mod labels;
pub mod lang;
pub mod lexer;
pub mod load_error;
pub mod loader;
pub mod log;
pub mod runtime_error;
pub mod state;
pub mod token;
pub mod vm;
