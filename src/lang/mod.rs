//! # Runtime values
//!
//! Values held by program variables and produced by `PRINT`, together with
//! the numeric rules used by the arithmetic and jump instructions.

pub mod value;
