//! BASIC statement parser: numbered source lines to statement trees.
//!
//! Each line is split on `:` into statements, and each statement is matched
//! against an ordered grammar table. Captured fields are parsed further into
//! expressions, targets and PRINT lists.

mod ast;
mod error;
mod parse_items;
mod parse_stmt;
mod parser;

pub use ast::{ArrayDecl, ArrayRef, Line, PrintItem, Program, Stmt, Target};
pub use error::ParseError;
pub use parser::{StatementParser, GRAMMAR};

use basic_lexer::{load_file, load_str, PatternError, RawLine};
use basic_types::{BasicError, Diagnostics, ErrorCode};
use std::path::Path;

fn grammar_error(err: PatternError) -> Diagnostics {
    Diagnostics::from(BasicError::new(
        ErrorCode::GRAMMAR_INVALID,
        format!("statement grammar: {err}"),
    ))
}

/// Parse already-loaded lines.
pub fn parse_lines(lines: &[RawLine]) -> Result<Program, Diagnostics> {
    StatementParser::new()
        .map_err(grammar_error)?
        .parse_program(lines)
}

/// Load and parse program text.
pub fn parse_source(source: &str) -> Result<Program, Diagnostics> {
    let lines = load_str(source).map_err(|e| Diagnostics::from(e.to_diagnostic()))?;
    parse_lines(&lines)
}

/// Load and parse a program file.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Program, Diagnostics> {
    let lines = load_file(path).map_err(|e| Diagnostics::from(e.to_diagnostic()))?;
    parse_lines(&lines)
}
