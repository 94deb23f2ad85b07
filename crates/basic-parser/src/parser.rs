//! Core statement parser: grammar table, line splitting, error collection.

use crate::ast::{Line, Program, Stmt};
use crate::ParseError;
use basic_lexer::split::{is_word_char, split_outside_brackets};
use basic_lexer::{PatternError, PatternSet, RawLine};
use basic_types::{BasicError, Diagnostics};
use tracing::debug;

/// Statement grammars in match order. The first grammar that matches wins,
/// so longer forms of a statement come before shorter ones.
pub const GRAMMAR: &[(&str, &str)] = &[
    ("DATA", "DATA {values:[]string}"),
    ("DEF", "DEF {fnc:string}={expr:string}"),
    ("DIM", "DIM {arrays:[]string}"),
    ("END", "END"),
    (
        "FOR_STEP",
        "FOR {var:string}={init:string} TO {limit:string} STEP {step:string}",
    ),
    ("FOR", "FOR {var:string}={init:string} TO {limit:string}"),
    ("GOSUB", "GOSUB {line:int}"),
    ("GOTO", "GOTO {line:int}"),
    (
        "IFELSELN",
        "IF {cond:string} THEN {line:int} ELSE {elseline:int}",
    ),
    (
        "IFELSESTMT",
        "IF {cond:string} THEN {stmts:string} ELSE {elsestmts:string}",
    ),
    ("IFLN", "IF {cond:string} THEN {line:int}"),
    ("IFSTMT", "IF {cond:string} THEN {stmts:string}"),
    ("IFGOTO", "IF {cond:string} GOTO {line:int}"),
    ("INPUT", "INPUT{spec:string}"),
    ("LET", "LET {target:string}={expr:string}"),
    ("NEXT", "NEXT {vars:[]string}"),
    ("NEXT_EMPTY", "NEXT"),
    ("ON_GOSUB", "ON {expr:string} GOSUB {lines:[]int}"),
    ("ON_GOTO", "ON {expr:string} GOTO {lines:[]int}"),
    ("PRINT", "PRINT{items:string}"),
    ("PRINT_EMPTY", "PRINT"),
    ("READ", "READ {targets:[]string}"),
    ("REM", "REM{text:string}"),
    ("REM_EMPTY", "REM"),
    ("RESTORE", "RESTORE"),
    ("RETURN", "RETURN"),
    ("STOP", "STOP"),
    ("ASSIGN", "{target:string}={expr:string}"),
];

/// Turns numbered source lines into statement trees.
#[derive(Debug, Clone)]
pub struct StatementParser {
    pub(crate) patterns: PatternSet,
}

impl StatementParser {
    /// Compile the statement grammar table.
    pub fn new() -> Result<Self, PatternError> {
        let mut patterns = PatternSet::new();
        for (name, grammar) in GRAMMAR {
            patterns.add(name, grammar)?;
        }
        Ok(Self { patterns })
    }

    /// Parse every line, collecting up to `MAX_ERRORS` diagnostics.
    pub fn parse_program(&self, raw: &[RawLine]) -> Result<Program, Diagnostics> {
        let mut diagnostics = Diagnostics::empty();
        let mut lines = Vec::with_capacity(raw.len());
        for raw_line in raw {
            match self.parse_line(raw_line) {
                Ok(line) => lines.push(line),
                Err(err) => diagnostics.push_error(err),
            }
        }
        if diagnostics.has_errors() {
            return Err(diagnostics);
        }
        let program = Program { lines };
        debug!(
            lines = program.len(),
            statements = program.statement_count(),
            "parsed program"
        );
        Ok(program)
    }

    /// Parse one numbered line, attaching its location to any failure.
    pub fn parse_line(&self, raw: &RawLine) -> Result<Line, BasicError> {
        let stmts = self.parse_statements(&raw.text).map_err(|err| {
            BasicError::new(err.code(), err.to_string())
                .at(basic_types::Location::new(raw.number, raw.source_line))
                .with_source_text(raw.text.trim())
        })?;
        Ok(Line {
            number: raw.number,
            source_line: raw.source_line,
            text: raw.text.clone(),
            stmts,
        })
    }

    /// Split a line on `:` outside quotes and brackets and parse each piece.
    ///
    /// `REM` and `IF` take the rest of the line, colons included.
    pub fn parse_statements(&self, text: &str) -> Result<Vec<Stmt>, ParseError> {
        let pieces = split_outside_brackets(text, ':');
        let mut stmts = Vec::with_capacity(pieces.len());
        for (idx, piece) in pieces.iter().enumerate() {
            let trimmed = piece.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed.starts_with("REM") || starts_with_word(trimmed, "IF") {
                let rest = pieces[idx..].join(":");
                stmts.push(self.parse_statement(&rest)?);
                break;
            }
            stmts.push(self.parse_statement(trimmed)?);
        }
        if stmts.is_empty() {
            return Err(ParseError::EmptyStatement);
        }
        Ok(stmts)
    }

    /// Parse a single statement.
    pub fn parse_statement(&self, text: &str) -> Result<Stmt, ParseError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ParseError::EmptyStatement);
        }
        let (fields, kind) = self
            .patterns
            .eval(text)
            .ok_or_else(|| ParseError::UnknownStatement(text.to_string()))?;
        self.build(kind, &fields)
    }
}

fn starts_with_word(text: &str, word: &str) -> bool {
    text.strip_prefix(word)
        .is_some_and(|rest| !rest.starts_with(is_word_char))
}
