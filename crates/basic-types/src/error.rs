use crate::Location;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of errors stored before further ones are only counted.
pub const MAX_ERRORS: usize = 20;

/// Error category, determined by error code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Load,
    Syntax,
    Expression,
    Runtime,
}

/// Numeric error code (E100–E499).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Load errors (E100–E199) ──
    pub const MISSING_SEPARATOR: Self = Self(100);
    pub const INVALID_LINE_NUMBER: Self = Self(101);
    pub const SOURCE_UNREADABLE: Self = Self(102);

    // ── Syntax errors (E200–E299) ──
    pub const UNKNOWN_STATEMENT: Self = Self(200);
    pub const INVALID_TARGET: Self = Self(201);
    pub const INVALID_STATEMENT: Self = Self(202);
    pub const GRAMMAR_INVALID: Self = Self(203);

    // ── Expression errors (E300–E399) ──
    pub const EXPRESSION_INVALID: Self = Self(300);

    // ── Runtime errors (E400–E499) ──
    pub const UNDEFINED_LINE: Self = Self(400);
    pub const TYPE_MISMATCH: Self = Self(401);
    pub const INDEX_OUT_OF_RANGE: Self = Self(402);
    pub const OUT_OF_DATA: Self = Self(403);
    pub const RETURN_WITHOUT_GOSUB: Self = Self(404);
    pub const NEXT_WITHOUT_FOR: Self = Self(405);
    pub const UNDEFINED_NAME: Self = Self(406);
    pub const STEP_LIMIT: Self = Self(407);
    pub const INPUT_CLOSED: Self = Self(408);
    pub const FUNCTION_FAILED: Self = Self(409);
    pub const CONSOLE_FAILED: Self = Self(410);

    /// Get the category for this error code.
    pub fn category(self) -> ErrorCategory {
        match self.0 {
            100..=199 => ErrorCategory::Load,
            200..=299 => ErrorCategory::Syntax,
            300..=399 => ErrorCategory::Expression,
            _ => ErrorCategory::Runtime,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load => write!(f, "load"),
            Self::Syntax => write!(f, "syntax"),
            Self::Expression => write!(f, "expression"),
            Self::Runtime => write!(f, "runtime"),
        }
    }
}

/// A structured interpreter error.
///
/// Every stage converts its own error enum into this shape so callers can
/// render or serialize failures without matching on stage-specific types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicError {
    pub code: ErrorCode,
    pub category: ErrorCategory,
    pub message: String,
    /// BASIC line number and physical source line, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// The statement text for context.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source_text: String,
}

impl BasicError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            category: code.category(),
            message: message.into(),
            location: None,
            source_text: String::new(),
        }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_source_text(mut self, text: impl Into<String>) -> Self {
        self.source_text = text.into();
        self
    }
}

impl fmt::Display for BasicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(location) = &self.location {
            write!(f, "{location}: ")?;
        }
        write!(f, "{} [{}] {}", self.code, self.category, self.message)
    }
}

impl std::error::Error for BasicError {}

/// A batch of errors, as produced by loading and parsing a whole program.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub errors: Vec<BasicError>,
    pub total_errors: usize,
}

impl Diagnostics {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// Add an error, respecting the MAX_ERRORS limit.
    pub fn push_error(&mut self, error: BasicError) {
        if self.errors.len() < MAX_ERRORS {
            self.errors.push(error);
        }
        self.total_errors += 1;
    }
}

impl From<BasicError> for Diagnostics {
    fn from(error: BasicError) -> Self {
        let mut diagnostics = Self::empty();
        diagnostics.push_error(error);
        diagnostics
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        let hidden = self.total_errors - self.errors.len();
        if hidden > 0 {
            write!(f, "\n... and {hidden} more")?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostics {}
