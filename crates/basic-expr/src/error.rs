use thiserror::Error;

/// Errors from parsing or evaluating an expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("empty expression")]
    Empty,

    #[error("no closing parenthesis for '(' at offset {0}")]
    UnmatchedOpen(usize),

    #[error("unexpected ')' at offset {0}")]
    UnexpectedClose(usize),

    #[error("unterminated string starting at offset {0}")]
    UnterminatedString(usize),

    #[error("operator '{0}' has no operand")]
    MissingOperand(String),

    #[error("missing operator before {0:?}")]
    MissingOperator(String),

    #[error("invalid number {0:?}")]
    InvalidNumber(String),

    #[error("invalid operand {0:?}")]
    InvalidOperand(String),

    #[error("cannot apply '{op}' to text {operand:?}")]
    TextOperand { op: &'static str, operand: String },

    #[error("no such variable {0}")]
    UnknownVariable(String),

    #[error("no such function {0}")]
    UnknownFunction(String),

    #[error("cannot apply '{op}' to {left} and {right}")]
    Mismatch {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },

    #[error("expected a number, found {0}")]
    NotNumeric(&'static str),

    #[error("{name}: {source}")]
    Call {
        name: String,
        #[source]
        source: FuncError,
    },
}

/// Errors raised by a function body.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FuncError {
    #[error("expected {expected} argument(s), got {got}")]
    Arity { expected: String, got: usize },

    #[error("argument {index}: expected {expected}, found {found}")]
    ArgType {
        index: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{0}")]
    OutOfRange(String),

    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Expr(Box<ExprError>),
}

impl From<ExprError> for FuncError {
    fn from(err: ExprError) -> Self {
        FuncError::Expr(Box::new(err))
    }
}
