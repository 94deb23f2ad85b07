//! Runtime error types for the BASIC interpreter.

use crate::array::ArrayError;
use basic_expr::{ExprError, FuncError};
use basic_types::{BasicError, ErrorCode, Location};
use thiserror::Error;

/// A failure while executing a statement.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("no such line {0}")]
    UndefinedLine(u32),

    #[error("NEXT without FOR")]
    NextWithoutFor { var: Option<String> },

    #[error("RETURN without GOSUB")]
    ReturnWithoutGosub,

    #[error("out of DATA")]
    OutOfData,

    #[error("ON index {index} out of range 1..={len}")]
    OnIndex { index: i64, len: usize },

    #[error("no such array {0}")]
    UnknownArray(String),

    #[error("array {name}: {source}")]
    Array {
        name: String,
        #[source]
        source: ArrayError,
    },

    #[error("cannot store {value:?} in numeric {target}")]
    NotNumeric { target: String, value: String },

    #[error("loop variable {0} no longer holds a number")]
    LoopVariable(String),

    #[error("step budget of {0} statements exhausted")]
    StepLimit(u64),

    #[error("input closed while waiting for INPUT")]
    InputClosed,

    #[error("console: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Expr(#[from] ExprError),
}

impl RuntimeError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RuntimeError::UndefinedLine(_) => ErrorCode::UNDEFINED_LINE,
            RuntimeError::NextWithoutFor { .. } => ErrorCode::NEXT_WITHOUT_FOR,
            RuntimeError::ReturnWithoutGosub => ErrorCode::RETURN_WITHOUT_GOSUB,
            RuntimeError::OutOfData => ErrorCode::OUT_OF_DATA,
            RuntimeError::OnIndex { .. } => ErrorCode::INDEX_OUT_OF_RANGE,
            RuntimeError::UnknownArray(_) => ErrorCode::UNDEFINED_NAME,
            RuntimeError::Array { source, .. } => match source {
                ArrayError::Kind { .. } => ErrorCode::TYPE_MISMATCH,
                _ => ErrorCode::INDEX_OUT_OF_RANGE,
            },
            RuntimeError::NotNumeric { .. } | RuntimeError::LoopVariable(_) => {
                ErrorCode::TYPE_MISMATCH
            }
            RuntimeError::StepLimit(_) => ErrorCode::STEP_LIMIT,
            RuntimeError::InputClosed => ErrorCode::INPUT_CLOSED,
            RuntimeError::Io(_) => ErrorCode::CONSOLE_FAILED,
            RuntimeError::Expr(err) => expr_code(err),
        }
    }
}

fn expr_code(err: &ExprError) -> ErrorCode {
    match err {
        ExprError::UnknownVariable(_) | ExprError::UnknownFunction(_) => {
            ErrorCode::UNDEFINED_NAME
        }
        ExprError::Mismatch { .. } | ExprError::NotNumeric(_) | ExprError::TextOperand { .. } => {
            ErrorCode::TYPE_MISMATCH
        }
        ExprError::Call { source, .. } => match source {
            FuncError::OutOfRange(_) => ErrorCode::INDEX_OUT_OF_RANGE,
            FuncError::ArgType { .. } => ErrorCode::TYPE_MISMATCH,
            FuncError::Expr(inner) => expr_code(inner),
            FuncError::Arity { .. } | FuncError::Failed(_) => ErrorCode::FUNCTION_FAILED,
        },
        _ => ErrorCode::EXPRESSION_INVALID,
    }
}

/// A runtime failure tagged with the line that was executing.
#[derive(Debug, Error)]
#[error("line {}: {}", .location.line, .error)]
pub struct RunError {
    pub location: Location,
    pub source_text: String,
    #[source]
    pub error: RuntimeError,
}

impl RunError {
    pub fn code(&self) -> ErrorCode {
        self.error.code()
    }

    pub fn to_diagnostic(&self) -> BasicError {
        BasicError::new(self.code(), self.error.to_string())
            .at(self.location)
            .with_source_text(self.source_text.trim())
    }
}

/// Result alias for statement execution.
pub type RunResult<T> = Result<T, RuntimeError>;
