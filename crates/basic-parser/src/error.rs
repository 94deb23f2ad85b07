use basic_expr::ExprError;
use basic_types::ErrorCode;
use thiserror::Error;

/// Errors from parsing one statement.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("empty statement")]
    EmptyStatement,

    #[error("unrecognized statement {0:?}")]
    UnknownStatement(String),

    #[error("invalid {what} {text:?}")]
    Invalid { what: &'static str, text: String },

    #[error("line number {0} is out of range")]
    LineNumber(i64),

    #[error("expression {raw:?}: {source}")]
    Expr {
        raw: String,
        #[source]
        source: ExprError,
    },
}

impl ParseError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ParseError::EmptyStatement | ParseError::UnknownStatement(_) => {
                ErrorCode::UNKNOWN_STATEMENT
            }
            ParseError::Invalid { .. } => ErrorCode::INVALID_TARGET,
            ParseError::LineNumber(_) => ErrorCode::INVALID_STATEMENT,
            ParseError::Expr { .. } => ErrorCode::EXPRESSION_INVALID,
        }
    }

    pub(crate) fn invalid(what: &'static str, text: &str) -> Self {
        ParseError::Invalid {
            what,
            text: text.to_string(),
        }
    }
}
