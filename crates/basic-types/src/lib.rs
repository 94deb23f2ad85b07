//! Shared types for the BASIC interpreter.
//!
//! This crate defines the dynamically typed [`Value`], statement locations,
//! and the structured diagnostics every stage (loader, parser, runtime)
//! reports through.

mod error;
mod location;
mod value;

pub use error::{BasicError, Diagnostics, ErrorCategory, ErrorCode, MAX_ERRORS};
pub use location::Location;
pub use value::{format_number, is_text_name, Value};

/// Result type used for cross-stage reporting.
pub type Result<T> = std::result::Result<T, BasicError>;
