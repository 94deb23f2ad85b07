//! Source loading and statement-grammar matching for BASIC.
//!
//! - [`load_str`] / [`load_file`] turn program text into [`RawLine`]s
//! - [`Pattern`] compiles a statement grammar such as
//!   `GOTO {line:int}` and captures typed fields from statement text
//! - [`PatternSet`] tries an ordered list of grammars, first match wins
//! - [`split`] holds the quote- and bracket-aware splitting primitives the
//!   rest of the interpreter shares

mod pattern;
mod set;
mod source;
pub mod split;

pub use pattern::{
    FieldValue, Fields, MatchTarget, NoMatch, Pattern, PatternError, Target, TargetKind,
};
pub use set::{scan, PatternSet, ScanError};
pub use source::{load_file, load_reader, load_str, LoadError, RawLine};
