//! BASIC expression engine.
//!
//! Expressions parse into an evaluation tree built with a rank stack:
//! every binary operator has a rank, and operands pushed with a higher
//! rank bind tighter. Subtraction and division are rewritten as addition of
//! a negation and multiplication by a reciprocal, so only five operator
//! families reach evaluation.
//!
//! Evaluation is pure: variables come from a [`Lookup`] and calls resolve
//! through [`Funcs`], so the same tree can run against any variable scope.

mod error;
mod evaler;
mod funcs;
mod op;
mod parse;
mod vars;

pub use error::{ExprError, FuncError};
pub use evaler::{Evaler, Expr, Stack, Transform};
pub use funcs::{Args, DefinedFn, Func, Funcs, NumberFn, ValueFn};
pub use op::Op;
pub use parse::{is_identifier, parse};
pub use vars::{Lookup, Scope, Vars};
