//! BASIC execution engine.
//!
//! An [`Interpreter`] owns all mutable run state (variables, arrays, the FOR
//! and GOSUB stacks, the DATA cursor) for one run of a parsed [`Program`].
//! Text I/O goes through a [`Console`], so runs can be scripted in tests.
//!
//! [`Program`]: basic_parser::Program

mod array;
mod builtins;
mod config;
mod console;
mod data;
mod error;
mod interpreter;

pub use array::{to_coord, Array, ArrayError, ArrayStore, MAX_ELEMENTS};
pub use builtins::register as register_builtins;
pub use config::{RunConfig, DEFAULT_TAB_WIDTH};
pub use console::{BufferConsole, Console, StdConsole};
pub use data::DataCursor;
pub use error::{RunError, RunResult, RuntimeError};
pub use interpreter::{run_program, ForState, Interpreter, Position, RunOutcome};
