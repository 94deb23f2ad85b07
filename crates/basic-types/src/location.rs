use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a statement line lives.
///
/// `line` is the BASIC line number; `source_line` is the 1-based physical
/// line of the source file it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub line: u32,
    pub source_line: usize,
}

impl Location {
    pub fn new(line: u32, source_line: usize) -> Self {
        Self { line, source_line }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} (source line {})", self.line, self.source_line)
    }
}
