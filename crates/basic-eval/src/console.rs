//! Text I/O used by PRINT and INPUT.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

pub trait Console {
    fn write(&mut self, text: &str) -> io::Result<()>;

    /// Next input line without its terminator, or `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>>;
}

/// The process's stdin and stdout.
#[derive(Debug, Default)]
pub struct StdConsole;

impl StdConsole {
    pub fn new() -> Self {
        Self
    }
}

impl Console for StdConsole {
    fn write(&mut self, text: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(text.as_bytes())?;
        out.flush()
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Scripted input and captured output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferConsole {
    input: VecDeque<String>,
    output: String,
}

impl BufferConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            input: lines.into_iter().map(Into::into).collect(),
            output: String::new(),
        }
    }

    pub fn push_input(&mut self, line: impl Into<String>) {
        self.input.push_back(line.into());
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn into_output(self) -> String {
        self.output
    }
}

impl Console for BufferConsole {
    fn write(&mut self, text: &str) -> io::Result<()> {
        self.output.push_str(text);
        Ok(())
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.input.pop_front())
    }
}
