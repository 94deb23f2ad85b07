use basic_types::{BasicError, ErrorCode};
use std::io::BufRead;
use std::path::Path;
use thiserror::Error;

/// One numbered line of program text, before statement parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    /// 1-based physical line in the source file.
    pub source_line: usize,
    /// The BASIC line number.
    pub number: u32,
    /// Everything after the separator following the line number.
    pub text: String,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("source line {source_line}: no separator after line number in {text:?}")]
    MissingSeparator { source_line: usize, text: String },

    #[error("source line {source_line}: invalid line number {number:?}")]
    InvalidNumber { source_line: usize, number: String },
}

impl LoadError {
    pub fn code(&self) -> ErrorCode {
        match self {
            LoadError::Io { .. } => ErrorCode::SOURCE_UNREADABLE,
            LoadError::MissingSeparator { .. } => ErrorCode::MISSING_SEPARATOR,
            LoadError::InvalidNumber { .. } => ErrorCode::INVALID_LINE_NUMBER,
        }
    }

    pub fn to_diagnostic(&self) -> BasicError {
        let err = BasicError::new(self.code(), self.to_string());
        match self {
            LoadError::MissingSeparator { text, .. } => err.with_source_text(text.clone()),
            _ => err,
        }
    }
}

/// Load program text held in memory.
pub fn load_str(source: &str) -> Result<Vec<RawLine>, LoadError> {
    let mut lines = Vec::new();
    for (idx, line) in source.lines().enumerate() {
        if let Some(raw) = parse_raw_line(idx + 1, line)? {
            lines.push(raw);
        }
    }
    Ok(lines)
}

/// Load program text from any buffered reader.
pub fn load_reader<R: BufRead>(reader: R, name: &str) -> Result<Vec<RawLine>, LoadError> {
    let mut lines = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| LoadError::Io {
            path: name.to_string(),
            source,
        })?;
        if let Some(raw) = parse_raw_line(idx + 1, &line)? {
            lines.push(raw);
        }
    }
    Ok(lines)
}

/// Load a program file from disk.
pub fn load_file(path: impl AsRef<Path>) -> Result<Vec<RawLine>, LoadError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_str(&text)
}

fn parse_raw_line(source_line: usize, line: &str) -> Result<Option<RawLine>, LoadError> {
    let trimmed = line.trim_matches(|c| matches!(c, ' ' | '\r' | '\n' | '\t'));
    if trimmed.is_empty() {
        return Ok(None);
    }
    let Some((number, text)) = trimmed.split_once(|c: char| c.is_whitespace()) else {
        return Err(LoadError::MissingSeparator {
            source_line,
            text: trimmed.to_string(),
        });
    };
    let number = number.parse::<u32>().map_err(|_| LoadError::InvalidNumber {
        source_line,
        number: number.to_string(),
    })?;
    Ok(Some(RawLine {
        source_line,
        number,
        text: text.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_lines_skipped() {
        let lines = load_str("10 PRINT 1\n\n   \n20 END\n").unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].source_line, 1);
        assert_eq!(lines[1].source_line, 4);
        assert_eq!(lines[1].number, 20);
        assert_eq!(lines[1].text, "END");
    }

    #[test]
    fn test_crlf_trimmed() {
        let lines = load_str("10 PRINT \"HI\"\r\n").unwrap();
        assert_eq!(lines[0].text, "PRINT \"HI\"");
    }

    #[test]
    fn test_rest_of_line_kept_verbatim() {
        let lines = load_str("30   LET  A = 1").unwrap();
        assert_eq!(lines[0].text, "  LET  A = 1");
    }

    #[test]
    fn test_missing_separator() {
        let err = load_str("10PRINT").unwrap_err();
        assert!(matches!(err, LoadError::MissingSeparator { source_line: 1, .. }));
        assert_eq!(err.code(), ErrorCode::MISSING_SEPARATOR);
    }

    #[test]
    fn test_invalid_number() {
        let err = load_str("10 END\nX0 PRINT").unwrap_err();
        match err {
            LoadError::InvalidNumber {
                source_line,
                number,
            } => {
                assert_eq!(source_line, 2);
                assert_eq!(number, "X0");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_reader_matches_str() {
        let src = "10 A=1\n20 PRINT A\n";
        let from_reader = load_reader(src.as_bytes(), "mem").unwrap();
        assert_eq!(from_reader, load_str(src).unwrap());
    }

    #[test]
    fn test_missing_file() {
        let err = load_file("/definitely/not/here.bas").unwrap_err();
        assert_eq!(err.to_diagnostic().code, ErrorCode::SOURCE_UNREADABLE);
    }
}
