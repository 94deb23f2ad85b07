//! Quote- and bracket-aware string splitting.
//!
//! Double quotes toggle a quoted region. `(`, `[` and `{` open a nesting
//! level that the matching closer ends. Separators only count outside both.

/// Split `s` on `sep` where it appears outside quotes and brackets.
///
/// Empty input yields no pieces. Pieces are not trimmed.
pub fn split_outside_brackets(s: &str, sep: char) -> Vec<&str> {
    split_where(s, sep, true)
}

/// Split `s` on `sep` where it appears outside quotes. Brackets are ignored.
pub fn split_outside_quotes(s: &str, sep: char) -> Vec<&str> {
    split_where(s, sep, false)
}

fn split_where(s: &str, sep: char, track_brackets: bool) -> Vec<&str> {
    if s.is_empty() {
        return Vec::new();
    }
    let mut pieces = Vec::new();
    let mut in_quotes = false;
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, c) in s.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        if track_brackets {
            match c {
                '(' | '[' | '{' => {
                    depth += 1;
                    continue;
                }
                ')' | ']' | '}' => {
                    depth = depth.saturating_sub(1);
                    continue;
                }
                _ => {}
            }
        }
        if c == sep && depth == 0 {
            pieces.push(&s[start..idx]);
            start = idx + c.len_utf8();
        }
    }
    pieces.push(&s[start..]);
    pieces
}

/// Byte offset of the `)` matching the `(` at `open`, skipping quoted text.
pub fn find_closing(s: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_quotes = false;
    for (idx, c) in s[open..].char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '(' if !in_quotes => depth += 1,
            ')' if !in_quotes => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(open + idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// Byte offset of the first `needle` outside quotes.
///
/// Alphabetic needles must stand alone: the characters on either side may
/// not be letters, digits or `$`, so `TO` is not found inside `TOTAL`.
pub fn find_outside_quotes(s: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    let wordlike = needle.chars().all(|c| c.is_ascii_alphabetic());
    let mut in_quotes = false;
    for (idx, c) in s.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
            if needle != "\"" {
                continue;
            }
        }
        if in_quotes || !s[idx..].starts_with(needle) {
            continue;
        }
        if wordlike && !stands_alone(s, idx, needle.len()) {
            continue;
        }
        return Some(idx);
    }
    None
}

fn stands_alone(s: &str, start: usize, len: usize) -> bool {
    let before = s[..start].chars().next_back();
    let after = s[start + len..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

/// Letters, digits, `_` and `$` continue an identifier.
pub fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_outside_brackets() {
        assert_eq!(
            split_outside_brackets(r#"a,b(",c,d),"e"#, ','),
            vec!["a", r#"b(",c,d),"e"#]
        );
        assert_eq!(
            split_outside_brackets("A(1,2),B(3)", ','),
            vec!["A(1,2)", "B(3)"]
        );
        assert_eq!(split_outside_brackets("", ','), Vec::<&str>::new());
        assert_eq!(split_outside_brackets("x,", ','), vec!["x", ""]);
    }

    #[test]
    fn test_split_outside_quotes() {
        assert_eq!(
            split_outside_quotes(r#""A,B",C(1,2)"#, ','),
            vec![r#""A,B""#, "C(1", "2)"]
        );
        assert_eq!(
            split_outside_quotes(r#"PRINT "A:B":END"#, ':'),
            vec![r#"PRINT "A:B""#, "END"]
        );
    }

    #[test]
    fn test_find_closing() {
        let s = "F(A(1),\")\")+2";
        assert_eq!(find_closing(s, 1), Some(10));
        assert_eq!(find_closing("(1", 0), None);
    }

    #[test]
    fn test_find_outside_quotes() {
        assert_eq!(find_outside_quotes("TOTAL TO 10", "TO"), Some(6));
        assert_eq!(find_outside_quotes(r#""THEN" THEN 5"#, "THEN"), Some(7));
        assert_eq!(find_outside_quotes("A=1", "="), Some(1));
        assert_eq!(find_outside_quotes("ABC", "X"), None);
        assert_eq!(find_outside_quotes("X)THEN(Y", "THEN"), Some(2));
    }
}
