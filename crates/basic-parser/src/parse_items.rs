//! Sub-grammars the pattern table leaves as raw text: PRINT item lists,
//! INPUT specs and DATA literals.

use crate::ast::{PrintItem, Target};
use crate::parse_stmt::{expr, parse_target};
use crate::ParseError;
use basic_lexer::split::split_outside_brackets;
use basic_types::Value;

/// Scan a PRINT list into expressions and `,` / `;` separators.
///
/// Separators only count outside quotes and parentheses. A quoted string
/// directly next to another operand, as in `"X="X`, splits into two items
/// with no separator between them.
pub(crate) fn parse_print_items(raw: &str) -> Result<Vec<PrintItem>, ParseError> {
    let mut items = Vec::new();
    let mut curr = String::new();
    let mut in_quotes = false;
    let mut depth = 0usize;

    for c in raw.chars() {
        if in_quotes {
            curr.push(c);
            if c == '"' {
                in_quotes = false;
            }
            continue;
        }
        if depth == 0 {
            let last = curr.trim_end().chars().next_back();
            let boundary = match c {
                '"' => last.is_some_and(|l| l.is_ascii_alphanumeric() || matches!(l, '$' | ')' | '"')),
                c if c.is_ascii_alphanumeric() => last == Some('"') && closes_string(&curr),
                _ => false,
            };
            if boundary {
                flush(&mut curr, &mut items)?;
            }
        }
        match c {
            '"' => in_quotes = true,
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ';' | ',' if depth == 0 => {
                flush(&mut curr, &mut items)?;
                items.push(if c == ';' {
                    PrintItem::Semicolon
                } else {
                    PrintItem::Comma
                });
                continue;
            }
            _ => {}
        }
        curr.push(c);
    }
    if in_quotes {
        return Err(ParseError::invalid("PRINT list", raw.trim()));
    }
    flush(&mut curr, &mut items)?;
    Ok(items)
}

/// Whether `curr` ends with a complete quoted string rather than an
/// opening quote.
fn closes_string(curr: &str) -> bool {
    curr.matches('"').count() % 2 == 0
}

fn flush(curr: &mut String, items: &mut Vec<PrintItem>) -> Result<(), ParseError> {
    let text = curr.trim();
    if !text.is_empty() {
        items.push(PrintItem::Expr(expr(text)?));
    }
    curr.clear();
    Ok(())
}

/// `["prompt" (;|,)] target {, target}`
pub(crate) fn parse_input(spec: &str) -> Result<(Option<String>, Vec<Target>), ParseError> {
    let mut rest = spec.trim_start();
    let mut prompt = None;
    if let Some(quoted) = rest.strip_prefix('"') {
        let end = quoted
            .find('"')
            .ok_or_else(|| ParseError::invalid("INPUT prompt", spec.trim()))?;
        prompt = Some(quoted[..end].to_string());
        rest = quoted[end + 1..].trim_start();
        rest = rest
            .strip_prefix(';')
            .or_else(|| rest.strip_prefix(','))
            .unwrap_or(rest);
    }
    let targets = split_outside_brackets(rest, ',')
        .into_iter()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(parse_target)
        .collect::<Result<Vec<_>, _>>()?;
    if targets.is_empty() {
        return Err(ParseError::invalid("INPUT list", spec.trim()));
    }
    Ok((prompt, targets))
}

/// A DATA element: quoted text, a number, or bare text.
pub(crate) fn parse_data_value(raw: &str) -> Value {
    let raw = raw.trim();
    if let Some(body) = raw.strip_prefix('"').and_then(|r| r.strip_suffix('"')) {
        return Value::Text(body.to_string());
    }
    match raw.parse::<f64>() {
        Ok(n) => Value::Number(n),
        Err(_) => Value::Text(raw.to_string()),
    }
}
