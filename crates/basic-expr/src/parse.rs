//! Expression text to evaluation tree.
//!
//! A single left-to-right scan accumulates operand text until an operator,
//! a parenthesis or the end of input, then pushes the finished operand onto
//! the rank stack. Parenthesized groups parse recursively into an
//! encapsulated stack; `name(...)` becomes a call with comma-separated
//! arguments.

use crate::{Evaler, ExprError, Op, Stack, Transform};
use basic_lexer::split::{find_closing, is_word_char, split_outside_brackets};

/// A scanned operator symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sym {
    Op(Op),
    Minus,
    Slash,
}

impl Sym {
    fn text(self) -> &'static str {
        match self {
            Sym::Op(op) => op.symbol(),
            Sym::Minus => "-",
            Sym::Slash => "/",
        }
    }
}

/// Operator candidates, longest first so the first hit is the longest match.
const OPERATORS: &[(&str, Sym)] = &[
    ("<=", Sym::Op(Op::LessEqual)),
    (">=", Sym::Op(Op::GreaterEqual)),
    ("<>", Sym::Op(Op::NotEqual)),
    ("AND", Sym::Op(Op::And)),
    ("OR", Sym::Op(Op::Or)),
    ("+", Sym::Op(Op::Plus)),
    ("-", Sym::Minus),
    ("*", Sym::Op(Op::Times)),
    ("/", Sym::Slash),
    ("^", Sym::Op(Op::Pow)),
    ("<", Sym::Op(Op::Less)),
    (">", Sym::Op(Op::Greater)),
    ("=", Sym::Op(Op::Equal)),
];

/// Parse expression text into an evaluation tree.
pub fn parse(text: &str) -> Result<Evaler, ExprError> {
    Parser::new(text).run().map(Evaler::Stack)
}

/// Letters first, then letters, digits or `_`, with an optional trailing `$`.
pub fn is_identifier(name: &str) -> bool {
    let body = name.strip_suffix('$').unwrap_or(name);
    let mut chars = body.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    /// Operand text collected since the last operator.
    token: String,
    root: Option<Stack>,
    /// Operator waiting for its right-hand operand.
    pending: Option<Sym>,
    /// Set by a unary minus; applies to the next operand.
    negate_next: bool,
    /// True right after an operand, when a binary operator may follow.
    after_operand: bool,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            token: String::new(),
            root: None,
            pending: None,
            negate_next: false,
            after_operand: false,
        }
    }

    fn run(mut self) -> Result<Stack, ExprError> {
        while let Some(c) = self.src[self.pos..].chars().next() {
            match c {
                '"' => self.scan_string()?,
                '(' => self.scan_group()?,
                ')' => return Err(ExprError::UnexpectedClose(self.pos)),
                _ => {
                    if let Some((sym, len)) = self.operator_at() {
                        self.operator(sym)?;
                        self.pos += len;
                    } else {
                        self.token.push(c);
                        self.pos += c.len_utf8();
                    }
                }
            }
        }
        self.flush()?;
        if let Some(sym) = self.pending {
            return Err(ExprError::MissingOperand(sym.text().to_string()));
        }
        if self.negate_next {
            return Err(ExprError::MissingOperand("-".to_string()));
        }
        self.root.ok_or(ExprError::Empty)
    }

    /// Copy a quoted string, quotes included, into the operand token.
    fn scan_string(&mut self) -> Result<(), ExprError> {
        let start = self.pos;
        let rest = &self.src[start + 1..];
        let end = rest
            .find('"')
            .ok_or(ExprError::UnterminatedString(start))?;
        self.token.push_str(&self.src[start..start + end + 2]);
        self.pos = start + end + 2;
        Ok(())
    }

    /// A parenthesized group or, after a name, a function call.
    fn scan_group(&mut self) -> Result<(), ExprError> {
        let open = self.pos;
        let close = find_closing(self.src, open).ok_or(ExprError::UnmatchedOpen(open))?;
        let inner = &self.src[open + 1..close];
        self.pos = close + 1;

        let name = self.token.trim().to_string();
        self.token.clear();
        if name.is_empty() {
            let mut group = Parser::new(inner).run()?;
            group.encapsulated = true;
            return self.operand(Evaler::Stack(group));
        }
        if !is_identifier(&name) {
            return Err(ExprError::MissingOperator(name));
        }
        let args = if inner.trim().is_empty() {
            Vec::new()
        } else {
            split_outside_brackets(inner, ',')
                .into_iter()
                .map(parse)
                .collect::<Result<Vec<_>, _>>()?
        };
        self.operand(Evaler::Call { name, args })
    }

    /// The operator starting at the cursor, if any, and its byte length.
    fn operator_at(&self) -> Option<(Sym, usize)> {
        let rest = &self.src[self.pos..];
        for (text, sym) in OPERATORS {
            if !rest.starts_with(text) {
                continue;
            }
            if text.chars().all(|c| c.is_ascii_alphabetic()) && !self.word_at(text.len()) {
                continue;
            }
            if matches!(sym, Sym::Op(Op::Plus) | Sym::Minus) && self.in_exponent() {
                continue;
            }
            return Some((*sym, text.len()));
        }
        None
    }

    /// A keyword operator needs a non-word character on both sides.
    fn word_at(&self, len: usize) -> bool {
        let before = self.src[..self.pos].chars().next_back();
        let after = self.src[self.pos + len..].chars().next();
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    }

    /// Whether the token so far is a number awaiting its exponent sign,
    /// as in `1E-3`.
    fn in_exponent(&self) -> bool {
        let t = self.token.trim_start();
        let Some(mantissa) = t.strip_suffix(['E', 'e']) else {
            return false;
        };
        !mantissa.is_empty()
            && mantissa.starts_with(|c: char| c.is_ascii_digit() || c == '.')
            && mantissa.chars().all(|c| c.is_ascii_digit() || c == '.')
    }

    fn operator(&mut self, sym: Sym) -> Result<(), ExprError> {
        self.flush()?;
        if self.after_operand {
            self.pending = Some(sym);
            self.after_operand = false;
            return Ok(());
        }
        match sym {
            Sym::Minus => self.negate_next = !self.negate_next,
            Sym::Op(Op::Plus) => {}
            other => return Err(ExprError::MissingOperand(other.text().to_string())),
        }
        Ok(())
    }

    /// Turn the accumulated token into an operand.
    fn flush(&mut self) -> Result<(), ExprError> {
        let token = self.token.trim();
        if token.is_empty() {
            self.token.clear();
            return Ok(());
        }
        let operand = literal(token)?;
        self.token.clear();
        self.operand(operand)
    }

    fn operand(&mut self, operand: Evaler) -> Result<(), ExprError> {
        if self.after_operand {
            let shown = match &operand {
                Evaler::Var(name) | Evaler::Call { name, .. } => name.clone(),
                Evaler::Text(s) => format!("\"{s}\""),
                _ => self.src.trim().to_string(),
            };
            return Err(ExprError::MissingOperator(shown));
        }
        let operand = if std::mem::take(&mut self.negate_next) {
            operand.transform(Transform::Negate)?
        } else {
            operand
        };
        self.root = Some(match self.root.take() {
            None => Stack::new(Op::Plus, vec![operand]),
            Some(root) => {
                let (op, operand) = match self.pending.take() {
                    Some(Sym::Op(op)) => (op, operand),
                    Some(Sym::Minus) => (Op::Plus, operand.transform(Transform::Negate)?),
                    Some(Sym::Slash) => (Op::Times, operand.transform(Transform::Reciprocal)?),
                    None => return Err(ExprError::MissingOperator(self.src.trim().to_string())),
                };
                root.push(op, operand)
            }
        });
        self.after_operand = true;
        Ok(())
    }
}

/// A bare operand: quoted text, a number, or a variable name.
fn literal(token: &str) -> Result<Evaler, ExprError> {
    if let Some(body) = token.strip_prefix('"') {
        return match body.strip_suffix('"') {
            Some(text) if !text.contains('"') => Ok(Evaler::Text(text.to_string())),
            _ => Err(ExprError::MissingOperator(token.to_string())),
        };
    }
    if token.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return token
            .parse::<f64>()
            .map(Evaler::Number)
            .map_err(|_| ExprError::InvalidNumber(token.to_string()));
    }
    if is_identifier(token) {
        return Ok(Evaler::Var(token.to_string()));
    }
    if token.split_whitespace().count() > 1 {
        return Err(ExprError::MissingOperator(token.to_string()));
    }
    Err(ExprError::InvalidOperand(token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiers() {
        assert!(is_identifier("A"));
        assert!(is_identifier("A1"));
        assert!(is_identifier("NAME$"));
        assert!(is_identifier("FNA"));
        assert!(!is_identifier("1A"));
        assert!(!is_identifier("$"));
        assert!(!is_identifier("A$B"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn test_literal_kinds() {
        assert_eq!(literal("\"HI\""), Ok(Evaler::Text("HI".into())));
        assert_eq!(literal("2.5"), Ok(Evaler::Number(2.5)));
        assert_eq!(literal(".5"), Ok(Evaler::Number(0.5)));
        assert_eq!(literal("X$"), Ok(Evaler::Var("X$".into())));
        assert!(matches!(literal("1.2.3"), Err(ExprError::InvalidNumber(_))));
        assert!(matches!(literal("A B"), Err(ExprError::MissingOperator(_))));
    }

    #[test]
    fn test_single_operand_root() {
        let tree = parse("7").unwrap();
        assert_eq!(
            tree,
            Evaler::Stack(Stack::new(Op::Plus, vec![Evaler::Number(7.0)]))
        );
    }

    #[test]
    fn test_subtraction_folds_constant() {
        let tree = parse("5-2").unwrap();
        assert_eq!(
            tree,
            Evaler::Stack(Stack::new(
                Op::Plus,
                vec![Evaler::Number(5.0), Evaler::Number(-2.0)]
            ))
        );
    }

    #[test]
    fn test_keyword_operator_needs_boundaries() {
        // ORDER is a variable, not OR followed by DER.
        let tree = parse("ORDER").unwrap();
        assert_eq!(
            tree,
            Evaler::Stack(Stack::new(Op::Plus, vec![Evaler::Var("ORDER".into())]))
        );
    }

    #[test]
    fn test_exponent_literal() {
        let tree = parse("1E-3").unwrap();
        assert_eq!(
            tree,
            Evaler::Stack(Stack::new(Op::Plus, vec![Evaler::Number(0.001)]))
        );
    }
}
