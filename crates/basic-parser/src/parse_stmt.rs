//! Matched grammar fields to statement variants.

use crate::ast::{ArrayDecl, ArrayRef, Stmt, Target};
use crate::parse_items::{parse_data_value, parse_input, parse_print_items};
use crate::parser::StatementParser;
use crate::ParseError;
use basic_expr::{is_identifier, Expr};
use basic_lexer::split::{find_closing, split_outside_brackets};
use basic_lexer::Fields;

impl StatementParser {
    pub(crate) fn build(&self, kind: &str, fields: &Fields) -> Result<Stmt, ParseError> {
        Ok(match kind {
            "DATA" => Stmt::Data {
                values: text_list(fields, "values")?
                    .iter()
                    .map(|v| parse_data_value(v))
                    .collect(),
            },
            "DEF" => {
                let (name, params) = parse_signature(text(fields, "fnc")?)?;
                Stmt::Def {
                    name,
                    params,
                    body: expr(text(fields, "expr")?)?,
                }
            }
            "DIM" => Stmt::Dim {
                arrays: text_list(fields, "arrays")?
                    .iter()
                    .map(|decl| parse_array_decl(decl))
                    .collect::<Result<_, _>>()?,
            },
            "END" => Stmt::End,
            "FOR" | "FOR_STEP" => Stmt::For {
                var: variable(text(fields, "var")?)?,
                initial: expr(text(fields, "init")?)?,
                limit: expr(text(fields, "limit")?)?,
                step: match fields.text("step") {
                    Some(step) => expr(step)?,
                    None => expr("1")?,
                },
            },
            "GOSUB" => Stmt::Gosub {
                line: line_number(fields, "line")?,
            },
            "GOTO" => Stmt::Goto {
                line: line_number(fields, "line")?,
            },
            "IFLN" | "IFGOTO" => Stmt::IfLine {
                cond: expr(text(fields, "cond")?)?,
                line: line_number(fields, "line")?,
            },
            "IFELSELN" => Stmt::IfElseLine {
                cond: expr(text(fields, "cond")?)?,
                line: line_number(fields, "line")?,
                else_line: line_number(fields, "elseline")?,
            },
            "IFSTMT" => Stmt::IfStmts {
                cond: expr(text(fields, "cond")?)?,
                stmts: self.parse_statements(text(fields, "stmts")?)?,
            },
            "IFELSESTMT" => Stmt::IfElseStmts {
                cond: expr(text(fields, "cond")?)?,
                stmts: self.parse_statements(text(fields, "stmts")?)?,
                else_stmts: self.parse_statements(text(fields, "elsestmts")?)?,
            },
            "INPUT" => {
                let (prompt, targets) = parse_input(text(fields, "spec")?)?;
                Stmt::Input { prompt, targets }
            }
            "LET" => Stmt::Let {
                target: parse_target(text(fields, "target")?)?,
                expr: expr(text(fields, "expr")?)?,
            },
            "NEXT" => Stmt::Next {
                vars: text_list(fields, "vars")?
                    .iter()
                    .map(|v| variable(v))
                    .collect::<Result<_, _>>()?,
            },
            "NEXT_EMPTY" => Stmt::Next { vars: Vec::new() },
            "ON_GOSUB" => Stmt::OnGosub {
                expr: expr(text(fields, "expr")?)?,
                lines: line_numbers(fields, "lines")?,
            },
            "ON_GOTO" => Stmt::OnGoto {
                expr: expr(text(fields, "expr")?)?,
                lines: line_numbers(fields, "lines")?,
            },
            "PRINT" => Stmt::Print {
                items: parse_print_items(text(fields, "items")?)?,
            },
            "PRINT_EMPTY" => Stmt::Print { items: Vec::new() },
            "READ" => Stmt::Read {
                targets: text_list(fields, "targets")?
                    .iter()
                    .map(|t| parse_target(t))
                    .collect::<Result<_, _>>()?,
            },
            "REM" => Stmt::Rem {
                text: text(fields, "text")?.to_string(),
            },
            "REM_EMPTY" => Stmt::Rem {
                text: String::new(),
            },
            "RESTORE" => Stmt::Restore,
            "RETURN" => Stmt::Return,
            "STOP" => Stmt::Stop,
            "ASSIGN" => {
                let expr = expr(text(fields, "expr")?)?;
                match parse_target(text(fields, "target")?)? {
                    Target::Scalar(var) => Stmt::Assign { var, expr },
                    Target::Element(target) => Stmt::AssignArray { target, expr },
                }
            }
            other => return Err(ParseError::UnknownStatement(other.to_string())),
        })
    }
}

fn text<'f>(fields: &'f Fields, name: &'static str) -> Result<&'f str, ParseError> {
    fields
        .text(name)
        .ok_or(ParseError::invalid("statement field", name))
}

fn text_list<'f>(fields: &'f Fields, name: &'static str) -> Result<&'f [String], ParseError> {
    fields
        .text_list(name)
        .ok_or(ParseError::invalid("statement field", name))
}

pub(crate) fn expr(raw: &str) -> Result<Expr, ParseError> {
    Expr::parse(raw).map_err(|source| ParseError::Expr {
        raw: raw.trim().to_string(),
        source,
    })
}

fn variable(name: &str) -> Result<String, ParseError> {
    let name = name.trim();
    if !is_identifier(name) {
        return Err(ParseError::invalid("variable name", name));
    }
    Ok(name.to_string())
}

fn to_line(n: i64) -> Result<u32, ParseError> {
    u32::try_from(n).map_err(|_| ParseError::LineNumber(n))
}

fn line_number(fields: &Fields, name: &'static str) -> Result<u32, ParseError> {
    let n = fields
        .int(name)
        .ok_or(ParseError::invalid("statement field", name))?;
    to_line(n)
}

fn line_numbers(fields: &Fields, name: &'static str) -> Result<Vec<u32>, ParseError> {
    fields
        .int_list(name)
        .ok_or(ParseError::invalid("statement field", name))?
        .iter()
        .map(|n| to_line(*n))
        .collect()
}

/// Split `NAME(a, b)` into its name and the raw argument texts.
///
/// Returns `None` when `text` does not end in a top-level parenthesized
/// list.
fn split_call(text: &str) -> Option<(&str, Vec<&str>)> {
    let open = text.find('(')?;
    let close = find_closing(text, open)?;
    if close != text.len() - 1 {
        return None;
    }
    let inner = &text[open + 1..close];
    Some((text[..open].trim(), split_outside_brackets(inner, ',')))
}

/// A scalar name or an `ARRAY(subscripts)` element.
pub(crate) fn parse_target(text: &str) -> Result<Target, ParseError> {
    let text = text.trim();
    match split_call(text) {
        Some((name, args)) => {
            if !is_identifier(name) || args.iter().all(|a| a.trim().is_empty()) {
                return Err(ParseError::invalid("assignment target", text));
            }
            let subscripts = args.into_iter().map(expr).collect::<Result<_, _>>()?;
            Ok(Target::Element(ArrayRef {
                name: name.to_string(),
                subscripts,
            }))
        }
        None if is_identifier(text) => Ok(Target::Scalar(text.to_string())),
        None => Err(ParseError::invalid("assignment target", text)),
    }
}

fn parse_array_decl(text: &str) -> Result<ArrayDecl, ParseError> {
    match parse_target(text) {
        Ok(Target::Element(r)) => Ok(ArrayDecl {
            name: r.name,
            dims: r.subscripts,
        }),
        _ => Err(ParseError::invalid("array declaration", text.trim())),
    }
}

/// `FNA(X, Y)` into `("FNA", ["X", "Y"])`. A bare name takes no parameters.
fn parse_signature(text: &str) -> Result<(String, Vec<String>), ParseError> {
    let text = text.trim();
    let Some((name, args)) = split_call(text) else {
        return Ok((variable(text)?, Vec::new()));
    };
    let name = variable(name)?;
    let params = args
        .into_iter()
        .filter(|p| !p.trim().is_empty())
        .map(variable)
        .collect::<Result<_, _>>()?;
    Ok((name, params))
}
