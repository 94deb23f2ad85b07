//! Statement grammars with typed capture slots.
//!
//! A grammar is whitespace-separated literal tokens and `{name:type}` slots,
//! for example `ON {expr:string} GOSUB {lines:[]int}`. Slot types are
//! `int`, `float` and `string`; a `[]` prefix captures a list split on
//! commas (or the `sep` parameter) outside quotes and brackets. Parameters
//! follow a `?` in query form: `{vars:[]string?sep=;&max=4}`.

use crate::split::{find_outside_quotes, split_outside_brackets};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("empty grammar")]
    Empty,

    #[error("capture slot {0:?} directly follows another capture slot")]
    AdjacentCaptures(String),

    #[error("found '{{' inside a capture slot")]
    NestedBrace,

    #[error("found '}}' outside a capture slot")]
    StrayBrace,

    #[error("unclosed capture slot")]
    Unclosed,

    #[error("invalid capture slot {0:?}: expected name:type")]
    InvalidSlot(String),

    #[error("capture slot name may not be empty")]
    EmptyName,

    #[error("capture slot {0:?} has an empty type")]
    EmptyType(String),

    #[error("unsupported capture type {0:?}")]
    UnsupportedType(String),

    #[error("invalid capture parameter {0:?}")]
    InvalidParam(String),
}

/// Why a statement did not fit a grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct NoMatch(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Int,
    Float,
    Text,
}

/// A capture slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchTarget {
    pub name: String,
    pub kind: TargetKind,
    pub array: bool,
    pub params: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Literal(String),
    Capture(MatchTarget),
}

/// A typed capture.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
    IntList(Vec<i64>),
    FloatList(Vec<f64>),
    TextList(Vec<String>),
}

/// Captured fields of a matched statement, by slot name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields(BTreeMap<String, FieldValue>);

impl Fields {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        match self.0.get(name)? {
            FieldValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        match self.0.get(name)? {
            FieldValue::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.0.get(name)? {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn int_list(&self, name: &str) -> Option<&[i64]> {
        match self.0.get(name)? {
            FieldValue::IntList(v) => Some(v),
            _ => None,
        }
    }

    pub fn float_list(&self, name: &str) -> Option<&[f64]> {
        match self.0.get(name)? {
            FieldValue::FloatList(v) => Some(v),
            _ => None,
        }
    }

    pub fn text_list(&self, name: &str) -> Option<&[String]> {
        match self.0.get(name)? {
            FieldValue::TextList(v) => Some(v),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn insert(&mut self, name: &str, value: FieldValue) {
        self.0.insert(name.to_string(), value);
    }
}

/// A compiled statement grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub name: String,
    /// The leading literal, used to rule out a statement cheaply.
    pub prefix: Option<String>,
    pub targets: Vec<Target>,
}

impl Pattern {
    /// Compile a grammar string.
    pub fn compile(name: &str, grammar: &str) -> Result<Self, PatternError> {
        let mut pattern = Pattern {
            name: name.to_string(),
            prefix: None,
            targets: Vec::new(),
        };
        let mut curr = String::new();
        let mut in_slot = false;
        for c in grammar.chars() {
            match c {
                '{' => {
                    if in_slot {
                        return Err(PatternError::NestedBrace);
                    }
                    pattern.flush_literal(&mut curr)?;
                    in_slot = true;
                }
                '}' => {
                    if !in_slot {
                        return Err(PatternError::StrayBrace);
                    }
                    let slot = MatchTarget::parse(&curr)?;
                    curr.clear();
                    pattern.append(Target::Capture(slot))?;
                    in_slot = false;
                }
                c if !in_slot && c.is_whitespace() => pattern.flush_literal(&mut curr)?,
                c => curr.push(c),
            }
        }
        if in_slot {
            return Err(PatternError::Unclosed);
        }
        pattern.flush_literal(&mut curr)?;
        if pattern.targets.is_empty() {
            return Err(PatternError::Empty);
        }
        Ok(pattern)
    }

    fn flush_literal(&mut self, curr: &mut String) -> Result<(), PatternError> {
        if curr.is_empty() {
            return Ok(());
        }
        let literal = std::mem::take(curr);
        self.append(Target::Literal(literal))
    }

    fn append(&mut self, target: Target) -> Result<(), PatternError> {
        if let (Target::Capture(next), Some(Target::Capture(_))) = (&target, self.targets.last())
        {
            return Err(PatternError::AdjacentCaptures(next.name.clone()));
        }
        if self.targets.is_empty() {
            if let Target::Literal(lit) = &target {
                self.prefix = Some(lit.clone());
            }
        }
        self.targets.push(target);
        Ok(())
    }

    /// Match statement text, which must be consumed entirely.
    ///
    /// Each capture runs up to the next literal (found outside quotes) or to
    /// the end of the input. Whitespace between targets is skipped and
    /// captures are trimmed; an empty capture does not match.
    pub fn matches(&self, input: &str) -> Result<Fields, NoMatch> {
        let s = input.trim();
        let mut pos = 0;
        let mut fields = Fields::default();
        for (idx, target) in self.targets.iter().enumerate() {
            pos = skip_spaces(s, pos);
            match target {
                Target::Literal(lit) => {
                    if !s[pos..].starts_with(lit.as_str()) {
                        return Err(NoMatch(format!("{}: expected {lit:?} at {pos}", self.name)));
                    }
                    pos += lit.len();
                }
                Target::Capture(slot) => {
                    let rest = &s[pos..];
                    let span = match self.targets.get(idx + 1) {
                        None => rest,
                        Some(Target::Literal(next)) => {
                            let end = find_outside_quotes(rest, next).ok_or_else(|| {
                                NoMatch(format!("{}: {next:?} not found", self.name))
                            })?;
                            &rest[..end]
                        }
                        Some(Target::Capture(_)) => {
                            return Err(NoMatch(format!("{}: adjacent captures", self.name)));
                        }
                    };
                    let value = span.trim();
                    if value.is_empty() {
                        return Err(NoMatch(format!("{}: {} is empty", self.name, slot.name)));
                    }
                    fields.insert(&slot.name, slot.convert(value)?);
                    pos += span.len();
                }
            }
        }
        if !s[pos..].trim().is_empty() {
            return Err(NoMatch(format!(
                "{}: unexpected trailing text {:?}",
                self.name,
                s[pos..].trim()
            )));
        }
        Ok(fields)
    }
}

fn skip_spaces(s: &str, pos: usize) -> usize {
    pos + (s[pos..].len() - s[pos..].trim_start().len())
}

impl MatchTarget {
    /// Parse the inside of a `{...}` slot.
    fn parse(body: &str) -> Result<Self, PatternError> {
        let (name, spec) = body
            .split_once(':')
            .ok_or_else(|| PatternError::InvalidSlot(body.to_string()))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(PatternError::EmptyName);
        }
        let (ty, query) = match spec.split_once('?') {
            Some((ty, query)) => (ty.trim(), Some(query)),
            None => (spec.trim(), None),
        };
        if ty.is_empty() {
            return Err(PatternError::EmptyType(name.to_string()));
        }
        let (array, base) = match ty.strip_prefix("[]") {
            Some(base) => (true, base),
            None => (false, ty),
        };
        let kind = match base {
            "int" => TargetKind::Int,
            "float" => TargetKind::Float,
            "string" => TargetKind::Text,
            other => return Err(PatternError::UnsupportedType(other.to_string())),
        };

        let mut params = BTreeMap::new();
        for pair in query.into_iter().flat_map(|q| q.split('&')) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| PatternError::InvalidParam(pair.to_string()))?;
            match key {
                "sep" if value.chars().count() == 1 => {}
                "max" if value.parse::<usize>().is_ok() => {}
                _ => return Err(PatternError::InvalidParam(pair.to_string())),
            }
            params.insert(key.to_string(), value.to_string());
        }

        Ok(Self {
            name: name.to_string(),
            kind,
            array,
            params,
        })
    }

    fn separator(&self) -> char {
        self.params
            .get("sep")
            .and_then(|s| s.chars().next())
            .unwrap_or(',')
    }

    fn convert(&self, text: &str) -> Result<FieldValue, NoMatch> {
        if !self.array {
            return Ok(match self.kind {
                TargetKind::Int => FieldValue::Int(self.parse_int(text)?),
                TargetKind::Float => FieldValue::Float(self.parse_float(text)?),
                TargetKind::Text => FieldValue::Text(text.to_string()),
            });
        }

        let parts: Vec<&str> = split_outside_brackets(text, self.separator())
            .into_iter()
            .map(str::trim)
            .collect();
        if let Some(max) = self.params.get("max").and_then(|m| m.parse::<usize>().ok()) {
            if parts.len() > max {
                return Err(NoMatch(format!(
                    "{}: {} elements exceed the maximum of {max}",
                    self.name,
                    parts.len()
                )));
            }
        }
        Ok(match self.kind {
            TargetKind::Int => FieldValue::IntList(
                parts
                    .iter()
                    .map(|p| self.parse_int(p))
                    .collect::<Result<_, _>>()?,
            ),
            TargetKind::Float => FieldValue::FloatList(
                parts
                    .iter()
                    .map(|p| self.parse_float(p))
                    .collect::<Result<_, _>>()?,
            ),
            TargetKind::Text => {
                FieldValue::TextList(parts.iter().map(|p| p.to_string()).collect())
            }
        })
    }

    fn parse_int(&self, text: &str) -> Result<i64, NoMatch> {
        text.parse::<i64>()
            .map_err(|_| NoMatch(format!("{}: {text:?} is not an integer", self.name)))
    }

    fn parse_float(&self, text: &str) -> Result<f64, NoMatch> {
        text.parse::<f64>()
            .map_err(|_| NoMatch(format!("{}: {text:?} is not a number", self.name)))
    }
}
