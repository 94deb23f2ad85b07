use crate::ExprError;
use basic_types::{is_text_name, Value};
use std::collections::HashMap;

/// Variable resolution for expression evaluation.
pub trait Lookup {
    fn lookup(&self, name: &str) -> Result<Value, ExprError>;

    /// Whether `name` resolves to a number without evaluating anything.
    fn can_eval_numeric(&self, name: &str) -> bool;
}

/// The global variable table. Names are case-sensitive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vars {
    values: HashMap<String, Value>,
}

impl Vars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Lookup for Vars {
    fn lookup(&self, name: &str) -> Result<Value, ExprError> {
        self.values
            .get(name)
            .cloned()
            .ok_or_else(|| ExprError::UnknownVariable(name.to_string()))
    }

    fn can_eval_numeric(&self, name: &str) -> bool {
        match self.values.get(name) {
            Some(value) => matches!(value, Value::Number(_)),
            None => !is_text_name(name),
        }
    }
}

/// Parameter bindings layered over an outer lookup, used while a user
/// function body runs.
pub struct Scope<'a> {
    bindings: Vec<(String, Value)>,
    outer: &'a dyn Lookup,
}

impl<'a> Scope<'a> {
    pub fn new(bindings: Vec<(String, Value)>, outer: &'a dyn Lookup) -> Self {
        Self { bindings, outer }
    }

    fn binding(&self, name: &str) -> Option<&Value> {
        self.bindings
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, value)| value)
    }
}

impl Lookup for Scope<'_> {
    fn lookup(&self, name: &str) -> Result<Value, ExprError> {
        match self.binding(name) {
            Some(value) => Ok(value.clone()),
            None => self.outer.lookup(name),
        }
    }

    fn can_eval_numeric(&self, name: &str) -> bool {
        match self.binding(name) {
            Some(value) => matches!(value, Value::Number(_)),
            None => self.outer.can_eval_numeric(name),
        }
    }
}
