use crate::{Evaler, Expr, ExprError, FuncError, Lookup, Scope};
use basic_types::{is_text_name, Value};
use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Nesting limit for user-defined function calls.
const MAX_CALL_DEPTH: u32 = 64;

/// A native function that always yields a number.
pub type NumberFn = Rc<dyn Fn(&[Value]) -> Result<f64, FuncError>>;
/// A native function that may yield either kind.
pub type ValueFn = Rc<dyn Fn(&[Value]) -> Result<Value, FuncError>>;

/// A function defined in the program with `DEF`.
#[derive(Debug, Clone, PartialEq)]
pub struct DefinedFn {
    pub params: Vec<String>,
    pub body: Expr,
}

/// Anything callable by name from an expression.
#[derive(Clone)]
pub enum Func {
    Number(NumberFn),
    Value(ValueFn),
    Defined(Rc<DefinedFn>),
}

/// The function table: builtins, array accessors, and `DEF` functions.
#[derive(Clone, Default)]
pub struct Funcs {
    items: HashMap<String, Func>,
    depth: Cell<u32>,
}

impl fmt::Debug for Funcs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.items.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Funcs").field("names", &names).finish()
    }
}

impl Funcs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_number<F>(&mut self, name: &str, f: F)
    where
        F: Fn(&[Value]) -> Result<f64, FuncError> + 'static,
    {
        self.items.insert(name.to_string(), Func::Number(Rc::new(f)));
    }

    pub fn add_value<F>(&mut self, name: &str, f: F)
    where
        F: Fn(&[Value]) -> Result<Value, FuncError> + 'static,
    {
        self.items.insert(name.to_string(), Func::Value(Rc::new(f)));
    }

    /// Register (or replace) a user function.
    pub fn define(&mut self, name: &str, params: Vec<String>, body: Expr) {
        self.items.insert(
            name.to_string(),
            Func::Defined(Rc::new(DefinedFn { params, body })),
        );
    }

    pub fn get(&self, name: &str) -> Option<&Func> {
        self.items.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Evaluate `args` against `vars` and invoke `name`.
    pub fn call(&self, name: &str, args: &[Evaler], vars: &dyn Lookup) -> Result<Value, ExprError> {
        let func = self
            .items
            .get(name)
            .ok_or_else(|| ExprError::UnknownFunction(name.to_string()))?;
        let values = args
            .iter()
            .map(|arg| arg.eval(vars, self))
            .collect::<Result<Vec<_>, _>>()?;
        let result = match func {
            Func::Number(f) => f(values.as_slice()).map(Value::Number),
            Func::Value(f) => f(values.as_slice()),
            Func::Defined(def) => self.call_defined(def, values, vars),
        };
        result.map_err(|source| ExprError::Call {
            name: name.to_string(),
            source,
        })
    }

    /// Run a `DEF` body with its parameters bound over the caller's scope.
    fn call_defined(
        &self,
        def: &DefinedFn,
        values: Vec<Value>,
        vars: &dyn Lookup,
    ) -> Result<Value, FuncError> {
        if values.len() != def.params.len() {
            return Err(FuncError::Arity {
                expected: def.params.len().to_string(),
                got: values.len(),
            });
        }
        let depth = self.depth.get();
        if depth >= MAX_CALL_DEPTH {
            return Err(FuncError::Failed(format!(
                "calls nested deeper than {MAX_CALL_DEPTH}"
            )));
        }
        let scope = Scope::new(def.params.iter().cloned().zip(values).collect(), vars);
        self.depth.set(depth + 1);
        let result = def.body.eval(&scope, self);
        self.depth.set(depth);
        Ok(result?)
    }

    /// Whether calling `name` can only produce a number.
    pub fn can_eval_numeric(&self, name: &str) -> bool {
        match self.items.get(name) {
            Some(Func::Number(_)) => true,
            Some(Func::Value(_)) | Some(Func::Defined(_)) => !is_text_name(name),
            None => false,
        }
    }
}

/// Positional access to call arguments with typed errors.
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    values: &'a [Value],
}

impl<'a> Args<'a> {
    pub fn new(values: &'a [Value]) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn expect(&self, n: usize) -> Result<(), FuncError> {
        self.expect_between(n, n)
    }

    pub fn expect_between(&self, min: usize, max: usize) -> Result<(), FuncError> {
        let got = self.values.len();
        if got < min || got > max {
            let expected = if min == max {
                min.to_string()
            } else {
                format!("{min} to {max}")
            };
            return Err(FuncError::Arity { expected, got });
        }
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&'a Value> {
        self.values.get(index)
    }

    pub fn number(&self, index: usize) -> Result<f64, FuncError> {
        match self.values.get(index) {
            Some(Value::Number(n)) => Ok(*n),
            Some(other) => Err(FuncError::ArgType {
                index: index + 1,
                expected: "number",
                found: other.kind_name(),
            }),
            None => Err(self.missing(index)),
        }
    }

    /// A number argument truncated toward zero.
    pub fn int(&self, index: usize) -> Result<i64, FuncError> {
        Ok(self.number(index)?.trunc() as i64)
    }

    pub fn text(&self, index: usize) -> Result<&'a str, FuncError> {
        match self.values.get(index) {
            Some(Value::Text(s)) => Ok(s),
            Some(other) => Err(FuncError::ArgType {
                index: index + 1,
                expected: "text",
                found: other.kind_name(),
            }),
            None => Err(self.missing(index)),
        }
    }

    fn missing(&self, index: usize) -> FuncError {
        FuncError::Arity {
            expected: format!("at least {}", index + 1),
            got: self.values.len(),
        }
    }
}
