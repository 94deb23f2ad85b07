use crate::{ExprError, Funcs, Lookup, Op};
use basic_types::Value;

/// Unary rewrites produced by `-` and `/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Negate,
    Reciprocal,
}

impl Transform {
    fn symbol(self) -> &'static str {
        match self {
            Transform::Negate => "-",
            Transform::Reciprocal => "/",
        }
    }

    fn apply(self, n: f64) -> f64 {
        match self {
            Transform::Negate => -n,
            Transform::Reciprocal => 1.0 / n,
        }
    }
}

/// A node of the evaluation tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaler {
    Number(f64),
    Text(String),
    Var(String),
    Call { name: String, args: Vec<Evaler> },
    Transform { kind: Transform, operand: Box<Evaler> },
    Stack(Stack),
}

impl Evaler {
    /// Apply a unary rewrite. Numeric constants fold immediately; text
    /// constants are rejected.
    pub fn transform(self, kind: Transform) -> Result<Evaler, ExprError> {
        match self {
            Evaler::Number(n) => Ok(Evaler::Number(kind.apply(n))),
            Evaler::Text(s) => Err(ExprError::TextOperand {
                op: kind.symbol(),
                operand: s,
            }),
            other => Ok(Evaler::Transform {
                kind,
                operand: Box::new(other),
            }),
        }
    }

    /// Insert `operand` with `op` into the tree rooted here.
    pub fn push(self, op: Op, operand: Evaler) -> Evaler {
        match self {
            Evaler::Stack(stack) => Evaler::Stack(stack.push(op, operand)),
            leaf => Evaler::Stack(Stack::new(op, vec![leaf, operand])),
        }
    }

    pub fn eval(&self, vars: &dyn Lookup, funcs: &Funcs) -> Result<Value, ExprError> {
        match self {
            Evaler::Number(n) => Ok(Value::Number(*n)),
            Evaler::Text(s) => Ok(Value::Text(s.clone())),
            Evaler::Var(name) => vars.lookup(name),
            Evaler::Call { name, args } => funcs.call(name, args, vars),
            Evaler::Transform { kind, operand } => match operand.eval(vars, funcs)? {
                Value::Number(n) => Ok(Value::Number(kind.apply(n))),
                other => Err(ExprError::NotNumeric(other.kind_name())),
            },
            Evaler::Stack(stack) => stack.eval(vars, funcs),
        }
    }

    /// Whether this node can only produce a number.
    pub fn can_eval_numeric(&self, vars: &dyn Lookup, funcs: &Funcs) -> bool {
        match self {
            Evaler::Number(_) | Evaler::Transform { .. } => true,
            Evaler::Text(_) => false,
            Evaler::Var(name) => vars.can_eval_numeric(name),
            Evaler::Call { name, .. } => funcs.can_eval_numeric(name),
            Evaler::Stack(stack) => stack.can_eval_numeric(vars, funcs),
        }
    }
}

/// An n-ary node: `op` applied left to right across `operands`.
///
/// `encapsulated` marks a stack built from a parenthesized group. A tighter
/// operator arriving next may not reach inside it and instead takes the
/// whole group as its left operand.
#[derive(Debug, Clone, PartialEq)]
pub struct Stack {
    pub op: Op,
    pub operands: Vec<Evaler>,
    pub encapsulated: bool,
}

impl Stack {
    pub fn new(op: Op, operands: Vec<Evaler>) -> Self {
        Self {
            op,
            operands,
            encapsulated: false,
        }
    }

    /// Insert `operand` joined by `op`, returning the new root.
    pub fn push(mut self, op: Op, operand: Evaler) -> Stack {
        if op == self.op {
            self.operands.push(operand);
            return self;
        }
        if op.rank() > self.op.rank() {
            if self.encapsulated {
                return Stack::new(op, vec![Evaler::Stack(self), operand]);
            }
            let last = match self.operands.pop() {
                Some(last) => last.push(op, operand),
                None => operand,
            };
            self.operands.push(last);
            return self;
        }
        // Looser operator, or a different operator of the same rank:
        // everything so far becomes the left operand.
        Stack::new(op, vec![Evaler::Stack(self), operand])
    }

    pub fn eval(&self, vars: &dyn Lookup, funcs: &Funcs) -> Result<Value, ExprError> {
        let mut operands = self.operands.iter();
        let Some(first) = operands.next() else {
            return Err(ExprError::Empty);
        };
        let mut acc = first.eval(vars, funcs)?;
        for operand in operands {
            acc = self.op.apply(acc, operand.eval(vars, funcs)?)?;
        }
        Ok(acc)
    }

    /// Every operator except a lone `+` yields a number. A `+` stack is
    /// numeric only when all of its operands are.
    pub fn can_eval_numeric(&self, vars: &dyn Lookup, funcs: &Funcs) -> bool {
        match self.op {
            Op::Plus => self
                .operands
                .iter()
                .all(|e| e.can_eval_numeric(vars, funcs)),
            _ => true,
        }
    }
}

/// A parsed expression together with its source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub raw: String,
    pub root: Evaler,
}

impl Expr {
    pub fn parse(raw: &str) -> Result<Self, ExprError> {
        Ok(Self {
            raw: raw.trim().to_string(),
            root: crate::parse(raw)?,
        })
    }

    pub fn eval(&self, vars: &dyn Lookup, funcs: &Funcs) -> Result<Value, ExprError> {
        self.root.eval(vars, funcs)
    }

    /// Evaluate and require a number.
    pub fn eval_number(&self, vars: &dyn Lookup, funcs: &Funcs) -> Result<f64, ExprError> {
        match self.eval(vars, funcs)? {
            Value::Number(n) => Ok(n),
            other => Err(ExprError::NotNumeric(other.kind_name())),
        }
    }

    pub fn can_eval_numeric(&self, vars: &dyn Lookup, funcs: &Funcs) -> bool {
        self.root.can_eval_numeric(vars, funcs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Evaler {
        Evaler::Number(n)
    }

    #[test]
    fn test_equal_op_appends() {
        let s = Stack::new(Op::Plus, vec![num(1.0)]).push(Op::Plus, num(2.0));
        assert_eq!(s.op, Op::Plus);
        assert_eq!(s.operands.len(), 2);
    }

    #[test]
    fn test_tighter_op_descends_into_last_operand() {
        let s = Stack::new(Op::Plus, vec![num(1.0)])
            .push(Op::Plus, num(2.0))
            .push(Op::Times, num(3.0));
        assert_eq!(s.op, Op::Plus);
        assert_eq!(
            s.operands[1],
            Evaler::Stack(Stack::new(Op::Times, vec![num(2.0), num(3.0)]))
        );
    }

    #[test]
    fn test_looser_op_wraps_root() {
        let s = Stack::new(Op::Times, vec![num(2.0), num(3.0)]).push(Op::Plus, num(4.0));
        assert_eq!(s.op, Op::Plus);
        assert_eq!(s.operands.len(), 2);
        assert!(matches!(&s.operands[0], Evaler::Stack(inner) if inner.op == Op::Times));
    }

    #[test]
    fn test_encapsulated_group_is_opaque() {
        let mut group = Stack::new(Op::Plus, vec![num(2.0), num(1.0)]);
        group.encapsulated = true;
        let s = group.push(Op::Times, num(4.0));
        assert_eq!(s.op, Op::Times);
        assert!(!s.encapsulated);
        assert_eq!(s.operands[1], num(4.0));
    }

    #[test]
    fn test_same_rank_different_op_is_left_associative() {
        let s = Stack::new(Op::And, vec![num(1.0), num(0.0)]).push(Op::Or, num(1.0));
        assert_eq!(s.op, Op::Or);
        assert!(matches!(&s.operands[0], Evaler::Stack(inner) if inner.op == Op::And));
    }

    #[test]
    fn test_transform_folds_constants() {
        assert_eq!(num(2.0).transform(Transform::Negate), Ok(num(-2.0)));
        assert_eq!(num(4.0).transform(Transform::Reciprocal), Ok(num(0.25)));
        assert_eq!(
            num(0.0).transform(Transform::Reciprocal),
            Ok(num(f64::INFINITY))
        );
        assert!(Evaler::Text("A".into())
            .transform(Transform::Negate)
            .is_err());
    }
}
