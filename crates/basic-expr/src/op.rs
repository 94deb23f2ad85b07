use crate::ExprError;
use basic_types::Value;

/// A binary operator family after the parse-time rewrite.
///
/// `-` and `/` never appear here: they become [`Op::Plus`] with a negated
/// operand and [`Op::Times`] with a reciprocal operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Plus,
    Times,
    Pow,
    And,
    Or,
    Less,
    Greater,
    Equal,
    NotEqual,
    LessEqual,
    GreaterEqual,
}

impl Op {
    /// Binding strength. Higher ranks bind tighter.
    pub fn rank(self) -> u8 {
        match self {
            Op::Plus => 1,
            Op::Times => 2,
            Op::Pow => 3,
            Op::And | Op::Or => 4,
            Op::Less
            | Op::Greater
            | Op::Equal
            | Op::NotEqual
            | Op::LessEqual
            | Op::GreaterEqual => 5,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Op::Plus => "+",
            Op::Times => "*",
            Op::Pow => "^",
            Op::And => "AND",
            Op::Or => "OR",
            Op::Less => "<",
            Op::Greater => ">",
            Op::Equal => "=",
            Op::NotEqual => "<>",
            Op::LessEqual => "<=",
            Op::GreaterEqual => ">=",
        }
    }

    /// Combine two operand values.
    ///
    /// Numbers support every operator. Text supports `+` (concatenation)
    /// and the comparisons. Mixed kinds are an error naming both.
    pub fn apply(self, left: Value, right: Value) -> Result<Value, ExprError> {
        match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(self.apply_numbers(a, b)),
            (Value::Text(a), Value::Text(b)) => {
                self.apply_texts(a, b).ok_or(ExprError::Mismatch {
                    op: self.symbol(),
                    left: "text",
                    right: "text",
                })
            }
            (l, r) => Err(ExprError::Mismatch {
                op: self.symbol(),
                left: l.kind_name(),
                right: r.kind_name(),
            }),
        }
    }

    fn apply_numbers(self, a: f64, b: f64) -> Value {
        match self {
            Op::Plus => Value::Number(a + b),
            Op::Times => Value::Number(a * b),
            Op::Pow => Value::Number(a.powf(b)),
            Op::And => Value::from_bool(a > 0.0 && b > 0.0),
            Op::Or => Value::from_bool(a > 0.0 || b > 0.0),
            Op::Less => Value::from_bool(a < b),
            Op::Greater => Value::from_bool(a > b),
            Op::Equal => Value::from_bool(a == b),
            Op::NotEqual => Value::from_bool(a != b),
            Op::LessEqual => Value::from_bool(a <= b),
            Op::GreaterEqual => Value::from_bool(a >= b),
        }
    }

    fn apply_texts(self, mut a: String, b: String) -> Option<Value> {
        Some(match self {
            Op::Plus => {
                a.push_str(&b);
                Value::Text(a)
            }
            Op::Less => Value::from_bool(a < b),
            Op::Greater => Value::from_bool(a > b),
            Op::Equal => Value::from_bool(a == b),
            Op::NotEqual => Value::from_bool(a != b),
            Op::LessEqual => Value::from_bool(a <= b),
            Op::GreaterEqual => Value::from_bool(a >= b),
            Op::Times | Op::Pow | Op::And | Op::Or => return None,
        })
    }
}
