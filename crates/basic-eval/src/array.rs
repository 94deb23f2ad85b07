//! Dense multi-dimensional arrays.

use basic_types::Value;
use thiserror::Error;

/// Upper bound on elements in one array.
pub const MAX_ELEMENTS: usize = 1 << 24;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArrayError {
    #[error("expected {expected} subscript(s), got {got}")]
    Arity { expected: usize, got: usize },

    #[error("subscript {index} out of range 0..{size} in dimension {dim}")]
    OutOfRange { dim: usize, index: usize, size: usize },

    #[error("invalid subscript {0}")]
    InvalidSubscript(f64),

    #[error("invalid size {0}")]
    InvalidSize(f64),

    #[error("more than {MAX_ELEMENTS} elements")]
    TooLarge,

    #[error("cannot store {found} in a {expected} array")]
    Kind {
        expected: &'static str,
        found: &'static str,
    },
}

/// Convert an evaluated subscript to an index, truncating toward zero.
pub fn to_coord(n: f64) -> Result<usize, ArrayError> {
    if !n.is_finite() || n < 0.0 {
        return Err(ArrayError::InvalidSubscript(n));
    }
    Ok(n.trunc() as usize)
}

/// A row-major array. Element `c` lives at `Σ cᵢ × Π sizes after i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Array<T> {
    dims: Vec<usize>,
    data: Vec<T>,
}

impl<T: Clone + Default> Array<T> {
    pub fn new(dims: Vec<usize>) -> Result<Self, ArrayError> {
        let len = dims
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .filter(|&len| len <= MAX_ELEMENTS)
            .ok_or(ArrayError::TooLarge)?;
        Ok(Self {
            dims,
            data: vec![T::default(); len],
        })
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Linear offset of `coords`.
    pub fn index(&self, coords: &[usize]) -> Result<usize, ArrayError> {
        if coords.len() != self.dims.len() {
            return Err(ArrayError::Arity {
                expected: self.dims.len(),
                got: coords.len(),
            });
        }
        let mut offset = 0;
        for (dim, (&c, &size)) in coords.iter().zip(&self.dims).enumerate() {
            if c >= size {
                return Err(ArrayError::OutOfRange {
                    dim: dim + 1,
                    index: c,
                    size,
                });
            }
            offset = offset * size + c;
        }
        Ok(offset)
    }

    pub fn get(&self, coords: &[usize]) -> Result<&T, ArrayError> {
        let idx = self.index(coords)?;
        Ok(&self.data[idx])
    }

    pub fn set(&mut self, coords: &[usize], value: T) -> Result<(), ArrayError> {
        let idx = self.index(coords)?;
        self.data[idx] = value;
        Ok(())
    }
}

/// An array of numbers or of text, chosen by the `$` suffix of its name.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayStore {
    Number(Array<f64>),
    Text(Array<String>),
}

impl ArrayStore {
    pub fn new(text: bool, dims: Vec<usize>) -> Result<Self, ArrayError> {
        Ok(if text {
            ArrayStore::Text(Array::new(dims)?)
        } else {
            ArrayStore::Number(Array::new(dims)?)
        })
    }

    pub fn get(&self, coords: &[usize]) -> Result<Value, ArrayError> {
        Ok(match self {
            ArrayStore::Number(a) => Value::Number(*a.get(coords)?),
            ArrayStore::Text(a) => Value::Text(a.get(coords)?.clone()),
        })
    }

    /// Store `value`, which must match the array's kind.
    pub fn set(&mut self, coords: &[usize], value: Value) -> Result<(), ArrayError> {
        match (self, value) {
            (ArrayStore::Number(a), Value::Number(n)) => a.set(coords, n),
            (ArrayStore::Text(a), Value::Text(s)) => a.set(coords, s),
            (ArrayStore::Number(_), other) => Err(ArrayError::Kind {
                expected: "number",
                found: other.kind_name(),
            }),
            (ArrayStore::Text(_), other) => Err(ArrayError::Kind {
                expected: "text",
                found: other.kind_name(),
            }),
        }
    }

    pub fn dims(&self) -> &[usize] {
        match self {
            ArrayStore::Number(a) => a.dims(),
            ArrayStore::Text(a) => a.dims(),
        }
    }
}
