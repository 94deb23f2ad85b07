use basic_types::Value;

/// Read position over every DATA constant in the program.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataCursor {
    values: Vec<Value>,
    pos: usize,
}

impl DataCursor {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values, pos: 0 }
    }

    /// The next constant, or `None` once all have been read.
    pub fn read(&mut self) -> Option<&Value> {
        let value = self.values.get(self.pos)?;
        self.pos += 1;
        Some(value)
    }

    pub fn restore(&mut self) {
        self.pos = 0;
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_until_exhausted_then_restore() {
        let mut data = DataCursor::new(vec![Value::Number(1.0), Value::Text("A".into())]);
        assert_eq!(data.read(), Some(&Value::Number(1.0)));
        assert_eq!(data.read(), Some(&Value::Text("A".into())));
        assert_eq!(data.read(), None);
        assert_eq!(data.position(), 2);
        data.restore();
        assert_eq!(data.read(), Some(&Value::Number(1.0)));
    }
}
