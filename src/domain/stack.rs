/// Stack model exposed 1:1 by the Stack Attack game.

use thiserror::Error;

pub const DEFAULT_CAPACITY: usize = 10;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StackError {
    #[error("Stack overflow: capacity {capacity} reached")]
    Overflow { capacity: usize },
    #[error("Stack underflow: stack is empty")]
    Underflow,
    #[error("Cannot push an empty value")]
    EmptyValue,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackModel {
    items: Vec<String>,
    capacity: usize,
}

impl StackModel {
    pub fn new(capacity: usize) -> Self {
        StackModel { items: Vec::with_capacity(capacity), capacity: capacity.max(1) }
    }

    pub fn push(&mut self, value: &str) -> Result<usize, StackError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(StackError::EmptyValue);
        }
        if self.items.len() >= self.capacity {
            return Err(StackError::Overflow { capacity: self.capacity });
        }
        self.items.push(value.to_string());
        Ok(self.items.len())
    }

    pub fn pop(&mut self) -> Result<String, StackError> {
        self.items.pop().ok_or(StackError::Underflow)
    }

    pub fn peek(&self) -> Option<&str> {
        self.items.last().map(String::as_str)
    }

    pub fn size(&self) -> usize {
        self.items.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Bottom to top.
    pub fn items(&self) -> &[String] {
        &self.items
    }
}

impl Default for StackModel {
    fn default() -> Self {
        StackModel::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifo_order() {
        let mut s = StackModel::default();
        s.push("1").ok();
        s.push("2").ok();
        s.push("3").ok();
        assert_eq!(s.peek(), Some("3"));
        assert_eq!(s.pop(), Ok("3".to_string()));
        assert_eq!(s.pop(), Ok("2".to_string()));
        assert_eq!(s.size(), 1);
    }

    #[test]
    fn capacity_is_enforced() {
        let mut s = StackModel::default();
        for i in 0..DEFAULT_CAPACITY {
            assert_eq!(s.push(&i.to_string()), Ok(i + 1));
        }
        assert_eq!(s.push("x"), Err(StackError::Overflow { capacity: 10 }));
        assert_eq!(s.size(), 10);
    }

    #[test]
    fn underflow_and_blank_values() {
        let mut s = StackModel::new(3);
        assert_eq!(s.pop(), Err(StackError::Underflow));
        assert_eq!(s.peek(), None);
        assert_eq!(s.push("  "), Err(StackError::EmptyValue));
        s.push(" a ").ok();
        assert_eq!(s.items(), &["a".to_string()]);
        s.clear();
        assert!(s.is_empty());
    }
}
