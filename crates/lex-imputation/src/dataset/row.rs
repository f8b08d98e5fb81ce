//! Rows and cell values.

use crate::error::{ImputationError, Result};
use serde::{Deserialize, Serialize};

/// A single cell.
///
/// `Missing` is the sentinel for an absent value; it is never confused with a
/// number and survives copies unless a value is explicitly written over it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Missing,
    /// Numeric and date attributes (dates as epoch milliseconds)
    Number(f64),
    /// Nominal, string and relational attributes: index into the attribute's table
    Index(usize),
}

impl Value {
    #[inline]
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Numeric view of the value; label indices map to their position.
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Missing => None,
            Value::Number(v) => Some(v),
            Value::Index(i) => Some(i as f64),
        }
    }

    #[inline]
    pub fn as_index(&self) -> Option<usize> {
        match *self {
            Value::Index(i) => Some(i),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        if value.is_nan() {
            Value::Missing
        } else {
            Value::Number(value)
        }
    }
}

impl From<Option<f64>> for Value {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Value::Missing, Value::from)
    }
}

/// A fixed-arity tuple of values plus a non-negative weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    values: Vec<Value>,
    weight: f64,
}

impl Row {
    /// Create a row with weight 1.0.
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            values,
            weight: 1.0,
        }
    }

    /// Create a row with an explicit weight.
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` for negative or non-finite weights.
    pub fn weighted(values: Vec<Value>, weight: f64) -> Result<Self> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(ImputationError::InvalidValue {
                value: weight.to_string(),
                reason: "row weight must be a finite, non-negative number".to_string(),
            });
        }
        Ok(Self { values, weight })
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Value at `index`, `Missing` when out of bounds.
    pub fn value(&self, index: usize) -> Value {
        self.values.get(index).copied().unwrap_or(Value::Missing)
    }

    pub fn set(&mut self, index: usize, value: Value) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value;
        }
    }

    pub fn set_missing(&mut self, index: usize) {
        self.set(index, Value::Missing);
    }

    pub fn is_missing(&self, index: usize) -> bool {
        self.value(index).is_missing()
    }

    pub fn has_missing(&self) -> bool {
        self.values.iter().any(Value::is_missing)
    }

    /// Indices of all missing cells, ascending.
    pub fn missing_indices(&self) -> Vec<usize> {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_missing())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Same weight, new values.
    pub(crate) fn with_values(&self, values: Vec<Value>) -> Row {
        Row {
            values,
            weight: self.weight,
        }
    }
}
