//! Attribute definitions: names, types and nominal domains.

use crate::error::{ImputationError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The type of values an attribute holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    /// Real numbers
    Numeric,
    /// Category labels from a fixed, ordered domain
    Nominal,
    /// Free text, stored as indices into a per-attribute string table
    String,
    /// Timestamps, stored as milliseconds since the Unix epoch
    Date,
    /// Nested relations; carried through untouched, never interpreted
    Relational,
}

impl AttributeType {
    /// Numeric and date attributes both hold real numbers.
    #[inline]
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Numeric | Self::Date)
    }

    /// Nominal and string attributes hold indices into a label table.
    #[inline]
    pub fn is_textual(self) -> bool {
        matches!(self, Self::Nominal | Self::String)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Nominal => "nominal",
            Self::String => "string",
            Self::Date => "date",
            Self::Relational => "relational",
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, typed column of a dataset.
///
/// For nominal attributes `values` is the domain: an ordered list of unique
/// category labels. For string attributes it is the string table that row
/// values index into; it only ever grows. Other types leave it empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    name: String,
    kind: AttributeType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    values: Vec<String>,
}

impl Attribute {
    fn plain(name: impl Into<String>, kind: AttributeType) -> Self {
        Self {
            name: name.into(),
            kind,
            values: Vec::new(),
        }
    }

    pub fn numeric(name: impl Into<String>) -> Self {
        Self::plain(name, AttributeType::Numeric)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::plain(name, AttributeType::Date)
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::plain(name, AttributeType::String)
    }

    pub fn relational(name: impl Into<String>) -> Self {
        Self::plain(name, AttributeType::Relational)
    }

    /// Create a nominal attribute from its domain.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateLabel` if a label occurs more than once.
    pub fn nominal<I, S>(name: impl Into<String>, labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut attribute = Self::plain(name, AttributeType::Nominal);
        for label in labels {
            let label = label.into();
            if attribute.index_of(&label).is_some() {
                return Err(ImputationError::DuplicateLabel {
                    attribute: attribute.name,
                    label,
                });
            }
            attribute.values.push(label);
        }
        Ok(attribute)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> AttributeType {
        self.kind
    }

    pub fn is_nominal(&self) -> bool {
        self.kind == AttributeType::Nominal
    }

    pub fn is_string(&self) -> bool {
        self.kind == AttributeType::String
    }

    /// True for numeric and date attributes.
    pub fn is_numeric(&self) -> bool {
        self.kind.is_numeric()
    }

    /// Domain of a nominal attribute, or string table of a string attribute.
    pub fn labels(&self) -> &[String] {
        &self.values
    }

    pub fn num_labels(&self) -> usize {
        self.values.len()
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.values.iter().position(|v| v == label)
    }

    /// Register a string value, returning its index in the string table.
    ///
    /// Existing values are reused. Only string attributes accept new values;
    /// nominal domains are fixed once created.
    pub fn intern(&mut self, value: &str) -> Result<usize> {
        if !self.is_string() {
            return Err(ImputationError::SchemaMismatch(format!(
                "cannot add value '{}' to {} attribute '{}'",
                value, self.kind, self.name
            )));
        }
        if let Some(index) = self.index_of(value) {
            return Ok(index);
        }
        self.values.push(value.to_string());
        Ok(self.values.len() - 1)
    }

    /// Copy of this nominal attribute without the labels matching `remove`.
    ///
    /// Returns the new attribute and the number of labels dropped. Remaining
    /// labels keep their relative order.
    pub fn without_labels(&self, remove: impl Fn(&str) -> bool) -> (Attribute, usize) {
        let kept: Vec<String> = self.values.iter().filter(|l| !remove(l.as_str())).cloned().collect();
        let removed = self.values.len() - kept.len();
        let attribute = Attribute {
            name: self.name.clone(),
            kind: self.kind,
            values: kept,
        };
        (attribute, removed)
    }

    /// Copy of this attribute with an empty string table.
    pub(crate) fn emptied(&self) -> Attribute {
        if self.is_string() {
            Attribute::string(self.name.clone())
        } else {
            self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nominal_domain_order_preserved() {
        let att = Attribute::nominal("colour", ["red", "green", "blue"]).unwrap();
        assert_eq!(att.num_labels(), 3);
        assert_eq!(att.label(1), Some("green"));
        assert_eq!(att.index_of("blue"), Some(2));
        assert_eq!(att.index_of("purple"), None);
    }

    #[test]
    fn test_nominal_rejects_duplicates() {
        let result = Attribute::nominal("colour", ["red", "red"]);
        assert!(matches!(
            result,
            Err(ImputationError::DuplicateLabel { .. })
        ));
    }

    #[test]
    fn test_intern_reuses_existing_values() {
        let mut att = Attribute::string("comment");
        assert_eq!(att.intern("hello").unwrap(), 0);
        assert_eq!(att.intern("world").unwrap(), 1);
        assert_eq!(att.intern("hello").unwrap(), 0);
        assert_eq!(att.num_labels(), 2);
    }

    #[test]
    fn test_intern_refuses_nominal() {
        let mut att = Attribute::nominal("a", ["x"]).unwrap();
        assert!(att.intern("y").is_err());
    }

    #[test]
    fn test_without_labels() {
        let att = Attribute::nominal("a", ["?", "x", "unknown", "y"]).unwrap();
        let (shrunk, removed) = att.without_labels(|l| l == "?" || l == "unknown");
        assert_eq!(removed, 2);
        assert_eq!(shrunk.labels(), &["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn test_type_predicates() {
        assert!(AttributeType::Date.is_numeric());
        assert!(!AttributeType::Nominal.is_numeric());
        assert!(AttributeType::String.is_textual());
        assert_eq!(AttributeType::Relational.to_string(), "relational");
    }
}
