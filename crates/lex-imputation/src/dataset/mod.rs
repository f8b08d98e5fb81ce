//! In-memory tabular dataset model.
//!
//! A [`Dataset`] is an ordered [`Schema`] (attributes plus an optional target
//! attribute) and an ordered list of [`Row`]s conforming to it. Every
//! algorithm in this crate reads and produces this representation; loading and
//! saving files is left to callers (see [`crate::frame`] for the polars bridge).

mod attribute;
mod row;

pub use attribute::{Attribute, AttributeType};
pub use row::{Row, Value};

use crate::error::{ImputationError, Result};
use serde::{Deserialize, Serialize};

/// Ordered attributes plus an optional target ("class") attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    relation: String,
    attributes: Vec<Attribute>,
    target: Option<usize>,
}

impl Schema {
    /// Create a schema without a target attribute.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if two attributes share a name.
    pub fn new(relation: impl Into<String>, attributes: Vec<Attribute>) -> Result<Self> {
        for (i, att) in attributes.iter().enumerate() {
            if attributes[..i].iter().any(|other| other.name() == att.name()) {
                return Err(ImputationError::InvalidConfig(format!(
                    "duplicate attribute name '{}'",
                    att.name()
                )));
            }
        }
        Ok(Self {
            relation: relation.into(),
            attributes,
            target: None,
        })
    }

    /// Builder-style variant of [`Schema::set_target`].
    pub fn with_target(mut self, target: usize) -> Result<Self> {
        self.set_target(Some(target))?;
        Ok(self)
    }

    /// Designate (or clear) the target attribute.
    pub fn set_target(&mut self, target: Option<usize>) -> Result<()> {
        if let Some(index) = target
            && index >= self.attributes.len()
        {
            return Err(ImputationError::SchemaMismatch(format!(
                "target index {} out of bounds for {} attributes",
                index,
                self.attributes.len()
            )));
        }
        self.target = target;
        Ok(())
    }

    pub fn relation(&self) -> &str {
        &self.relation
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, index: usize) -> Option<&Attribute> {
        self.attributes.get(index)
    }

    pub(crate) fn attribute_mut(&mut self, index: usize) -> Option<&mut Attribute> {
        self.attributes.get_mut(index)
    }

    /// Type of the attribute at `index`; out-of-range indices read as relational.
    pub fn kind(&self, index: usize) -> AttributeType {
        self.attributes
            .get(index)
            .map_or(AttributeType::Relational, Attribute::kind)
    }

    /// Name of the attribute at `index`, or `#N` (1-based) when out of range.
    pub fn attribute_label(&self, index: usize) -> String {
        self.attributes
            .get(index)
            .map_or_else(|| format!("#{}", index + 1), |a| a.name().to_string())
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name() == name)
    }

    pub fn width(&self) -> usize {
        self.attributes.len()
    }

    pub fn target(&self) -> Option<usize> {
        self.target
    }

    pub fn is_target(&self, index: usize) -> bool {
        self.target == Some(index)
    }

    /// Text of a nominal or string value.
    pub fn text(&self, attribute: usize, value: Value) -> Option<&str> {
        let att = self.attributes.get(attribute)?;
        if !att.kind().is_textual() {
            return None;
        }
        att.label(value.as_index()?)
    }

    /// Copy of this schema whose attributes are replaced, keeping relation name and target.
    pub(crate) fn with_attributes(&self, attributes: Vec<Attribute>) -> Schema {
        Schema {
            relation: self.relation.clone(),
            attributes,
            target: self.target,
        }
    }

    /// Check that a row type-matches this schema positionally.
    pub fn check_row(&self, row: &Row) -> Result<()> {
        if row.len() != self.width() {
            return Err(ImputationError::SchemaMismatch(format!(
                "row has {} values, schema '{}' has {} attributes",
                row.len(),
                self.relation,
                self.width()
            )));
        }
        for (att, value) in self.attributes.iter().zip(row.values()) {
            let ok = match (att.kind(), value) {
                (_, Value::Missing) => true,
                (AttributeType::Numeric | AttributeType::Date, Value::Number(_)) => true,
                (AttributeType::Nominal | AttributeType::String, Value::Index(i)) => {
                    *i < att.num_labels()
                }
                (AttributeType::Relational, Value::Index(_)) => true,
                _ => false,
            };
            if !ok {
                return Err(ImputationError::SchemaMismatch(format!(
                    "value {:?} does not fit {} attribute '{}'",
                    value,
                    att.kind(),
                    att.name()
                )));
            }
        }
        Ok(())
    }

    /// Check that `other` has the same attribute names and types.
    pub fn check_compatible(&self, other: &Schema) -> Result<()> {
        if self.width() != other.width() {
            return Err(ImputationError::SchemaMismatch(format!(
                "expected {} attributes, got {}",
                self.width(),
                other.width()
            )));
        }
        for (a, b) in self.attributes.iter().zip(other.attributes()) {
            if a.name() != b.name() || a.kind() != b.kind() {
                return Err(ImputationError::SchemaMismatch(format!(
                    "attribute '{}' ({}) does not match '{}' ({})",
                    b.name(),
                    b.kind(),
                    a.name(),
                    a.kind()
                )));
            }
        }
        Ok(())
    }

    /// Translate the string values of `row` from `source`'s string tables into
    /// this schema's, registering values that are not yet known.
    pub(crate) fn reregister_strings(&mut self, source: &Schema, row: &Row) -> Result<Row> {
        let mut values = row.values().to_vec();
        for (i, value) in values.iter_mut().enumerate() {
            if self.kind(i) != AttributeType::String || value.is_missing() {
                continue;
            }
            let text = source.text(i, *value).ok_or_else(|| {
                ImputationError::SchemaMismatch(format!(
                    "string value {:?} of attribute #{} is not registered",
                    value,
                    i + 1
                ))
            })?;
            if let Some(att) = self.attribute_mut(i) {
                *value = Value::Index(att.intern(text)?);
            }
        }
        Ok(row.with_values(values))
    }
}

/// A schema plus rows conforming to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    schema: Schema,
    rows: Vec<Row>,
}

impl Dataset {
    /// Create an empty dataset (a "header").
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }

    /// Create a dataset, validating every row against the schema.
    pub fn with_rows(schema: Schema, rows: Vec<Row>) -> Result<Self> {
        for row in &rows {
            schema.check_row(row)?;
        }
        Ok(Self { schema, rows })
    }

    /// Append a row after validating it.
    pub fn push(&mut self, row: Row) -> Result<()> {
        self.schema.check_row(&row)?;
        self.rows.push(row);
        Ok(())
    }

    pub(crate) fn push_unchecked(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub(crate) fn schema_mut(&mut self) -> &mut Schema {
        &mut self.schema
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn num_attributes(&self) -> usize {
        self.schema.width()
    }

    pub fn attribute(&self, index: usize) -> Option<&Attribute> {
        self.schema.attribute(index)
    }

    pub fn target(&self) -> Option<usize> {
        self.schema.target()
    }

    pub fn set_target(&mut self, target: Option<usize>) -> Result<()> {
        self.schema.set_target(target)
    }

    /// Zero-row copy of this dataset.
    pub fn header(&self) -> Dataset {
        Dataset::new(self.schema.clone())
    }

    pub fn into_parts(self) -> (Schema, Vec<Row>) {
        (self.schema, self.rows)
    }

    /// Values of one attribute across all rows.
    pub fn column(&self, attribute: usize) -> impl Iterator<Item = Value> + '_ {
        self.rows.iter().map(move |r| r.value(attribute))
    }

    pub fn missing_count(&self, attribute: usize) -> usize {
        self.column(attribute).filter(Value::is_missing).count()
    }

    pub fn sum_of_weights(&self) -> f64 {
        self.rows.iter().map(Row::weight).sum()
    }

    /// Text of a nominal/string cell.
    pub fn text(&self, row: usize, attribute: usize) -> Option<&str> {
        let value = self.rows.get(row)?.value(attribute);
        self.schema.text(attribute, value)
    }
}
