//! Capability sets: which data an algorithm accepts.
//!
//! Each algorithm declares the attribute types it handles, whether it accepts
//! missing values, and which target configurations (none, or a target of a
//! given type) it supports. [`Capabilities::test`] checks a dataset before any
//! state is built.

use crate::dataset::{AttributeType, Dataset};
use crate::error::{ImputationError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const ALL_TYPES: [AttributeType; 5] = [
    AttributeType::Numeric,
    AttributeType::Nominal,
    AttributeType::String,
    AttributeType::Date,
    AttributeType::Relational,
];

/// Declared compatibility requirements of an algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    attributes: BTreeSet<AttributeType>,
    targets: BTreeSet<AttributeType>,
    missing_values: bool,
    missing_target_values: bool,
    no_target: bool,
}

impl Capabilities {
    /// Accept nothing.
    pub fn none() -> Self {
        Self {
            attributes: BTreeSet::new(),
            targets: BTreeSet::new(),
            missing_values: false,
            missing_target_values: false,
            no_target: false,
        }
    }

    /// Accept every attribute and target type, missing values and no target.
    pub fn all() -> Self {
        Self {
            attributes: ALL_TYPES.into_iter().collect(),
            targets: ALL_TYPES.into_iter().collect(),
            missing_values: true,
            missing_target_values: true,
            no_target: true,
        }
    }

    /// Numeric, date and nominal attributes; any target or none; missing values allowed.
    ///
    /// This is what the model-based and neighbourhood imputers accept.
    pub fn numeric_and_nominal() -> Self {
        Self::none()
            .with_attributes([
                AttributeType::Numeric,
                AttributeType::Date,
                AttributeType::Nominal,
            ])
            .with_targets(ALL_TYPES)
            .with_missing_values(true)
            .with_missing_target_values(true)
            .with_no_target(true)
    }

    pub fn with_attributes(mut self, kinds: impl IntoIterator<Item = AttributeType>) -> Self {
        self.attributes.extend(kinds);
        self
    }

    pub fn with_targets(mut self, kinds: impl IntoIterator<Item = AttributeType>) -> Self {
        self.targets.extend(kinds);
        self
    }

    pub fn with_missing_values(mut self, allow: bool) -> Self {
        self.missing_values = allow;
        self
    }

    pub fn with_missing_target_values(mut self, allow: bool) -> Self {
        self.missing_target_values = allow;
        self
    }

    pub fn with_no_target(mut self, allow: bool) -> Self {
        self.no_target = allow;
        self
    }

    pub fn handles_attribute(&self, kind: AttributeType) -> bool {
        self.attributes.contains(&kind)
    }

    pub fn handles_target(&self, kind: AttributeType) -> bool {
        self.targets.contains(&kind)
    }

    /// Test a dataset, naming the first unmet requirement on failure.
    ///
    /// # Errors
    ///
    /// Returns `Capability` with `algorithm` and the violated requirement.
    pub fn test(&self, algorithm: &str, data: &Dataset) -> Result<()> {
        self.check(data).map_err(|requirement| ImputationError::Capability {
            algorithm: algorithm.to_string(),
            requirement,
        })
    }

    fn check(&self, data: &Dataset) -> std::result::Result<(), String> {
        let schema = data.schema();
        match schema.target() {
            None if !self.no_target => {
                return Err("a target attribute is required".to_string());
            }
            None => {}
            Some(target) => {
                let kind = schema.kind(target);
                if !self.targets.contains(&kind) {
                    return Err(format!("cannot handle {} target attribute", kind));
                }
                if !self.missing_target_values && data.missing_count(target) > 0 {
                    return Err("cannot handle missing target values".to_string());
                }
            }
        }

        for (i, att) in schema.attributes().iter().enumerate() {
            if schema.is_target(i) {
                continue;
            }
            if !self.attributes.contains(&att.kind()) {
                return Err(format!(
                    "cannot handle {} attributes (attribute #{} '{}')",
                    att.kind(),
                    i + 1,
                    att.name()
                ));
            }
            if !self.missing_values && data.missing_count(i) > 0 {
                return Err(format!(
                    "cannot handle missing values (attribute #{} '{}')",
                    i + 1,
                    att.name()
                ));
            }
        }
        Ok(())
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::all()
    }
}
