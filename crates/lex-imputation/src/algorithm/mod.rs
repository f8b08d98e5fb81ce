//! The build/apply contract shared by imputation and injection algorithms.
//!
//! An [`Algorithm`] is a configured, stateless description. Building it on
//! training data checks its [`Capabilities`] and produces a [`Transform`]: the
//! learned state plus the output schema. Only a `Transform` can apply, so
//! applying before building is impossible at the type level. [`Processor`]
//! wraps both into a single stateful object for callers that need the classic
//! "build, then apply" lifecycle, reporting `Uninitialized` when misused.
//!
//! # Example
//!
//! ```rust,ignore
//! use lex_imputation::{Algorithm, MeansAndModes};
//!
//! let built = MeansAndModes::new().build(&training)?;
//! let filled = built.apply(&test_data)?;
//! ```

mod processor;
mod sequence;

pub use processor::Processor;
pub use sequence::Sequence;

use crate::capabilities::Capabilities;
use crate::dataset::{Dataset, Row, Schema};
use crate::error::{ImputationError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Whether an algorithm fills in missing values or introduces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Imputation,
    Injection,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Imputation => f.write_str("imputation"),
            Direction::Injection => f.write_str("injection"),
        }
    }
}

/// A configured imputation or injection algorithm.
pub trait Algorithm: fmt::Debug + Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    fn direction(&self) -> Direction;

    /// Data this algorithm accepts. Defaults to everything.
    fn capabilities(&self) -> Capabilities {
        Capabilities::all()
    }

    /// Learn state from training data that already passed the capability test.
    fn fit(&self, data: &Dataset) -> Result<Box<dyn Transform>>;

    /// Validate `data` against the capabilities, then learn state from it.
    ///
    /// Nothing is learned if validation fails. Building again produces a fresh,
    /// independent transform.
    fn build(&self, data: &Dataset) -> Result<Box<dyn Transform>> {
        debug!(
            "Building {} '{}' on {} rows x {} attributes",
            self.direction(),
            self.name(),
            data.len(),
            data.num_attributes()
        );
        self.capabilities().test(self.name(), data)?;
        self.fit(data)
    }
}

/// Learned state of a built algorithm.
///
/// Applying never mutates the learned state or its input.
pub trait Transform: fmt::Debug + Send + Sync {
    /// Schema every row produced by this transform conforms to.
    fn output_schema(&self) -> &Schema;

    /// Transform a single row.
    ///
    /// Label and string indices of `row` are read against the schema the
    /// algorithm was built on; the result is bound to [`Transform::output_schema`].
    fn apply_row(&self, row: &Row) -> Result<Row>;

    /// Transform every row independently, in order, into a new dataset.
    fn apply(&self, data: &Dataset) -> Result<Dataset> {
        apply_rows(self, data)
    }
}

/// Default dataset application: `apply_row` per row, string values
/// re-registered against a copy of the output schema.
pub fn apply_rows<T: Transform + ?Sized>(transform: &T, data: &Dataset) -> Result<Dataset> {
    let mut schema = transform.output_schema().clone();
    if data.num_attributes() != schema.width() {
        return Err(ImputationError::SchemaMismatch(format!(
            "dataset has {} attributes, transform expects {}",
            data.num_attributes(),
            schema.width()
        )));
    }
    let mut rows = Vec::with_capacity(data.len());
    for row in data.rows() {
        let out = transform.apply_row(row)?;
        rows.push(schema.reregister_strings(data.schema(), &out)?);
    }
    let mut result = Dataset::new(schema);
    for row in rows {
        result.push_unchecked(row);
    }
    Ok(result)
}

/// Returns rows unchanged; the learned state of the no-op algorithms.
#[derive(Debug)]
pub(crate) struct Passthrough {
    schema: Schema,
}

impl Passthrough {
    pub(crate) fn new(schema: Schema) -> Self {
        Self { schema }
    }
}

impl Transform for Passthrough {
    fn output_schema(&self) -> &Schema {
        &self.schema
    }

    fn apply_row(&self, row: &Row) -> Result<Row> {
        check_arity(&self.schema, row)?;
        Ok(row.clone())
    }
}

/// Check that a row handed to `apply_row` has the arity the transform was built for.
pub(crate) fn check_arity(schema: &Schema, row: &Row) -> Result<()> {
    if row.len() != schema.width() {
        return Err(ImputationError::SchemaMismatch(format!(
            "row has {} values, expected {}",
            row.len(),
            schema.width()
        )));
    }
    Ok(())
}
