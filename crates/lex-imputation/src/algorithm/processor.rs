//! Stateful build-then-apply wrapper around an algorithm.

use crate::algorithm::{Algorithm, Transform};
use crate::dataset::{Dataset, Row, Schema};
use crate::error::{ImputationError, Result};
use tracing::info;

/// Holds an algorithm and, once built, its learned state.
///
/// State lifecycle: unset, populated by a successful [`Processor::build`],
/// read-only while applying, replaced wholesale by the next successful build.
/// A failed build leaves the previous state untouched.
///
/// # Example
///
/// ```rust,ignore
/// use lex_imputation::{Processor, NearestNeighbor};
///
/// let mut processor = Processor::new(Box::new(NearestNeighbor::new().with_num_neighbors(5)));
/// let schema = processor.build(&training)?;
/// let filled = processor.apply(&test_data)?;
/// ```
#[derive(Debug)]
pub struct Processor {
    algorithm: Box<dyn Algorithm>,
    built: Option<Box<dyn Transform>>,
}

// Built processors are handed to worker threads for concurrent apply calls
static_assertions::assert_impl_all!(Processor: Send, Sync);

impl Processor {
    pub fn new(algorithm: Box<dyn Algorithm>) -> Self {
        Self {
            algorithm,
            built: None,
        }
    }

    pub fn algorithm(&self) -> &dyn Algorithm {
        self.algorithm.as_ref()
    }

    pub fn is_built(&self) -> bool {
        self.built.is_some()
    }

    /// Output schema of the last successful build.
    pub fn output_schema(&self) -> Option<&Schema> {
        self.built.as_ref().map(|b| b.output_schema())
    }

    /// Build the algorithm on `data`, replacing any previous state.
    pub fn build(&mut self, data: &Dataset) -> Result<Schema> {
        let built = self.algorithm.build(data)?;
        let schema = built.output_schema().clone();
        info!(
            "Built {} '{}' ({} attributes)",
            self.algorithm.direction(),
            self.algorithm.name(),
            schema.width()
        );
        self.built = Some(built);
        Ok(schema)
    }

    pub fn apply_row(&self, row: &Row) -> Result<Row> {
        self.transform()?.apply_row(row)
    }

    pub fn apply(&self, data: &Dataset) -> Result<Dataset> {
        self.transform()?.apply(data)
    }

    /// Build on `data` and apply to the same data, the batch-filter use case.
    pub fn build_and_apply(&mut self, data: &Dataset) -> Result<Dataset> {
        self.build(data)?;
        self.apply(data)
    }

    fn transform(&self) -> Result<&dyn Transform> {
        self.built
            .as_deref()
            .ok_or_else(|| ImputationError::Uninitialized(self.algorithm.name().to_string()))
    }
}
