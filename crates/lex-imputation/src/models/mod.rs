//! Predictive models used by the model-based imputers.
//!
//! A [`Learner`] trains a [`Model`] that predicts one attribute of a row from
//! a set of predictor attributes. Learners only see rows whose target value is
//! observed; predictor values may be missing and are filled by the
//! [`FeatureEncoder`] before they reach the numeric solvers.

mod constant;
mod encoder;
mod linear;
mod logistic;

pub use constant::{MajorityLearner, MeanLearner};
pub use encoder::FeatureEncoder;
pub use linear::LinearRegression;
pub use logistic::LogisticRegression;

use crate::dataset::{AttributeType, Dataset, Row, Schema, Value};
use crate::error::{ImputationError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trains models for one attribute type family.
pub trait Learner: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this learner can predict attributes of `kind`.
    fn handles(&self, kind: AttributeType) -> bool;

    /// Train a model predicting `target` from `predictors`.
    ///
    /// Rows with a missing `target` are ignored. `predictors` must not
    /// contain `target`.
    fn train(&self, data: &Dataset, target: usize, predictors: &[usize]) -> Result<Box<dyn Model>>;
}

/// A trained predictor for a single attribute.
pub trait Model: fmt::Debug + Send + Sync {
    /// Predict the target value of `row`. Never reads the target cell itself.
    fn predict(&self, row: &Row) -> Result<Value>;
}

/// Learners selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearnerKind {
    LinearRegression,
    Logistic,
    Mean,
    Majority,
}

impl LearnerKind {
    pub fn create(self) -> Box<dyn Learner> {
        match self {
            LearnerKind::LinearRegression => Box::new(LinearRegression::new()),
            LearnerKind::Logistic => Box::new(LogisticRegression::new()),
            LearnerKind::Mean => Box::new(MeanLearner),
            LearnerKind::Majority => Box::new(MajorityLearner),
        }
    }
}

/// Train `learner` for `target` on those `rows` where the target is observed.
///
/// The per-attribute training step shared by the model-based imputers.
pub(crate) fn train_attribute<'a>(
    learner: &dyn Learner,
    schema: &Schema,
    rows: impl IntoIterator<Item = &'a Row>,
    target: usize,
    predictors: &[usize],
) -> Result<Box<dyn Model>> {
    let mut subset = Dataset::new(schema.clone());
    for row in rows.into_iter().filter(|r| !r.is_missing(target)) {
        subset.push_unchecked(row.clone());
    }
    learner.train(&subset, target, predictors)
}

/// Rows of `data` with an observed `target`.
pub(crate) fn observed_rows(data: &Dataset, target: usize) -> Vec<&Row> {
    data.rows()
        .iter()
        .filter(|r| !r.is_missing(target))
        .collect()
}

/// Reject targets a learner cannot handle, naming the attribute.
pub(crate) fn check_target(learner: &dyn Learner, data: &Dataset, target: usize) -> Result<()> {
    let kind = data.schema().kind(target);
    if learner.handles(kind) {
        return Ok(());
    }
    Err(ImputationError::ModelFailed {
        attribute: data.schema().attribute_label(target),
        reason: format!("{} cannot predict {} attributes", learner.name(), kind),
    })
}
