//! Single-pass model-based imputation.

use crate::algorithm::{Algorithm, Direction, Transform, check_arity};
use crate::capabilities::Capabilities;
use crate::dataset::{Dataset, Row, Schema};
use crate::error::Result;
use crate::models::{Learner, LinearRegression, LogisticRegression, Model, train_attribute};
use crate::range::AttributeRange;
use tracing::debug;

/// Trains one model per attribute with missing values, once, without
/// bootstrapping or iteration.
///
/// Both the predicted attributes and their predictors are limited to the
/// configured range; the target attribute is neither. Every model predicts
/// from the row as given, so imputed values never feed other predictions.
#[derive(Debug)]
pub struct SupervisedPrediction {
    range: AttributeRange,
    classification: Box<dyn Learner>,
    regression: Box<dyn Learner>,
}

impl Default for SupervisedPrediction {
    fn default() -> Self {
        Self::new()
    }
}

impl SupervisedPrediction {
    pub fn new() -> Self {
        Self {
            range: AttributeRange::all(),
            classification: Box::new(LogisticRegression::new()),
            regression: Box::new(LinearRegression::new()),
        }
    }

    pub fn with_range(mut self, range: AttributeRange) -> Self {
        self.range = range;
        self
    }

    /// Learner for nominal attributes.
    pub fn with_classification(mut self, learner: Box<dyn Learner>) -> Self {
        self.classification = learner;
        self
    }

    /// Learner for numeric and date attributes.
    pub fn with_regression(mut self, learner: Box<dyn Learner>) -> Self {
        self.regression = learner;
        self
    }
}

impl Algorithm for SupervisedPrediction {
    fn name(&self) -> &'static str {
        "SupervisedPrediction"
    }

    fn direction(&self) -> Direction {
        Direction::Imputation
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::numeric_and_nominal()
    }

    fn fit(&self, data: &Dataset) -> Result<Box<dyn Transform>> {
        let schema = data.schema();
        let selected: Vec<usize> = self
            .range
            .resolve(schema.width())?
            .into_iter()
            .filter(|&i| !schema.is_target(i))
            .collect();

        let mut models = Vec::new();
        for &index in &selected {
            let Some(att) = schema.attribute(index) else {
                continue;
            };
            let learner = if att.is_nominal() {
                self.classification.as_ref()
            } else if att.is_numeric() {
                self.regression.as_ref()
            } else {
                continue;
            };
            if !learner.handles(att.kind()) {
                debug!("Skipping '{}': {} cannot predict it", att.name(), learner.name());
                continue;
            }
            if data.missing_count(index) == 0 {
                debug!("Skipping '{}': no missing values", att.name());
                continue;
            }
            let predictors: Vec<usize> = selected.iter().copied().filter(|&p| p != index).collect();
            debug!("Training {} for '{}'", learner.name(), att.name());
            let model = train_attribute(learner, schema, data.rows(), index, &predictors)?;
            models.push((index, model));
        }

        Ok(Box::new(PredictionState {
            schema: schema.clone(),
            models,
        }))
    }
}

#[derive(Debug)]
struct PredictionState {
    schema: Schema,
    models: Vec<(usize, Box<dyn Model>)>,
}

impl Transform for PredictionState {
    fn output_schema(&self) -> &Schema {
        &self.schema
    }

    fn apply_row(&self, row: &Row) -> Result<Row> {
        check_arity(&self.schema, row)?;
        let mut out = row.clone();
        for (index, model) in &self.models {
            if row.is_missing(*index) {
                out.set(*index, model.predict(row)?);
            }
        }
        Ok(out)
    }
}
