//! Baseline learners that ignore their predictors.

use super::{Learner, Model, check_target};
use crate::dataset::{AttributeType, Dataset, Row, Value};
use crate::error::{ImputationError, Result};
use crate::utils;

/// Predicts the weighted mean of a numeric attribute.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanLearner;

/// Predicts the weighted majority label of a nominal attribute.
#[derive(Debug, Clone, Copy, Default)]
pub struct MajorityLearner;

#[derive(Debug)]
struct Constant(Value);

impl Model for Constant {
    fn predict(&self, _row: &Row) -> Result<Value> {
        Ok(self.0)
    }
}

impl Learner for MeanLearner {
    fn name(&self) -> &'static str {
        "Mean"
    }

    fn handles(&self, kind: AttributeType) -> bool {
        kind.is_numeric()
    }

    fn train(&self, data: &Dataset, target: usize, _predictors: &[usize]) -> Result<Box<dyn Model>> {
        check_target(self, data, target)?;
        let mean = utils::weighted_mean(data, target).ok_or_else(|| ImputationError::ModelFailed {
            attribute: data.schema().attribute_label(target),
            reason: "no observed values".to_string(),
        })?;
        Ok(Box::new(Constant(Value::Number(mean))))
    }
}

impl Learner for MajorityLearner {
    fn name(&self) -> &'static str {
        "Majority"
    }

    fn handles(&self, kind: AttributeType) -> bool {
        kind == AttributeType::Nominal
    }

    fn train(&self, data: &Dataset, target: usize, _predictors: &[usize]) -> Result<Box<dyn Model>> {
        check_target(self, data, target)?;
        let labels = data.attribute(target).map_or(0, |a| a.num_labels());
        let counts = utils::label_counts(data, target, labels);
        let majority = utils::first_max_index(&counts).ok_or_else(|| ImputationError::ModelFailed {
            attribute: data.schema().attribute_label(target),
            reason: "no observed labels".to_string(),
        })?;
        Ok(Box::new(Constant(Value::Index(majority))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::test_support::*;

    #[test]
    fn test_mean_learner() {
        let data = mixed();
        let model = MeanLearner.train(&data, 0, &[]).unwrap();
        assert_eq!(model.predict(&data.rows()[2]).unwrap(), num(3.0));
    }

    #[test]
    fn test_majority_learner_first_max() {
        let data = mixed();
        // c has two x and two y observed
        let model = MajorityLearner.train(&data, 2, &[]).unwrap();
        assert_eq!(model.predict(&data.rows()[3]).unwrap(), idx(0));
    }

    #[test]
    fn test_kind_checks() {
        let data = mixed();
        assert!(MeanLearner.train(&data, 2, &[]).is_err());
        assert!(MajorityLearner.train(&data, 0, &[]).is_err());
    }
}
