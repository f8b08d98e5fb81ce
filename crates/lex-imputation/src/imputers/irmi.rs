//! Iterative robust model-based imputation (IRMI).
//!
//! Build runs a fixed-point iteration over a working copy of the training data:
//!
//! 1. Attributes are ordered by descending missing count (stable for ties).
//! 2. Every missing cell outside the target is bootstrapped with the
//!    attribute's median (numeric, date) or mode (nominal).
//! 3. Each epoch visits the attributes in that order. An attribute with
//!    missing cells that is not yet stable gets a model trained on its
//!    originally observed rows, and its originally missing cells are
//!    re-predicted from the current working values. When the summed squared
//!    change of those cells drops below epsilon the attribute is frozen.
//! 4. The loop ends after the epoch limit or once every modeled attribute is
//!    stable.
//!
//! The last model of each attribute is kept for apply. Attributes without
//! missing values at build time never get a model, so apply leaves their
//! missing cells untouched.

use crate::algorithm::{Algorithm, Direction, Transform, check_arity};
use crate::capabilities::Capabilities;
use crate::dataset::{AttributeType, Dataset, Row, Schema, Value};
use crate::error::{ImputationError, Result};
use crate::models::{Learner, LinearRegression, LogisticRegression, Model, train_attribute};
use crate::range::AttributeRange;
use crate::utils;
use tracing::{debug, info};

pub const DEFAULT_EPOCHS: usize = 100;
pub const DEFAULT_EPSILON: f64 = 5.0;

/// Iterative regression imputer.
#[derive(Debug)]
pub struct Irmi {
    epochs: usize,
    epsilon: f64,
    range: AttributeRange,
    nominal_learner: Box<dyn Learner>,
    numeric_learner: Box<dyn Learner>,
}

impl Default for Irmi {
    fn default() -> Self {
        Self::new()
    }
}

impl Irmi {
    pub fn new() -> Self {
        Self {
            epochs: DEFAULT_EPOCHS,
            epsilon: DEFAULT_EPSILON,
            range: AttributeRange::all(),
            nominal_learner: Box::new(LogisticRegression::new()),
            numeric_learner: Box::new(LinearRegression::new()),
        }
    }

    /// Maximum number of epochs (at least 1).
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs.max(1);
        self
    }

    /// Threshold on the per-attribute sum of squared changes.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Attributes usable as predictors.
    pub fn with_range(mut self, range: AttributeRange) -> Self {
        self.range = range;
        self
    }

    pub fn with_nominal_learner(mut self, learner: Box<dyn Learner>) -> Self {
        self.nominal_learner = learner;
        self
    }

    pub fn with_numeric_learner(mut self, learner: Box<dyn Learner>) -> Self {
        self.numeric_learner = learner;
        self
    }

    fn learner_for(&self, kind: AttributeType) -> Option<&dyn Learner> {
        match kind {
            AttributeType::Nominal => Some(self.nominal_learner.as_ref()),
            AttributeType::Numeric | AttributeType::Date => Some(self.numeric_learner.as_ref()),
            AttributeType::String | AttributeType::Relational => None,
        }
    }

    /// Run the iteration and return the concrete learned state.
    pub fn fit_state(&self, data: &Dataset) -> Result<IrmiState> {
        let schema = data.schema();
        let width = schema.width();
        let target = schema.target();
        let working_range = self.range.resolve(width)?;

        let mut work: Vec<Row> = data.rows().to_vec();
        let mut missing: Vec<Vec<usize>> = vec![Vec::new(); width];
        let mut observed: Vec<Vec<usize>> = vec![Vec::new(); width];
        for (r, row) in work.iter().enumerate() {
            for a in 0..width {
                if row.is_missing(a) {
                    missing[a].push(r);
                } else {
                    observed[a].push(r);
                }
            }
        }

        let mut order: Vec<usize> = (0..width).collect();
        order.sort_by(|&a, &b| missing[b].len().cmp(&missing[a].len()));

        // bootstrap
        for a in 0..width {
            if target == Some(a) {
                continue;
            }
            let baseline = match schema.kind(a) {
                AttributeType::Numeric | AttributeType::Date => {
                    utils::median(data, a).map(Value::Number)
                }
                AttributeType::Nominal => {
                    let labels = schema.attribute(a).map_or(0, |att| att.num_labels());
                    utils::mode(data, a, labels).map(Value::Index)
                }
                AttributeType::String | AttributeType::Relational => None,
            };
            if let Some(value) = baseline {
                for &r in &missing[a] {
                    work[r].set(a, value);
                }
            }
        }

        let eligible: Vec<bool> = (0..width)
            .map(|a| {
                target != Some(a)
                    && !missing[a].is_empty()
                    && !observed[a].is_empty()
                    && self.learner_for(schema.kind(a)).is_some()
            })
            .collect();
        for a in (0..width).filter(|&a| target != Some(a) && !missing[a].is_empty() && !eligible[a]) {
            debug!("Not modeling '{}': nothing observed", schema.attribute_label(a));
        }

        let mut stable = vec![false; width];
        let mut models: Vec<Option<Box<dyn Model>>> = (0..width).map(|_| None).collect();
        let mut epochs_run = 0;

        for epoch in 1..=self.epochs {
            epochs_run = epoch;
            for &a in &order {
                if !eligible[a] || stable[a] {
                    continue;
                }
                let Some(learner) = self.learner_for(schema.kind(a)) else {
                    continue;
                };
                let predictors: Vec<usize> =
                    working_range.iter().copied().filter(|&p| p != a).collect();
                let model = train_attribute(
                    learner,
                    schema,
                    observed[a].iter().map(|&r| &work[r]),
                    a,
                    &predictors,
                )
                .map_err(|e| e.with_context(format!("IRMI epoch {}", epoch)))?;

                let mut sum_of_squares = 0.0;
                for &r in &missing[a] {
                    let current = work[r].value(a);
                    let next = model.predict(&work[r])?;
                    sum_of_squares += squared_change(current, next);
                    if !next.is_missing() {
                        work[r].set(a, next);
                    }
                }
                models[a] = Some(model);

                if sum_of_squares < self.epsilon {
                    stable[a] = true;
                    debug!(
                        "Epoch {}: '{}' stable (change {:.6})",
                        epoch,
                        schema.attribute_label(a),
                        sum_of_squares
                    );
                }
            }
            if eligible.iter().zip(&stable).all(|(e, s)| !*e || *s) {
                break;
            }
        }

        info!(
            "IRMI finished after {} epoch(s): {} attribute(s) modeled, {} stable",
            epochs_run,
            models.iter().filter(|m| m.is_some()).count(),
            stable.iter().filter(|s| **s).count()
        );

        Ok(IrmiState {
            schema: schema.clone(),
            target,
            models,
            stable,
            epochs: epochs_run,
        })
    }
}

fn squared_change(current: Value, next: Value) -> f64 {
    match (current.as_f64(), next.as_f64()) {
        (Some(a), Some(b)) => (a - b).powi(2),
        _ => f64::INFINITY,
    }
}

impl Algorithm for Irmi {
    fn name(&self) -> &'static str {
        "IRMI"
    }

    fn direction(&self) -> Direction {
        Direction::Imputation
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::numeric_and_nominal()
    }

    fn fit(&self, data: &Dataset) -> Result<Box<dyn Transform>> {
        if self.epsilon.is_nan() {
            return Err(ImputationError::InvalidConfig("epsilon must be a number".to_string()));
        }
        Ok(Box::new(self.fit_state(data)?))
    }
}

/// Models learned by [`Irmi`].
#[derive(Debug)]
pub struct IrmiState {
    schema: Schema,
    target: Option<usize>,
    models: Vec<Option<Box<dyn Model>>>,
    stable: Vec<bool>,
    epochs: usize,
}

impl IrmiState {
    /// Attributes that have a model, ascending.
    pub fn modeled_attributes(&self) -> Vec<usize> {
        self.models
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_some())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn is_stable(&self, attribute: usize) -> bool {
        self.stable.get(attribute).copied().unwrap_or(false)
    }

    /// Number of epochs the build ran.
    pub fn epochs(&self) -> usize {
        self.epochs
    }
}

impl Transform for IrmiState {
    fn output_schema(&self) -> &Schema {
        &self.schema
    }

    fn apply_row(&self, row: &Row) -> Result<Row> {
        check_arity(&self.schema, row)?;
        let mut out = row.clone();
        for (i, model) in self.models.iter().enumerate() {
            if self.target == Some(i) || !out.is_missing(i) {
                continue;
            }
            if let Some(model) = model {
                let value = model.predict(&out)?;
                out.set(i, value);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::test_support::*;
    use crate::dataset::Attribute;
    use crate::models::{MajorityLearner, MeanLearner};
    use pretty_assertions::assert_eq;

    /// y = 2x + 1 with holes in y, a nominal attribute following x, a complete z.
    fn linear_data() -> Dataset {
        dataset(
            vec![
                Attribute::numeric("x"),
                Attribute::numeric("y"),
                Attribute::nominal("size", ["small", "large"]).unwrap(),
                Attribute::numeric("z"),
            ],
            None,
            vec![
                vec![num(1.0), num(3.0), idx(0), num(0.5)],
                vec![num(2.0), num(5.0), idx(0), num(0.1)],
                vec![num(3.0), M, idx(0), num(0.7)],
                vec![num(4.0), num(9.0), M, num(0.2)],
                vec![num(5.0), num(11.0), idx(1), num(0.9)],
                vec![num(6.0), M, idx(1), num(0.3)],
                vec![num(7.0), num(15.0), idx(1), num(0.4)],
                vec![num(8.0), num(17.0), idx(1), num(0.6)],
            ],
        )
    }

    // =========================================================================
    // Build
    // =========================================================================

    #[test]
    fn test_imputes_along_the_linear_relation() {
        let data = linear_data();
        let state = Irmi::new().with_epsilon(1e-6).fit_state(&data).unwrap();
        let out = state.apply(&data).unwrap();

        let y2 = out.row(2).unwrap().value(1).as_f64().unwrap();
        let y5 = out.row(5).unwrap().value(1).as_f64().unwrap();
        assert!((y2 - 7.0).abs() < 0.5, "got {}", y2);
        assert!((y5 - 13.0).abs() < 0.5, "got {}", y5);
        assert_eq!(out.missing_count(2), 0);
    }

    #[test]
    fn test_complete_attributes_are_never_modeled() {
        let data = linear_data();
        let state = Irmi::new().fit_state(&data).unwrap();
        assert_eq!(state.modeled_attributes(), vec![1, 2]);

        // z had no missing values at build time, so it stays missing
        let row = Row::new(vec![num(3.0), num(7.0), idx(0), M]);
        assert!(state.apply_row(&row).unwrap().is_missing(3));
    }

    #[test]
    fn test_repeated_builds_are_identical() {
        let data = linear_data();
        let irmi = Irmi::new().with_epochs(5);
        let first = irmi.fit_state(&data).unwrap();
        let second = irmi.fit_state(&data).unwrap();

        assert_eq!(first.epochs(), second.epochs());
        assert_eq!(first.modeled_attributes(), second.modeled_attributes());
        assert_eq!(first.apply(&data).unwrap(), second.apply(&data).unwrap());
    }

    #[test]
    fn test_constant_learners_converge_in_two_epochs() {
        let data = dataset(
            vec![
                Attribute::numeric("x"),
                Attribute::numeric("y"),
                Attribute::nominal("c", ["a", "b"]).unwrap(),
            ],
            None,
            vec![
                vec![num(1.0), num(1.0), idx(1)],
                vec![num(2.0), num(2.0), idx(1)],
                vec![num(3.0), num(9.0), idx(0)],
                vec![num(4.0), M, M],
            ],
        );
        let state = Irmi::new()
            .with_epsilon(1e-9)
            .with_numeric_learner(Box::new(MeanLearner))
            .with_nominal_learner(Box::new(MajorityLearner))
            .fit_state(&data)
            .unwrap();
        // epoch 1 moves y from the median 2 to the mean 4, epoch 2 reproduces it
        assert_eq!(state.epochs(), 2);
        assert!(state.is_stable(1));
        assert!(state.is_stable(2));

        let out = state.apply_row(&data.rows()[3]).unwrap();
        assert_eq!(out.values(), &[num(4.0), num(4.0), idx(1)]);
    }

    #[test]
    fn test_bootstrap_mode_uses_row_weights() {
        let schema = Schema::new(
            "t",
            vec![
                Attribute::numeric("x"),
                Attribute::nominal("c", ["a", "b"]).unwrap(),
            ],
        )
        .unwrap();
        let data = Dataset::with_rows(
            schema,
            vec![
                Row::weighted(vec![num(1.0), idx(0)], 1.0).unwrap(),
                Row::weighted(vec![num(2.0), idx(0)], 1.0).unwrap(),
                Row::weighted(vec![num(3.0), idx(1)], 5.0).unwrap(),
                Row::weighted(vec![num(4.0), M], 1.0).unwrap(),
            ],
        )
        .unwrap();
        let state = Irmi::new()
            .with_epsilon(0.5)
            .with_nominal_learner(Box::new(MajorityLearner))
            .fit_state(&data)
            .unwrap();

        // the weighted baseline "b" already agrees with the weighted majority
        assert_eq!(state.epochs(), 1);
        assert!(state.is_stable(1));
        let out = state.apply_row(&data.rows()[3]).unwrap();
        assert_eq!(out.value(1), idx(1));
    }

    #[test]
    fn test_target_is_never_predicted() {
        let mut data = linear_data();
        data.set_target(Some(1)).unwrap();
        let state = Irmi::new().fit_state(&data).unwrap();
        assert_eq!(state.modeled_attributes(), vec![2]);

        let out = state.apply(&data).unwrap();
        assert_eq!(out.missing_count(1), 2);
        assert_eq!(out.missing_count(2), 0);
    }

    #[test]
    fn test_epoch_limit() {
        let data = linear_data();
        let state = Irmi::new()
            .with_epochs(1)
            .with_epsilon(0.0)
            .fit_state(&data)
            .unwrap();
        assert_eq!(state.epochs(), 1);
        assert!(!state.is_stable(1));
    }

    #[test]
    fn test_unobserved_attribute_is_skipped() {
        let data = dataset(
            vec![Attribute::numeric("x"), Attribute::numeric("empty")],
            None,
            vec![vec![num(1.0), M], vec![num(2.0), M]],
        );
        let state = Irmi::new().fit_state(&data).unwrap();
        assert!(state.modeled_attributes().is_empty());
        assert_eq!(state.epochs(), 1);
    }

    // =========================================================================
    // Contract
    // =========================================================================

    #[test]
    fn test_rejects_string_attributes() {
        let data = dataset(
            vec![Attribute::numeric("x"), Attribute::string("s")],
            None,
            vec![],
        );
        assert_eq!(Irmi::new().build(&data).unwrap_err().error_code(), "CAPABILITY");
    }

    #[test]
    fn test_learner_type_mismatch_propagates() {
        let data = linear_data();
        let error = Irmi::new()
            .with_nominal_learner(Box::new(MeanLearner))
            .build(&data)
            .unwrap_err();
        assert_eq!(error.error_code(), "MODEL_FAILED");
    }

    #[test]
    fn test_input_not_mutated() {
        let data = linear_data();
        let before = data.clone();
        let built = Irmi::new().with_epochs(3).build(&data).unwrap();
        let _ = built.apply(&data).unwrap();
        assert_eq!(data, before);
    }
}
