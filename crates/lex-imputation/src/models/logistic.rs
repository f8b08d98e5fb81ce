//! Multinomial logistic regression for nominal attributes.

use super::{FeatureEncoder, Learner, Model, check_target, observed_rows};
use crate::dataset::{AttributeType, Dataset, Row, Value};
use crate::error::{ImputationError, Result};
use ndarray::{Array1, Array2, Axis};

/// Softmax regression trained by full-batch gradient descent.
///
/// Training starts from zero weights and visits rows in order, so the same
/// data always produces the same model.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    learning_rate: f64,
    max_iter: usize,
    ridge: f64,
    tol: f64,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    pub fn new() -> Self {
        Self {
            learning_rate: 0.5,
            max_iter: 200,
            ridge: 1e-4,
            tol: 1e-6,
        }
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter.max(1);
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_ridge(mut self, ridge: f64) -> Self {
        self.ridge = ridge.max(0.0);
        self
    }
}

fn softmax_rows(mut logits: Array2<f64>) -> Array2<f64> {
    for mut row in logits.axis_iter_mut(Axis(0)) {
        let max = row.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        if sum > 0.0 {
            row /= sum;
        }
    }
    logits
}

impl Learner for LogisticRegression {
    fn name(&self) -> &'static str {
        "Logistic"
    }

    fn handles(&self, kind: AttributeType) -> bool {
        kind == AttributeType::Nominal
    }

    fn train(&self, data: &Dataset, target: usize, predictors: &[usize]) -> Result<Box<dyn Model>> {
        check_target(self, data, target)?;
        let classes = data.attribute(target).map_or(0, |a| a.num_labels());
        let rows = observed_rows(data, target);
        let weight_sum: f64 = rows.iter().map(|r| r.weight()).sum();
        if classes == 0 || rows.is_empty() || weight_sum <= 0.0 {
            return Err(ImputationError::ModelFailed {
                attribute: data.schema().attribute_label(target),
                reason: "no training rows with an observed label".to_string(),
            });
        }

        let encoder = FeatureEncoder::fit(data, predictors);
        let x = encoder.matrix(&rows);
        let mut y = Array2::<f64>::zeros((rows.len(), classes));
        for (i, row) in rows.iter().enumerate() {
            if let Some(c) = row.value(target).as_index().filter(|&c| c < classes) {
                y[[i, c]] = 1.0;
            }
        }
        let w = Array1::from_iter(rows.iter().map(|r| r.weight() / weight_sum))
            .insert_axis(Axis(1));

        let mut weights = Array2::<f64>::zeros((encoder.width(), classes));
        let mut bias = Array1::<f64>::zeros(classes);

        for _ in 0..self.max_iter {
            let probabilities = softmax_rows(x.dot(&weights) + &bias);
            let errors = (probabilities - &y) * &w;

            let dw = x.t().dot(&errors) + self.ridge * &weights;
            let db = errors.sum_axis(Axis(0));

            let grad_norm = (dw.mapv(|v| v * v).sum() + db.mapv(|v| v * v).sum()).sqrt();
            if grad_norm < self.tol {
                break;
            }
            weights = weights - self.learning_rate * dw;
            bias = bias - self.learning_rate * db;
        }

        Ok(Box::new(LogisticModel {
            encoder,
            weights,
            bias,
        }))
    }
}

#[derive(Debug)]
struct LogisticModel {
    encoder: FeatureEncoder,
    weights: Array2<f64>,
    bias: Array1<f64>,
}

impl Model for LogisticModel {
    fn predict(&self, row: &Row) -> Result<Value> {
        let scores = self.encoder.encode(row).dot(&self.weights) + &self.bias;
        // first maximum wins
        let mut best: Option<(usize, f64)> = None;
        for (i, &s) in scores.iter().enumerate() {
            if best.is_none_or(|(_, b)| s > b) {
                best = Some((i, s));
            }
        }
        Ok(best.map_or(Value::Missing, |(i, _)| Value::Index(i)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::test_support::*;
    use crate::dataset::Attribute;

    fn separable() -> Dataset {
        dataset(
            vec![
                Attribute::numeric("x"),
                Attribute::nominal("c", ["low", "high"]).unwrap(),
            ],
            None,
            vec![
                vec![num(1.0), idx(0)],
                vec![num(2.0), idx(0)],
                vec![num(3.0), idx(0)],
                vec![num(7.0), idx(1)],
                vec![num(8.0), idx(1)],
                vec![num(9.0), idx(1)],
                vec![num(1.5), M],
                vec![num(8.5), M],
            ],
        )
    }

    #[test]
    fn test_separates_classes() {
        let data = separable();
        let model = LogisticRegression::new().train(&data, 1, &[0]).unwrap();
        assert_eq!(model.predict(&data.rows()[6]).unwrap(), idx(0));
        assert_eq!(model.predict(&data.rows()[7]).unwrap(), idx(1));
    }

    #[test]
    fn test_deterministic() {
        let data = separable();
        let a = LogisticRegression::new().train(&data, 1, &[0]).unwrap();
        let b = LogisticRegression::new().train(&data, 1, &[0]).unwrap();
        for row in data.rows() {
            assert_eq!(a.predict(row).unwrap(), b.predict(row).unwrap());
        }
    }

    #[test]
    fn test_single_observed_class() {
        let data = dataset(
            vec![
                Attribute::numeric("x"),
                Attribute::nominal("c", ["a", "b", "c"]).unwrap(),
            ],
            None,
            vec![vec![num(1.0), idx(2)], vec![num(2.0), idx(2)], vec![num(3.0), M]],
        );
        let model = LogisticRegression::new().train(&data, 1, &[0]).unwrap();
        assert_eq!(model.predict(&data.rows()[2]).unwrap(), idx(2));
    }

    #[test]
    fn test_refuses_numeric_target() {
        let data = separable();
        assert!(LogisticRegression::new().train(&data, 0, &[1]).is_err());
    }

    #[test]
    fn test_softmax_rows_sum_to_one() {
        let p = softmax_rows(ndarray::array![[1.0, 2.0, 3.0], [0.0, 0.0, 0.0]]);
        for row in p.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-12);
        }
    }
}
