//! Ridge-stabilized least-squares regression for numeric attributes.

use super::{FeatureEncoder, Learner, Model, check_target, observed_rows};
use crate::dataset::{AttributeType, Dataset, Row, Value};
use crate::error::{ImputationError, Result};
use ndarray::{Array1, Array2};

/// Learner for numeric and date attributes.
///
/// Solves the weighted normal equations `(XᵀWX + αI) w = XᵀWy` on centered,
/// standardized features. The small ridge term keeps collinear predictors
/// (one-hot blocks, duplicated columns) solvable.
#[derive(Debug, Clone)]
pub struct LinearRegression {
    ridge: f64,
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearRegression {
    pub fn new() -> Self {
        Self { ridge: 1e-8 }
    }

    /// Set the ridge (L2) regularization strength.
    pub fn with_ridge(mut self, ridge: f64) -> Self {
        self.ridge = ridge.max(0.0);
        self
    }
}

impl Learner for LinearRegression {
    fn name(&self) -> &'static str {
        "LinearRegression"
    }

    fn handles(&self, kind: AttributeType) -> bool {
        kind.is_numeric()
    }

    fn train(&self, data: &Dataset, target: usize, predictors: &[usize]) -> Result<Box<dyn Model>> {
        check_target(self, data, target)?;
        let rows = observed_rows(data, target);
        let weight_sum: f64 = rows.iter().map(|r| r.weight()).sum();
        if rows.is_empty() || weight_sum <= 0.0 {
            return Err(ImputationError::ModelFailed {
                attribute: data.schema().attribute_label(target),
                reason: "no training rows with an observed value".to_string(),
            });
        }

        let encoder = FeatureEncoder::fit(data, predictors);
        let x = encoder.matrix(&rows);
        let y: Array1<f64> = rows
            .iter()
            .map(|r| r.value(target).as_f64().unwrap_or(0.0))
            .collect();
        let w: Array1<f64> = rows.iter().map(|r| r.weight()).collect();

        let y_mean = w.dot(&y) / weight_sum;
        let x_mean = x.t().dot(&w) / weight_sum;
        let xc = &x - &x_mean;
        let yc = &y - y_mean;

        // XᵀW
        let xtw = &xc.t() * &w;
        let mut xtx = xtw.dot(&xc);
        for i in 0..xtx.nrows() {
            xtx[[i, i]] += self.ridge;
        }
        let xty = xtw.dot(&yc);

        let coefficients = solve(xtx, xty);
        let intercept = y_mean - coefficients.dot(&x_mean);

        Ok(Box::new(LinearModel {
            encoder,
            coefficients,
            intercept,
        }))
    }
}

#[derive(Debug)]
struct LinearModel {
    encoder: FeatureEncoder,
    coefficients: Array1<f64>,
    intercept: f64,
}

impl Model for LinearModel {
    fn predict(&self, row: &Row) -> Result<Value> {
        let features = self.encoder.encode(row);
        Ok(Value::from(features.dot(&self.coefficients) + self.intercept))
    }
}

/// Gaussian elimination with partial pivoting.
///
/// Singular directions get a zero coefficient instead of failing.
fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Array1<f64> {
    let n = b.len();
    let mut pivot_ok = vec![true; n];

    for col in 0..n {
        let mut pivot = col;
        for row in col + 1..n {
            if a[[row, col]].abs() > a[[pivot, col]].abs() {
                pivot = row;
            }
        }
        if a[[pivot, col]].abs() < 1e-12 {
            pivot_ok[col] = false;
            continue;
        }
        if pivot != col {
            for k in 0..n {
                a.swap([col, k], [pivot, k]);
            }
            b.swap(col, pivot);
        }
        for row in col + 1..n {
            let factor = a[[row, col]] / a[[col, col]];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[[row, k]] -= factor * a[[col, k]];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        if !pivot_ok[i] {
            continue;
        }
        let mut sum = b[i];
        for j in i + 1..n {
            sum -= a[[i, j]] * x[j];
        }
        x[i] = sum / a[[i, i]];
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::test_support::*;
    use crate::dataset::Attribute;
    use ndarray::array;

    #[test]
    fn test_solve_simple_system() {
        let a = array![[2.0, 1.0], [1.0, 3.0]];
        let b = array![3.0, 5.0];
        let x = solve(a, b);
        assert!((x[0] - 0.8).abs() < 1e-9);
        assert!((x[1] - 1.4).abs() < 1e-9);
    }

    #[test]
    fn test_solve_singular_gives_zero() {
        let a = array![[1.0, 0.0], [0.0, 0.0]];
        let b = array![2.0, 0.0];
        assert_eq!(solve(a, b).to_vec(), vec![2.0, 0.0]);
    }

    #[test]
    fn test_recovers_linear_relation() {
        let data = dataset(
            vec![Attribute::numeric("x"), Attribute::numeric("y")],
            None,
            vec![
                vec![num(1.0), num(3.0)],
                vec![num(2.0), num(5.0)],
                vec![num(3.0), num(7.0)],
                vec![num(4.0), num(9.0)],
                vec![num(10.0), M],
            ],
        );
        let model = LinearRegression::new().train(&data, 1, &[0]).unwrap();
        let prediction = model.predict(&data.rows()[4]).unwrap().as_f64().unwrap();
        assert!((prediction - 21.0).abs() < 1e-4);
    }

    #[test]
    fn test_no_predictors_predicts_mean() {
        let data = dataset(
            vec![Attribute::numeric("y")],
            None,
            vec![vec![num(2.0)], vec![num(4.0)], vec![M]],
        );
        let model = LinearRegression::new().train(&data, 0, &[]).unwrap();
        assert_eq!(model.predict(&data.rows()[2]).unwrap(), num(3.0));
    }

    #[test]
    fn test_refuses_nominal_target() {
        let data = mixed();
        let error = LinearRegression::new().train(&data, 2, &[0]).unwrap_err();
        assert_eq!(error.error_code(), "MODEL_FAILED");
    }

    #[test]
    fn test_all_missing_target_fails() {
        let data = dataset(vec![Attribute::numeric("y")], None, vec![vec![M]]);
        assert!(LinearRegression::new().train(&data, 0, &[]).is_err());
    }
}
