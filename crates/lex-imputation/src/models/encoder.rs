//! Row to feature-vector encoding.

use crate::dataset::{Dataset, Row, Value};
use crate::utils;
use ndarray::{Array1, Array2};

#[derive(Debug, Clone)]
enum Column {
    /// Standardized numeric value; missing cells read as the mean (0 after scaling).
    Numeric {
        attribute: usize,
        mean: f64,
        scale: f64,
    },
    /// One indicator per label; missing cells read as the mode, or all zeros.
    OneHot {
        attribute: usize,
        labels: usize,
        fill: Option<usize>,
    },
}

/// Encodes predictor attributes into dense, standardized feature vectors.
///
/// Numeric and date attributes become one standardized column each. Nominal
/// attributes become one indicator column per label. Statistics are taken
/// from the training rows once, so encoding the same row always yields the
/// same vector.
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    columns: Vec<Column>,
    width: usize,
}

impl FeatureEncoder {
    /// Learn encoding statistics for `predictors` from `data`.
    ///
    /// Attributes that are neither numeric nor nominal are skipped.
    pub fn fit(data: &Dataset, predictors: &[usize]) -> Self {
        let mut columns = Vec::with_capacity(predictors.len());
        let mut width = 0;
        for &attribute in predictors {
            let Some(att) = data.attribute(attribute) else {
                continue;
            };
            if att.is_numeric() {
                let mean = utils::weighted_mean(data, attribute).unwrap_or(0.0);
                let scale = std_dev(data, attribute, mean);
                columns.push(Column::Numeric {
                    attribute,
                    mean,
                    scale,
                });
                width += 1;
            } else if att.is_nominal() {
                let labels = att.num_labels();
                let fill = utils::mode(data, attribute, labels);
                columns.push(Column::OneHot {
                    attribute,
                    labels,
                    fill,
                });
                width += labels;
            }
        }
        Self { columns, width }
    }

    /// Number of features produced per row.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn encode(&self, row: &Row) -> Array1<f64> {
        let mut out = Array1::zeros(self.width);
        let mut offset = 0;
        for column in &self.columns {
            match *column {
                Column::Numeric {
                    attribute,
                    mean,
                    scale,
                } => {
                    if let Value::Number(v) = row.value(attribute) {
                        out[offset] = (v - mean) / scale;
                    }
                    offset += 1;
                }
                Column::OneHot {
                    attribute,
                    labels,
                    fill,
                } => {
                    let index = row
                        .value(attribute)
                        .as_index()
                        .filter(|&i| i < labels)
                        .or(fill);
                    if let Some(i) = index {
                        out[offset + i] = 1.0;
                    }
                    offset += labels;
                }
            }
        }
        out
    }

    /// Encode several rows into a `rows x width` matrix.
    pub fn matrix(&self, rows: &[&Row]) -> Array2<f64> {
        let mut matrix = Array2::zeros((rows.len(), self.width));
        for (i, row) in rows.iter().enumerate() {
            matrix.row_mut(i).assign(&self.encode(row));
        }
        matrix
    }
}

/// Weighted standard deviation, 1.0 when degenerate.
fn std_dev(data: &Dataset, attribute: usize, mean: f64) -> f64 {
    let (sum_sq, weight) = data
        .rows()
        .iter()
        .filter_map(|row| match row.value(attribute) {
            Value::Number(v) => Some(((v - mean).powi(2), row.weight())),
            _ => None,
        })
        .fold((0.0, 0.0), |(s, w), (d, rw)| (s + d * rw, w + rw));
    if weight <= 0.0 {
        return 1.0;
    }
    let sd = (sum_sq / weight).sqrt();
    if sd > 1e-12 { sd } else { 1.0 }
}
