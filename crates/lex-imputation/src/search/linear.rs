//! Brute-force search with a range-normalized Euclidean distance.

use super::{NeighborIndex, NeighborSearch};
use crate::algorithm::check_arity;
use crate::dataset::{AttributeType, Dataset, Row, Value};
use crate::error::Result;

/// Scans every row for each query.
///
/// Numeric attributes are scaled to `[0, 1]` by their observed range; nominal
/// attributes contribute 0 when equal and 1 otherwise. The target attribute,
/// string and relational attributes never contribute. A missing value on one
/// side counts as the largest possible difference from the other side.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearSearch;

impl NeighborSearch for LinearSearch {
    fn name(&self) -> &'static str {
        "LinearSearch"
    }

    fn index(&self, data: &Dataset) -> Result<Box<dyn NeighborIndex>> {
        let schema = data.schema();
        let mut features = Vec::new();
        for (i, att) in schema.attributes().iter().enumerate() {
            if schema.is_target(i) {
                continue;
            }
            match att.kind() {
                AttributeType::Numeric | AttributeType::Date => {
                    let (min, max) = data
                        .column(i)
                        .filter_map(|v| match v {
                            Value::Number(x) => Some(x),
                            _ => None,
                        })
                        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
                            (lo.min(x), hi.max(x))
                        });
                    features.push(Feature::Numeric {
                        attribute: i,
                        min,
                        span: max - min,
                    });
                }
                AttributeType::Nominal => features.push(Feature::Nominal { attribute: i }),
                AttributeType::String | AttributeType::Relational => {}
            }
        }
        Ok(Box::new(LinearIndex {
            data: data.clone(),
            features,
        }))
    }
}

#[derive(Debug, Clone, Copy)]
enum Feature {
    Numeric { attribute: usize, min: f64, span: f64 },
    Nominal { attribute: usize },
}

impl Feature {
    fn difference(self, a: Value, b: Value) -> f64 {
        match self {
            Feature::Nominal { .. } => match (a.as_index(), b.as_index()) {
                (Some(x), Some(y)) if x == y => 0.0,
                _ => 1.0,
            },
            Feature::Numeric { min, span, .. } => {
                let norm = |v: Value| match v {
                    Value::Number(x) if span.is_finite() && span > 0.0 => Some((x - min) / span),
                    Value::Number(_) => Some(0.0),
                    _ => None,
                };
                match (norm(a), norm(b)) {
                    (Some(x), Some(y)) => x - y,
                    (Some(v), None) | (None, Some(v)) => v.max(1.0 - v),
                    (None, None) => 1.0,
                }
            }
        }
    }

    fn attribute(self) -> usize {
        match self {
            Feature::Numeric { attribute, .. } | Feature::Nominal { attribute } => attribute,
        }
    }
}

#[derive(Debug)]
struct LinearIndex {
    data: Dataset,
    features: Vec<Feature>,
}

impl LinearIndex {
    fn distance(&self, a: &Row, b: &Row) -> f64 {
        self.features
            .iter()
            .map(|f| {
                let d = f.difference(a.value(f.attribute()), b.value(f.attribute()));
                d * d
            })
            .sum::<f64>()
            .sqrt()
    }
}

impl NeighborIndex for LinearIndex {
    fn data(&self) -> &Dataset {
        &self.data
    }

    fn k_nearest(&self, query: &Row, k: usize) -> Result<Vec<usize>> {
        check_arity(self.data.schema(), query)?;
        let mut scored: Vec<(usize, f64)> = self
            .data
            .rows()
            .iter()
            .enumerate()
            .map(|(i, row)| (i, self.distance(query, row)))
            .collect();
        // stable: ties keep dataset order
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        Ok(scored.into_iter().take(k).map(|(i, _)| i).collect())
    }
}
