//! Statistical imputation: weighted means and modes.
//!
//! Every non-target attribute gets one replacement statistic computed from its
//! observed values, weighted by row weight. Missing cells are then filled with
//! that statistic at apply time.

use crate::algorithm::{Algorithm, Direction, Transform, check_arity};
use crate::dataset::{AttributeType, Dataset, Row, Schema, Value};
use crate::error::Result;
use crate::utils;
use serde::Serialize;
use tracing::debug;

/// Replacement learned for one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Statistic {
    /// Weighted mean of a numeric or date attribute (0 when nothing is observed)
    Mean(f64),
    /// Label index with the highest weighted count; the lowest index wins ties
    Mode(usize),
    /// Leave missing cells as they are
    NoReplacement,
}

impl Statistic {
    fn value(self) -> Option<Value> {
        match self {
            Statistic::Mean(v) => Some(Value::Number(v)),
            Statistic::Mode(i) => Some(Value::Index(i)),
            Statistic::NoReplacement => None,
        }
    }
}

/// Replaces missing values with the attribute's weighted mean or mode.
///
/// The target attribute and string/relational attributes are never filled.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeansAndModes;

impl MeansAndModes {
    pub fn new() -> Self {
        Self
    }

    /// Compute the replacement statistic of every attribute of `data`.
    pub fn statistics(data: &Dataset) -> Vec<Statistic> {
        let schema = data.schema();
        schema
            .attributes()
            .iter()
            .enumerate()
            .map(|(i, att)| {
                if schema.is_target(i) {
                    return Statistic::NoReplacement;
                }
                match att.kind() {
                    AttributeType::Numeric | AttributeType::Date => {
                        Statistic::Mean(utils::weighted_mean(data, i).unwrap_or(0.0))
                    }
                    AttributeType::Nominal => {
                        let counts = utils::label_counts(data, i, att.num_labels());
                        utils::first_max_index(&counts).map_or(Statistic::NoReplacement, Statistic::Mode)
                    }
                    AttributeType::String | AttributeType::Relational => Statistic::NoReplacement,
                }
            })
            .collect()
    }
}

impl Algorithm for MeansAndModes {
    fn name(&self) -> &'static str {
        "MeansAndModes"
    }

    fn direction(&self) -> Direction {
        Direction::Imputation
    }

    fn fit(&self, data: &Dataset) -> Result<Box<dyn Transform>> {
        let statistics = Self::statistics(data);
        for (att, stat) in data.schema().attributes().iter().zip(&statistics) {
            debug!("'{}' -> {:?}", att.name(), stat);
        }
        Ok(Box::new(MeansAndModesState {
            schema: data.schema().clone(),
            statistics,
        }))
    }
}

#[derive(Debug)]
struct MeansAndModesState {
    schema: Schema,
    statistics: Vec<Statistic>,
}

impl Transform for MeansAndModesState {
    fn output_schema(&self) -> &Schema {
        &self.schema
    }

    fn apply_row(&self, row: &Row) -> Result<Row> {
        check_arity(&self.schema, row)?;
        let mut out = row.clone();
        for i in row.missing_indices() {
            if let Some(value) = self.statistics.get(i).and_then(|s| s.value()) {
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
    use pretty_assertions::assert_eq;

    // =========================================================================
    // Statistics
    // =========================================================================

    #[test]
    fn test_mean_of_observed_values() {
        let data = dataset(
            vec![Attribute::numeric("x")],
            None,
            vec![vec![num(2.0)], vec![M], vec![num(4.0)], vec![M], vec![num(6.0)]],
        );
        assert_eq!(MeansAndModes::statistics(&data), vec![Statistic::Mean(4.0)]);

        let out = MeansAndModes.build(&data).unwrap().apply(&data).unwrap();
        assert_eq!(out.row(1).unwrap().value(0), num(4.0));
        assert_eq!(out.row(3).unwrap().value(0), num(4.0));
    }

    #[test]
    fn test_mode_tie_goes_to_first_label() {
        let data = dataset(
            vec![Attribute::nominal("c", ["A", "B"]).unwrap()],
            None,
            vec![
                vec![idx(1)],
                vec![idx(1)],
                vec![idx(1)],
                vec![idx(0)],
                vec![idx(0)],
                vec![idx(0)],
                vec![M],
            ],
        );
        assert_eq!(MeansAndModes::statistics(&data), vec![Statistic::Mode(0)]);
    }

    #[test]
    fn test_weights_shift_the_mode() {
        let schema = Schema::new("t", vec![Attribute::nominal("c", ["A", "B"]).unwrap()]).unwrap();
        let data = Dataset::with_rows(
            schema,
            vec![
                Row::weighted(vec![idx(0)], 1.0).unwrap(),
                Row::weighted(vec![idx(0)], 1.0).unwrap(),
                Row::weighted(vec![idx(1)], 3.0).unwrap(),
            ],
        )
        .unwrap();
        assert_eq!(MeansAndModes::statistics(&data), vec![Statistic::Mode(1)]);
    }

    #[test]
    fn test_empty_columns_use_fallbacks() {
        let data = dataset(
            vec![Attribute::numeric("x"), Attribute::nominal("c", ["A"]).unwrap()],
            None,
            vec![vec![M, M]],
        );
        assert_eq!(
            MeansAndModes::statistics(&data),
            vec![Statistic::Mean(0.0), Statistic::NoReplacement]
        );

        let out = MeansAndModes.build(&data).unwrap().apply(&data).unwrap();
        assert_eq!(out.row(0).unwrap().values(), &[num(0.0), M]);
    }

    // =========================================================================
    // Apply
    // =========================================================================

    #[test]
    fn test_target_and_strings_untouched() {
        let data = dataset(
            vec![
                Attribute::numeric("x"),
                Attribute::string("s"),
                Attribute::numeric("y"),
            ],
            Some(2),
            vec![vec![num(1.0), M, num(5.0)], vec![M, M, M]],
        );
        let out = MeansAndModes.build(&data).unwrap().apply(&data).unwrap();
        assert_eq!(out.row(1).unwrap().values(), &[num(1.0), M, M]);
    }

    #[test]
    fn test_input_not_mutated() {
        let data = mixed();
        let before = data.clone();
        let built = MeansAndModes.build(&data).unwrap();
        let _ = built.apply(&data).unwrap();
        let _ = built.apply_row(&data.rows()[1]).unwrap();
        assert_eq!(data, before);
    }

    #[test]
    fn test_rebuild_replaces_state() {
        let first = dataset(vec![Attribute::numeric("x")], None, vec![vec![num(1.0)]]);
        let second = dataset(vec![Attribute::numeric("x")], None, vec![vec![num(9.0)]]);
        let row = Row::new(vec![M]);

        let built = MeansAndModes.build(&first).unwrap();
        assert_eq!(built.apply_row(&row).unwrap().value(0), num(1.0));
        let built = MeansAndModes.build(&second).unwrap();
        assert_eq!(built.apply_row(&row).unwrap().value(0), num(9.0));
    }
}
