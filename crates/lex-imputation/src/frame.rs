//! Conversion between polars data frames and [`Dataset`]s.
//!
//! Column types map as follows:
//!
//! | polars dtype                    | attribute                               |
//! |---------------------------------|-----------------------------------------|
//! | integers, floats                | numeric                                 |
//! | boolean                         | nominal `{false, true}`                 |
//! | string, categorical, enum       | nominal, labels in order of appearance  |
//! | date, datetime                  | date (milliseconds since the epoch)     |
//!
//! Nulls and NaNs become missing values. Other dtypes are rejected.

use crate::dataset::{Attribute, AttributeType, Dataset, Row, Schema, Value};
use crate::error::{ImputationError, Result};
use polars::prelude::*;
use std::collections::HashMap;
use tracing::debug;

/// Relation name given to datasets read from a data frame.
pub const FRAME_RELATION: &str = "dataframe";

fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// One converted column: its attribute and its values.
fn convert_column(column: &Column) -> Result<(Attribute, Vec<Value>)> {
    let name = column.name().to_string();
    let series = column.as_materialized_series();

    match series.dtype() {
        dtype if is_numeric_dtype(dtype) => {
            let values = series
                .cast(&DataType::Float64)?
                .f64()?
                .into_iter()
                .map(|v| match v {
                    Some(x) if !x.is_nan() => Value::Number(x),
                    _ => Value::Missing,
                })
                .collect();
            Ok((Attribute::numeric(name), values))
        }
        DataType::Boolean => {
            let values = series
                .bool()?
                .into_iter()
                .map(|v| v.map_or(Value::Missing, |b| Value::Index(usize::from(b))))
                .collect();
            Ok((Attribute::nominal(name, ["false", "true"])?, values))
        }
        DataType::String | DataType::Categorical(..) | DataType::Enum(..) => {
            let strings = series.cast(&DataType::String)?;
            let mut labels: Vec<String> = Vec::new();
            let mut positions: HashMap<&str, usize> = HashMap::new();
            let mut values = Vec::with_capacity(strings.len());
            for v in strings.str()?.into_iter() {
                let value = match v {
                    Some(text) => Value::Index(*positions.entry(text).or_insert_with(|| {
                        labels.push(text.to_string());
                        labels.len() - 1
                    })),
                    None => Value::Missing,
                };
                values.push(value);
            }
            Ok((Attribute::nominal(name, labels)?, values))
        }
        DataType::Date | DataType::Datetime(_, _) => {
            let values = series
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
                .cast(&DataType::Int64)?
                .i64()?
                .into_iter()
                .map(|v| v.map_or(Value::Missing, |ms| Value::Number(ms as f64)))
                .collect();
            Ok((Attribute::date(name), values))
        }
        other => Err(ImputationError::SchemaMismatch(format!(
            "column '{}' has unsupported type {}",
            name, other
        ))),
    }
}

impl Dataset {
    /// Read a data frame, optionally designating the column `target` as target.
    pub fn from_dataframe(df: &DataFrame, target: Option<&str>) -> Result<Dataset> {
        let mut attributes = Vec::with_capacity(df.width());
        let mut columns = Vec::with_capacity(df.width());
        for column in df.get_columns() {
            let (attribute, values) = convert_column(column)?;
            attributes.push(attribute);
            columns.push(values);
        }

        let mut schema = Schema::new(FRAME_RELATION, attributes)?;
        if let Some(name) = target {
            let index = schema.index_of(name).ok_or_else(|| {
                ImputationError::InvalidConfig(format!("target column '{}' not found", name))
            })?;
            schema.set_target(Some(index))?;
        }

        let rows = (0..df.height())
            .map(|r| Row::new(columns.iter().map(|c| c[r]).collect()))
            .collect();
        debug!(
            "Converted data frame with {} rows x {} columns",
            df.height(),
            df.width()
        );
        Dataset::with_rows(schema, rows)
    }

    /// Write this dataset as a data frame. Missing values become nulls.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(self.num_attributes());
        for (i, att) in self.schema().attributes().iter().enumerate() {
            let name: PlSmallStr = att.name().into();
            let series = match att.kind() {
                AttributeType::Numeric => {
                    let values: Vec<Option<f64>> = self.column(i).map(|v| v.as_f64()).collect();
                    Series::new(name, values)
                }
                AttributeType::Date => {
                    let values: Vec<Option<i64>> = self
                        .column(i)
                        .map(|v| v.as_f64().map(|ms| ms as i64))
                        .collect();
                    Series::new(name, values)
                        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
                }
                AttributeType::Nominal | AttributeType::String => {
                    let values: Vec<Option<&str>> = self
                        .column(i)
                        .map(|v| self.schema().text(i, v))
                        .collect();
                    Series::new(name, values)
                }
                AttributeType::Relational => {
                    return Err(ImputationError::SchemaMismatch(format!(
                        "relational attribute '{}' cannot be written to a data frame",
                        att.name()
                    )));
                }
            };
            columns.push(series.into());
        }
        Ok(DataFrame::new(columns)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn frame() -> DataFrame {
        DataFrame::new(vec![
            Series::new("age".into(), &[Some(30i64), None, Some(45)]).into(),
            Series::new("score".into(), &[Some(1.5f64), Some(f64::NAN), Some(2.5)]).into(),
            Series::new("city".into(), &[Some("Oslo"), Some("Rome"), Some("Oslo")]).into(),
            Series::new("member".into(), &[Some(true), None, Some(false)]).into(),
        ])
        .unwrap()
    }

    #[test]
    fn test_types_and_missing_values() {
        let data = Dataset::from_dataframe(&frame(), Some("member")).unwrap();

        assert_eq!(data.target(), Some(3));
        assert_eq!(data.schema().kind(0), AttributeType::Numeric);
        assert_eq!(data.schema().kind(2), AttributeType::Nominal);
        assert_eq!(data.attribute(2).unwrap().labels(), &["Oslo".to_string(), "Rome".to_string()]);
        assert_eq!(data.missing_count(0), 1);
        assert_eq!(data.missing_count(1), 1);
        assert_eq!(data.text(2, 3), Some("false"));
        assert_eq!(data.row(0).unwrap().value(0), Value::Number(30.0));
    }

    #[test]
    fn test_many_distinct_labels_keep_first_appearance_order() {
        let ids: Vec<String> = (0..5000).map(|i| format!("id-{}", i % 2500)).collect();
        let df = DataFrame::new(vec![Series::new("id".into(), ids).into()]).unwrap();
        let data = Dataset::from_dataframe(&df, None).unwrap();

        let att = data.attribute(0).unwrap();
        assert_eq!(att.num_labels(), 2500);
        assert_eq!(att.label(7), Some("id-7"));
        assert_eq!(data.row(2507).unwrap().value(0), Value::Index(7));
    }

    #[test]
    fn test_unknown_target() {
        let err = Dataset::from_dataframe(&frame(), Some("nope")).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_write_back() {
        let data = Dataset::from_dataframe(&frame(), None).unwrap();
        let df = data.to_dataframe().unwrap();

        assert_eq!(df.shape(), (3, 4));
        assert_eq!(df.column("age").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("score").unwrap().null_count(), 1);
        let city = df.column("city").unwrap();
        assert_eq!(city.as_materialized_series().str().unwrap().get(1), Some("Rome"));
    }

    #[test]
    fn test_dates() {
        let days = Series::new("day".into(), &[Some(0i32), Some(1), None])
            .cast(&DataType::Date)
            .unwrap();
        let df = DataFrame::new(vec![days.into()]).unwrap();
        let data = Dataset::from_dataframe(&df, None).unwrap();

        assert_eq!(data.schema().kind(0), AttributeType::Date);
        assert_eq!(data.row(1).unwrap().value(0), Value::Number(86_400_000.0));
        assert!(data.row(2).unwrap().is_missing(0));

        let back = data.to_dataframe().unwrap();
        assert!(matches!(back.column("day").unwrap().dtype(), DataType::Datetime(_, _)));
    }
}
