//! Fixed, user-supplied replacement values.

use crate::algorithm::{Algorithm, Direction, Transform, check_arity};
use crate::capabilities::Capabilities;
use crate::dataset::{AttributeType, Dataset, Row, Schema, Value};
use crate::error::{ImputationError, Result};
use crate::range::AttributeRange;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_DATE: &str = "2000-01-01";
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// A single label position: `first`, `last` or a 1-based index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum NominalChoice {
    #[default]
    First,
    Last,
    Index(usize),
}

impl NominalChoice {
    /// 0-based label index for a domain of `labels` entries.
    pub fn resolve(self, labels: usize) -> Option<usize> {
        match self {
            _ if labels == 0 => None,
            NominalChoice::First => Some(0),
            NominalChoice::Last => Some(labels - 1),
            NominalChoice::Index(n) if n >= 1 && n <= labels => Some(n - 1),
            NominalChoice::Index(_) => None,
        }
    }
}

impl FromStr for NominalChoice {
    type Err = ImputationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(NominalChoice::First),
            "last" => Ok(NominalChoice::Last),
            other => match other.parse::<usize>() {
                Ok(n) if n >= 1 => Ok(NominalChoice::Index(n)),
                _ => Err(ImputationError::InvalidValue {
                    value: s.to_string(),
                    reason: "expected 'first', 'last' or a 1-based index".to_string(),
                }),
            },
        }
    }
}

impl TryFrom<String> for NominalChoice {
    type Error = ImputationError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<NominalChoice> for String {
    fn from(value: NominalChoice) -> Self {
        value.to_string()
    }
}

impl fmt::Display for NominalChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NominalChoice::First => f.write_str("first"),
            NominalChoice::Last => f.write_str("last"),
            NominalChoice::Index(n) => write!(f, "{}", n),
        }
    }
}

/// Replaces missing values in a range of attributes with fixed values.
///
/// Numeric attributes get a constant, date attributes a date parsed at build
/// time, nominal attributes the label at a chosen position.
#[derive(Debug, Clone)]
pub struct UserSuppliedValues {
    range: AttributeRange,
    numeric: f64,
    date: String,
    date_format: String,
    nominal: NominalChoice,
}

impl Default for UserSuppliedValues {
    fn default() -> Self {
        Self::new()
    }
}

impl UserSuppliedValues {
    pub fn new() -> Self {
        Self {
            range: AttributeRange::all(),
            numeric: 0.0,
            date: DEFAULT_DATE.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            nominal: NominalChoice::First,
        }
    }

    pub fn with_range(mut self, range: AttributeRange) -> Self {
        self.range = range;
        self
    }

    pub fn with_numeric(mut self, value: f64) -> Self {
        self.numeric = value;
        self
    }

    /// Date replacement and its `chrono` format string.
    pub fn with_date(mut self, date: impl Into<String>, format: impl Into<String>) -> Self {
        self.date = date.into();
        self.date_format = format.into();
        self
    }

    pub fn with_nominal(mut self, choice: NominalChoice) -> Self {
        self.nominal = choice;
        self
    }

    /// Parse the date replacement into epoch milliseconds.
    pub fn date_millis(&self) -> Result<f64> {
        parse_date_millis(&self.date, &self.date_format)
    }
}

/// Parse a date or date-time with a `chrono` format into epoch milliseconds (UTC).
pub fn parse_date_millis(text: &str, format: &str) -> Result<f64> {
    let parsed = NaiveDateTime::parse_from_str(text, format).or_else(|_| {
        NaiveDate::parse_from_str(text, format).map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default())
    });
    match parsed {
        Ok(dt) => Ok(dt.and_utc().timestamp_millis() as f64),
        Err(e) => Err(ImputationError::InvalidValue {
            value: text.to_string(),
            reason: format!("cannot parse with format '{}': {}", format, e),
        }),
    }
}

impl Algorithm for UserSuppliedValues {
    fn name(&self) -> &'static str {
        "UserSuppliedValues"
    }

    fn direction(&self) -> Direction {
        Direction::Imputation
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::numeric_and_nominal()
    }

    fn fit(&self, data: &Dataset) -> Result<Box<dyn Transform>> {
        let schema = data.schema();
        let date = self.date_millis()?;
        let mut replacements = vec![None; schema.width()];
        for i in self.range.resolve(schema.width())? {
            let Some(att) = schema.attribute(i) else {
                continue;
            };
            replacements[i] = match att.kind() {
                AttributeType::Numeric => Some(Value::Number(self.numeric)),
                AttributeType::Date => Some(Value::Number(date)),
                AttributeType::Nominal => {
                    let index = self.nominal.resolve(att.num_labels()).ok_or_else(|| {
                        ImputationError::InvalidValue {
                            value: self.nominal.to_string(),
                            reason: format!(
                                "attribute '{}' has {} labels",
                                att.name(),
                                att.num_labels()
                            ),
                        }
                    })?;
                    Some(Value::Index(index))
                }
                AttributeType::String | AttributeType::Relational => None,
            };
        }
        Ok(Box::new(FixedValues {
            schema: schema.clone(),
            replacements,
        }))
    }
}

#[derive(Debug)]
struct FixedValues {
    schema: Schema,
    replacements: Vec<Option<Value>>,
}

impl Transform for FixedValues {
    fn output_schema(&self) -> &Schema {
        &self.schema
    }

    fn apply_row(&self, row: &Row) -> Result<Row> {
        check_arity(&self.schema, row)?;
        let mut out = row.clone();
        for i in row.missing_indices() {
            if let Some(value) = self.replacements.get(i).copied().flatten() {
                out.set(i, value);
            }
        }
        Ok(out)
    }
}
