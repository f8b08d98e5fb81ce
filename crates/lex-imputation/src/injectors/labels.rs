//! Masking of nominal and string values by label text.

use crate::algorithm::{Algorithm, Direction, Transform, check_arity};
use crate::dataset::{Attribute, AttributeType, Dataset, Row, Schema, Value};
use crate::error::{ImputationError, Result};
use crate::range::AttributeRange;
use crate::utils::split_quoted;
use regex::Regex;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Expression used when none is given: the conventional `?` placeholder.
pub const DEFAULT_PATTERN: &str = r"\?";

/// Decides which label texts become missing.
#[derive(Debug, Clone)]
pub enum LabelMatcher {
    /// Exact texts
    Literals(HashSet<String>),
    /// Expression that must match the whole text
    Pattern(Regex),
}

impl LabelMatcher {
    /// Compile `expr` so that it only matches complete labels.
    pub fn pattern(expr: &str) -> Result<Self> {
        Ok(Self::Pattern(Regex::new(&format!("^(?:{})$", expr))?))
    }

    pub fn matches(&self, text: &str) -> bool {
        match self {
            Self::Literals(set) => set.contains(text),
            Self::Pattern(re) => re.is_match(text),
        }
    }

    /// True for an empty literal set, which can never match.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Literals(set) if set.is_empty())
    }
}

/// Marks nominal/string values matching a [`LabelMatcher`] missing.
///
/// With `update_header` enabled the matched labels are also removed from
/// the nominal domains of the output schema; remaining labels are
/// re-indexed against the shrunk domain.
#[derive(Debug, Clone)]
pub struct LabelMasking {
    matcher: LabelMatcher,
    range: AttributeRange,
    update_header: bool,
}

impl LabelMasking {
    pub fn new(matcher: LabelMatcher) -> Self {
        Self {
            matcher,
            range: AttributeRange::all(),
            update_header: false,
        }
    }

    /// Blank-separated list of labels; quotes enclose labels with blanks.
    pub fn values(list: &str) -> Self {
        Self::literals(split_quoted(list))
    }

    pub fn literals<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(LabelMatcher::Literals(labels.into_iter().map(Into::into).collect()))
    }

    pub fn regex(expr: &str) -> Result<Self> {
        Ok(Self::new(LabelMatcher::pattern(expr)?))
    }

    pub fn with_range(mut self, range: AttributeRange) -> Self {
        self.range = range;
        self
    }

    pub fn with_update_header(mut self, update_header: bool) -> Self {
        self.update_header = update_header;
        self
    }

    pub fn matcher(&self) -> &LabelMatcher {
        &self.matcher
    }
}

impl Algorithm for LabelMasking {
    fn name(&self) -> &'static str {
        match self.matcher {
            LabelMatcher::Literals(_) => "Values",
            LabelMatcher::Pattern(_) => "Regex",
        }
    }

    fn direction(&self) -> Direction {
        Direction::Injection
    }

    fn fit(&self, data: &Dataset) -> Result<Box<dyn Transform>> {
        let schema = data.schema();
        let columns: Vec<usize> = self
            .range
            .resolve(schema.width())?
            .into_iter()
            .filter(|&i| schema.kind(i).is_textual())
            .collect();

        if self.matcher.is_empty() {
            warn!("{}: no values to replace", self.name());
        }

        let rewrite = self.update_header && !self.matcher.is_empty();
        let output = if rewrite {
            let mut removed = 0;
            let attributes: Vec<Attribute> = schema
                .attributes()
                .iter()
                .enumerate()
                .map(|(i, att)| {
                    if att.is_nominal() && columns.contains(&i) {
                        let (shrunk, n) = att.without_labels(|l| self.matcher.matches(l));
                        removed += n;
                        shrunk
                    } else {
                        att.clone()
                    }
                })
                .collect();
            if removed == 0 {
                warn!("{}: no labels were removed from the header", self.name());
            } else {
                debug!("{}: removed {} labels from the header", self.name(), removed);
            }
            schema.with_attributes(attributes)
        } else {
            schema.clone()
        };

        Ok(Box::new(LabelState {
            input: schema.clone(),
            output,
            columns,
            matcher: self.matcher.clone(),
            rewrite,
        }))
    }
}

#[derive(Debug)]
struct LabelState {
    input: Schema,
    output: Schema,
    columns: Vec<usize>,
    matcher: LabelMatcher,
    rewrite: bool,
}

impl LabelState {
    /// Mask one row whose label indices refer to `source`.
    fn mask(&self, source: &Schema, row: &Row) -> Result<Row> {
        check_arity(&self.output, row)?;
        let mut values = row.values().to_vec();
        for &i in &self.columns {
            let value = values[i];
            if value.is_missing() {
                continue;
            }
            let text = source.text(i, value).ok_or_else(|| {
                ImputationError::SchemaMismatch(format!(
                    "value {:?} of attribute #{} has no label",
                    value,
                    i + 1
                ))
            })?;
            if self.matcher.matches(text) {
                values[i] = Value::Missing;
            } else if self.rewrite && source.kind(i) == AttributeType::Nominal {
                let index = self
                    .output
                    .attribute(i)
                    .and_then(|att| att.index_of(text))
                    .ok_or_else(|| {
                        ImputationError::SchemaMismatch(format!(
                            "label '{}' of attribute #{} is not in the output header",
                            text,
                            i + 1
                        ))
                    })?;
                values[i] = Value::Index(index);
            }
        }
        Ok(row.with_values(values))
    }
}

impl Transform for LabelState {
    fn output_schema(&self) -> &Schema {
        &self.output
    }

    fn apply_row(&self, row: &Row) -> Result<Row> {
        self.mask(&self.input, row)
    }

    /// Reads labels through the dataset's own schema, so string tables that
    /// grew after build still resolve.
    fn apply(&self, data: &Dataset) -> Result<Dataset> {
        self.input.check_compatible(data.schema())?;
        let mut schema = self.output.clone();
        let mut result = Vec::with_capacity(data.len());
        for row in data.rows() {
            let masked = self.mask(data.schema(), row)?;
            result.push(schema.reregister_strings(data.schema(), &masked)?);
        }
        let mut out = Dataset::new(schema);
        for row in result {
            out.push_unchecked(row);
        }
        Ok(out)
    }
}
