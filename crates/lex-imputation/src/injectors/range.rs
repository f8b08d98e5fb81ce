//! Unconditional masking of fixed columns.

use crate::algorithm::{Algorithm, Direction, Transform, check_arity};
use crate::dataset::{Dataset, Row, Schema};
use crate::error::Result;
use crate::range::AttributeRange;
use tracing::debug;

/// Marks every attribute of a range missing on every row.
#[derive(Debug, Clone, Default)]
pub struct AllWithinRange {
    range: AttributeRange,
}

impl AllWithinRange {
    pub fn new(range: AttributeRange) -> Self {
        Self { range }
    }

    pub fn range(&self) -> &AttributeRange {
        &self.range
    }
}

impl Algorithm for AllWithinRange {
    fn name(&self) -> &'static str {
        "AllWithinRange"
    }

    fn direction(&self) -> Direction {
        Direction::Injection
    }

    fn fit(&self, data: &Dataset) -> Result<Box<dyn Transform>> {
        let columns = self.range.resolve(data.num_attributes())?;
        debug!("Masking columns {}", AttributeRange::from_indices(&columns));
        Ok(Box::new(MaskColumns {
            schema: data.schema().clone(),
            columns,
        }))
    }
}

/// Marks the target attribute missing; a no-op without a target.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassOnly;

impl Algorithm for ClassOnly {
    fn name(&self) -> &'static str {
        "ClassOnly"
    }

    fn direction(&self) -> Direction {
        Direction::Injection
    }

    fn fit(&self, data: &Dataset) -> Result<Box<dyn Transform>> {
        Ok(Box::new(MaskColumns {
            schema: data.schema().clone(),
            columns: data.target().into_iter().collect(),
        }))
    }
}

#[derive(Debug)]
struct MaskColumns {
    schema: Schema,
    columns: Vec<usize>,
}

impl Transform for MaskColumns {
    fn output_schema(&self) -> &Schema {
        &self.schema
    }

    fn apply_row(&self, row: &Row) -> Result<Row> {
        check_arity(&self.schema, row)?;
        let mut out = row.clone();
        for &i in &self.columns {
            out.set_missing(i);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::test_support::*;

    #[test]
    fn test_masks_range() {
        let data = mixed();
        let built = AllWithinRange::new(AttributeRange::new("2-3").unwrap())
            .build(&data)
            .unwrap();
        let out = built.apply(&data).unwrap();
        assert_eq!(out.missing_count(1), data.len());
        assert_eq!(out.missing_count(2), data.len());
        assert_eq!(out.missing_count(0), data.missing_count(0));
    }

    #[test]
    fn test_inverted_range() {
        let data = mixed();
        let built = AllWithinRange::new(AttributeRange::new("1").unwrap().inverted(true))
            .build(&data)
            .unwrap();
        let row = built.apply_row(&data.rows()[0]).unwrap();
        assert_eq!(row.missing_indices(), vec![1, 2, 3]);
    }

    #[test]
    fn test_range_beyond_width_fails() {
        let result = AllWithinRange::new(AttributeRange::new("5").unwrap()).build(&mixed());
        assert_eq!(result.unwrap_err().error_code(), "INVALID_RANGE");
    }

    #[test]
    fn test_class_only() {
        let data = mixed();
        let out = ClassOnly.build(&data).unwrap().apply(&data).unwrap();
        assert_eq!(out.missing_count(3), data.len());
        assert_eq!(out.missing_count(0), 1);
    }

    #[test]
    fn test_class_only_without_target() {
        let mut data = mixed();
        data.set_target(None).unwrap();
        let out = ClassOnly.build(&data).unwrap().apply(&data).unwrap();
        assert_eq!(out, data);
    }
}
