use crate::algorithm::{Algorithm, Direction, Passthrough, Transform};
use crate::dataset::Dataset;
use crate::error::Result;

/// Imputation that changes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullImputation;

impl Algorithm for NullImputation {
    fn name(&self) -> &'static str {
        "NullImputation"
    }

    fn direction(&self) -> Direction {
        Direction::Imputation
    }

    fn fit(&self, data: &Dataset) -> Result<Box<dyn Transform>> {
        Ok(Box::new(Passthrough::new(data.schema().clone())))
    }
}
