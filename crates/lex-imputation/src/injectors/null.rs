use crate::algorithm::{Algorithm, Direction, Passthrough, Transform};
use crate::dataset::Dataset;
use crate::error::Result;

/// Injection that changes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullInjection;

impl Algorithm for NullInjection {
    fn name(&self) -> &'static str {
        "NullInjection"
    }

    fn direction(&self) -> Direction {
        Direction::Injection
    }

    fn fit(&self, data: &Dataset) -> Result<Box<dyn Transform>> {
        Ok(Box::new(Passthrough::new(data.schema().clone())))
    }
}
