//! Sequential composition of algorithms of the same direction.

use crate::algorithm::{Algorithm, Direction, Transform, check_arity};
use crate::dataset::{Dataset, Row, Schema};
use crate::error::{ImputationError, Result};
use crate::imputers::NullImputation;
use crate::injectors::NullInjection;
use tracing::debug;

/// Runs several algorithms one after the other.
///
/// Building threads each stage's output schema into the next stage as its
/// training header; applying feeds each stage's output into the next. Failures
/// are reported as `Stage` errors carrying the 1-based position of the stage.
#[derive(Debug)]
pub struct Sequence {
    direction: Direction,
    stages: Vec<Box<dyn Algorithm>>,
}

impl Sequence {
    /// Compose imputation stages. An empty list runs a single no-op stage.
    pub fn imputation(stages: Vec<Box<dyn Algorithm>>) -> Result<Self> {
        Self::new(Direction::Imputation, stages)
    }

    /// Compose injection stages. An empty list runs a single no-op stage.
    pub fn injection(stages: Vec<Box<dyn Algorithm>>) -> Result<Self> {
        Self::new(Direction::Injection, stages)
    }

    /// # Errors
    ///
    /// Returns `InvalidConfig` if a stage has a different direction.
    pub fn new(direction: Direction, mut stages: Vec<Box<dyn Algorithm>>) -> Result<Self> {
        if stages.is_empty() {
            stages.push(match direction {
                Direction::Imputation => Box::new(NullImputation),
                Direction::Injection => Box::new(NullInjection),
            });
        }
        if let Some((i, stage)) = stages
            .iter()
            .enumerate()
            .find(|(_, s)| s.direction() != direction)
        {
            return Err(ImputationError::InvalidConfig(format!(
                "stage #{} '{}' is an {} algorithm, expected {}",
                i + 1,
                stage.name(),
                stage.direction(),
                direction
            )));
        }
        Ok(Self { direction, stages })
    }

    pub fn stages(&self) -> &[Box<dyn Algorithm>] {
        &self.stages
    }
}

impl Algorithm for Sequence {
    fn name(&self) -> &'static str {
        "Sequence"
    }

    fn direction(&self) -> Direction {
        self.direction
    }

    fn fit(&self, data: &Dataset) -> Result<Box<dyn Transform>> {
        let mut built: Vec<Box<dyn Transform>> = Vec::with_capacity(self.stages.len());
        let mut header: Option<Dataset> = None;
        for (i, stage) in self.stages.iter().enumerate() {
            let input = header.as_ref().unwrap_or(data);
            debug!("Building stage #{} '{}'", i + 1, stage.name());
            let transform = stage.build(input).map_err(|e| e.at_stage(i + 1))?;
            header = Some(Dataset::new(transform.output_schema().clone()));
            built.push(transform);
        }
        let schema = match built.last() {
            Some(last) => last.output_schema().clone(),
            None => data.schema().clone(),
        };
        Ok(Box::new(SequenceTransform {
            stages: built,
            input: data.schema().clone(),
            schema,
        }))
    }
}

#[derive(Debug)]
struct SequenceTransform {
    stages: Vec<Box<dyn Transform>>,
    input: Schema,
    schema: Schema,
}

impl Transform for SequenceTransform {
    fn output_schema(&self) -> &Schema {
        &self.schema
    }

    fn apply_row(&self, row: &Row) -> Result<Row> {
        check_arity(&self.input, row)?;
        let mut current = row.clone();
        for (i, stage) in self.stages.iter().enumerate() {
            current = stage.apply_row(&current).map_err(|e| e.at_stage(i + 1))?;
        }
        Ok(current)
    }

    fn apply(&self, data: &Dataset) -> Result<Dataset> {
        let mut stages = self.stages.iter().enumerate();
        let Some((_, first)) = stages.next() else {
            return Ok(data.clone());
        };
        let mut current = first.apply(data).map_err(|e| e.at_stage(1))?;
        for (i, stage) in stages {
            current = stage.apply(&current).map_err(|e| e.at_stage(i + 1))?;
        }
        Ok(current)
    }
}
