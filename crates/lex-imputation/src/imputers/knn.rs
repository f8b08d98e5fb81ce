use crate::algorithm::{Algorithm, Direction, Transform, check_arity};
use crate::capabilities::Capabilities;
use crate::dataset::{AttributeType, Dataset, Row, Schema, Value};
use crate::error::Result;
use crate::search::{LinearSearch, NeighborIndex, NeighborSearch};
use tracing::debug;

/// Default neighbourhood size.
pub const DEFAULT_NEIGHBORS: usize = 100;

/// Fills missing values from the k nearest training rows.
///
/// Numeric and date cells get the mean of the neighbours' observed values (0
/// when none is observed). Nominal cells get the majority label; ties go to
/// the alphabetically smaller label. The neighbour set is computed once per
/// row and shared by all of its missing cells.
#[derive(Debug)]
pub struct NearestNeighbor {
    num_neighbors: usize,
    search: Box<dyn NeighborSearch>,
}

impl Default for NearestNeighbor {
    fn default() -> Self {
        Self::new()
    }
}

impl NearestNeighbor {
    pub fn new() -> Self {
        Self {
            num_neighbors: DEFAULT_NEIGHBORS,
            search: Box::new(LinearSearch),
        }
    }

    /// Set the neighbourhood size (at least 1).
    pub fn with_num_neighbors(mut self, k: usize) -> Self {
        self.num_neighbors = k.max(1);
        self
    }

    pub fn with_search(mut self, search: Box<dyn NeighborSearch>) -> Self {
        self.search = search;
        self
    }

    pub fn num_neighbors(&self) -> usize {
        self.num_neighbors
    }
}

impl Algorithm for NearestNeighbor {
    fn name(&self) -> &'static str {
        "NearestNeighbor"
    }

    fn direction(&self) -> Direction {
        Direction::Imputation
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::numeric_and_nominal()
    }

    fn fit(&self, data: &Dataset) -> Result<Box<dyn Transform>> {
        debug!(
            "Indexing {} rows with {} (k = {})",
            data.len(),
            self.search.name(),
            self.num_neighbors
        );
        Ok(Box::new(NeighborState {
            schema: data.schema().clone(),
            index: self.search.index(data)?,
            k: self.num_neighbors,
        }))
    }
}

#[derive(Debug)]
struct NeighborState {
    schema: Schema,
    index: Box<dyn NeighborIndex>,
    k: usize,
}

impl NeighborState {
    fn mean(&self, neighbors: &[&Row], attribute: usize) -> Value {
        let observed: Vec<f64> = neighbors
            .iter()
            .filter_map(|r| match r.value(attribute) {
                Value::Number(v) => Some(v),
                _ => None,
            })
            .collect();
        if observed.is_empty() {
            return Value::Number(0.0);
        }
        Value::Number(observed.iter().sum::<f64>() / observed.len() as f64)
    }

    fn vote(&self, neighbors: &[&Row], attribute: usize) -> Value {
        let Some(att) = self.schema.attribute(attribute) else {
            return Value::Missing;
        };
        let mut counts = vec![0usize; att.num_labels()];
        for i in neighbors.iter().filter_map(|r| r.value(attribute).as_index()) {
            if let Some(c) = counts.get_mut(i) {
                *c += 1;
            }
        }
        let winner = counts
            .iter()
            .enumerate()
            .filter(|(_, c)| **c > 0)
            .max_by(|(a, ca), (b, cb)| {
                // more votes first, then the alphabetically smaller label
                ca.cmp(cb).then_with(|| {
                    let la = att.label(*a).unwrap_or_default();
                    let lb = att.label(*b).unwrap_or_default();
                    lb.cmp(la)
                })
            })
            .map(|(i, _)| i);
        winner.map_or(Value::Missing, Value::Index)
    }
}

impl Transform for NeighborState {
    fn output_schema(&self) -> &Schema {
        &self.schema
    }

    fn apply_row(&self, row: &Row) -> Result<Row> {
        check_arity(&self.schema, row)?;
        if !row.has_missing() {
            return Ok(row.clone());
        }
        let training = self.index.data();
        let neighbors: Vec<&Row> = self
            .index
            .k_nearest(row, self.k)?
            .into_iter()
            .filter_map(|i| training.row(i))
            .collect();

        let mut out = row.clone();
        for i in row.missing_indices() {
            let value = match self.schema.kind(i) {
                AttributeType::Numeric | AttributeType::Date => self.mean(&neighbors, i),
                AttributeType::Nominal => self.vote(&neighbors, i),
                AttributeType::String | AttributeType::Relational => continue,
            };
            out.set(i, value);
        }
        Ok(out)
    }
}
