//! Reproducible random masking.
//!
//! Seed derivation: a master `ChaCha8Rng` seeded from the user seed yields one
//! `next_u64()` per selected attribute, in ascending attribute order; each
//! value seeds that attribute's own `ChaCha8Rng`. Every row then draws one
//! `f64` in `[0, 1)` per selected attribute, in attribute order, and the cell
//! is masked when the draw is below the percentage.

use crate::algorithm::{Algorithm, Direction, Transform, apply_rows, check_arity};
use crate::dataset::{Dataset, Row, Schema};
use crate::error::{ImputationError, Result};
use crate::range::AttributeRange;
use parking_lot::Mutex;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

pub const DEFAULT_SEED: u64 = 1;
pub const DEFAULT_PERCENTAGE: f64 = 0.2;

/// Masks each selected cell with a fixed probability.
#[derive(Debug, Clone)]
pub struct RandomPercentage {
    range: AttributeRange,
    seed: u64,
    percentage: f64,
}

impl Default for RandomPercentage {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomPercentage {
    pub fn new() -> Self {
        Self {
            range: AttributeRange::all(),
            seed: DEFAULT_SEED,
            percentage: DEFAULT_PERCENTAGE,
        }
    }

    pub fn with_range(mut self, range: AttributeRange) -> Self {
        self.range = range;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Share of cells to mask, between 0.0 and 1.0.
    pub fn with_percentage(mut self, percentage: f64) -> Self {
        self.percentage = percentage;
        self
    }
}

/// One child seed per selected attribute, drawn from the master stream.
pub fn derive_seeds(seed: u64, attributes: usize) -> Vec<u64> {
    let mut master = ChaCha8Rng::seed_from_u64(seed);
    (0..attributes).map(|_| master.next_u64()).collect()
}

impl Algorithm for RandomPercentage {
    fn name(&self) -> &'static str {
        "RandomPercentage"
    }

    fn direction(&self) -> Direction {
        Direction::Injection
    }

    fn fit(&self, data: &Dataset) -> Result<Box<dyn Transform>> {
        if !(0.0..=1.0).contains(&self.percentage) {
            return Err(ImputationError::InvalidConfig(format!(
                "percentage must be between 0 and 1, got {}",
                self.percentage
            )));
        }
        let columns = self.range.resolve(data.num_attributes())?;
        let seeds = derive_seeds(self.seed, columns.len());
        debug!(
            "Masking {:.1}% of columns {} (seed {})",
            self.percentage * 100.0,
            AttributeRange::from_indices(&columns),
            self.seed
        );
        let streams = Mutex::new(streams_from(&seeds));
        Ok(Box::new(PercentageState {
            schema: data.schema().clone(),
            columns,
            seeds,
            percentage: self.percentage,
            streams,
        }))
    }
}

fn streams_from(seeds: &[u64]) -> Vec<ChaCha8Rng> {
    seeds.iter().map(|&s| ChaCha8Rng::seed_from_u64(s)).collect()
}

#[derive(Debug)]
struct PercentageState {
    schema: Schema,
    columns: Vec<usize>,
    seeds: Vec<u64>,
    percentage: f64,
    /// Position of the row-by-row streams
    streams: Mutex<Vec<ChaCha8Rng>>,
}

impl PercentageState {
    fn mask(&self, streams: &mut [ChaCha8Rng], row: &Row) -> Result<Row> {
        check_arity(&self.schema, row)?;
        let mut out = row.clone();
        for (&i, rng) in self.columns.iter().zip(streams.iter_mut()) {
            if rng.gen_range(0.0..1.0) < self.percentage {
                out.set_missing(i);
            }
        }
        Ok(out)
    }
}

impl Transform for PercentageState {
    fn output_schema(&self) -> &Schema {
        &self.schema
    }

    /// Continues the streams where the previous row left them.
    fn apply_row(&self, row: &Row) -> Result<Row> {
        let mut streams = self.streams.lock();
        self.mask(&mut streams, row)
    }

    /// Restarts the streams, so every dataset application masks the same cells.
    fn apply(&self, data: &Dataset) -> Result<Dataset> {
        let replay = Replay {
            state: self,
            streams: Mutex::new(streams_from(&self.seeds)),
        };
        apply_rows(&replay, data)
    }
}

/// Fresh streams over a borrowed state, for one dataset application.
#[derive(Debug)]
struct Replay<'a> {
    state: &'a PercentageState,
    streams: Mutex<Vec<ChaCha8Rng>>,
}

impl Transform for Replay<'_> {
    fn output_schema(&self) -> &Schema {
        &self.state.schema
    }

    fn apply_row(&self, row: &Row) -> Result<Row> {
        let mut streams = self.streams.lock();
        self.state.mask(&mut streams, row)
    }
}
