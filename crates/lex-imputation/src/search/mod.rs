//! Nearest-neighbour search over datasets.

mod linear;

pub use linear::LinearSearch;

use crate::dataset::{Dataset, Row};
use crate::error::Result;
use std::fmt;

/// Builds a searchable index over a dataset.
pub trait NeighborSearch: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Index a copy of `data`.
    fn index(&self, data: &Dataset) -> Result<Box<dyn NeighborIndex>>;
}

/// A searchable set of rows.
pub trait NeighborIndex: fmt::Debug + Send + Sync {
    /// The indexed rows.
    fn data(&self) -> &Dataset;

    /// Positions of the `k` rows closest to `query`, nearest first.
    ///
    /// Fewer than `k` positions are returned when the index is smaller.
    /// Equally distant rows keep their dataset order.
    fn k_nearest(&self, query: &Row, k: usize) -> Result<Vec<usize>>;
}
