//! Imputation algorithms: fill in missing values.
//!
//! This module provides:
//! - [`MeansAndModes`]: global weighted mean / mode per attribute
//! - [`NearestNeighbor`]: mean or vote over the k nearest training rows
//! - [`Irmi`]: iterative robust model-based imputation
//! - [`SupervisedPrediction`]: one model per attribute, trained once
//! - [`UserSuppliedValues`]: fixed replacement values
//! - [`NullImputation`]: leaves everything as is

mod irmi;
mod knn;
mod null;
mod statistical;
mod supervised;
mod user_supplied;

pub use irmi::{DEFAULT_EPOCHS, DEFAULT_EPSILON, Irmi, IrmiState};
pub use knn::{DEFAULT_NEIGHBORS, NearestNeighbor};
pub use null::NullImputation;
pub use statistical::{MeansAndModes, Statistic};
pub use supervised::SupervisedPrediction;
pub use user_supplied::{
    DEFAULT_DATE, DEFAULT_DATE_FORMAT, NominalChoice, UserSuppliedValues, parse_date_millis,
};
