//! Missing Value Imputation and Injection Library
//!
//! Algorithms that fill in missing values of tabular datasets, and algorithms
//! that introduce missing values into them, sharing one build/apply contract.
//!
//! # Overview
//!
//! - **Dataset model**: typed attributes, weighted rows, an optional target
//!   attribute and a distinguished missing value
//! - **Imputation**: means/modes, k nearest neighbours, iterative robust
//!   model-based imputation (IRMI), single-pass supervised prediction and
//!   user-supplied values
//! - **Injection**: masking of attribute ranges, the target, a reproducible
//!   random percentage of cells, and labels matching literals or a regular
//!   expression (optionally removing them from the header)
//! - **Composition**: sequences of imputations or injections
//! - **Polars bridge**: conversion from and to `DataFrame`s
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lex_imputation::{Algorithm, Dataset, Irmi, RandomPercentage};
//! use polars::prelude::*;
//!
//! let df = CsvReadOptions::default()
//!     .try_into_reader_with_file_path(Some("data.csv".into()))?
//!     .finish()?;
//! let data = Dataset::from_dataframe(&df, Some("class"))?;
//!
//! // Knock out 10% of the values, reproducibly
//! let masked = RandomPercentage::new()
//!     .with_percentage(0.1)
//!     .with_seed(42)
//!     .build(&data)?
//!     .apply(&data)?;
//!
//! // Fill them in again
//! let imputer = Irmi::new().with_epochs(20).build(&masked)?;
//! let filled = imputer.apply(&masked)?;
//! let df = filled.to_dataframe()?;
//! ```
//!
//! # Build and apply
//!
//! [`Algorithm::build`] checks the data against the algorithm's
//! [`Capabilities`] and returns a [`Transform`] holding the learned state.
//! Use [`Processor`] for a single object that is built and then applied,
//! failing with [`ImputationError::Uninitialized`] when applied too early.
//!
//! # Configuration
//!
//! Every algorithm can be described as JSON, see [`config`]:
//!
//! ```rust,ignore
//! use lex_imputation::config::InjectionConfig;
//!
//! let algorithm = InjectionConfig::from_json(
//!     r#"{ "algorithm": "values", "values": "? n/a", "update_header": true }"#,
//! )?
//! .into_algorithm()?;
//! ```

pub mod algorithm;
pub mod capabilities;
pub mod config;
pub mod dataset;
pub mod error;
pub mod frame;
pub mod imputers;
pub mod injectors;
pub mod models;
pub mod range;
pub mod search;
pub mod utils;

// Re-exports for convenient access
pub use algorithm::{Algorithm, Direction, Processor, Sequence, Transform, apply_rows};
pub use capabilities::Capabilities;
pub use config::{ConfigValidationError, ImputationConfig, InjectionConfig};
pub use dataset::{Attribute, AttributeType, Dataset, Row, Schema, Value};
pub use error::{ImputationError, Result as ImputationResult, ResultExt};
pub use imputers::{
    Irmi, IrmiState, MeansAndModes, NearestNeighbor, NominalChoice, NullImputation, Statistic,
    SupervisedPrediction, UserSuppliedValues,
};
pub use injectors::{
    AllWithinRange, ClassOnly, LabelMasking, LabelMatcher, NullInjection, RandomPercentage,
};
pub use models::{
    FeatureEncoder, Learner, LearnerKind, LinearRegression, LogisticRegression, MajorityLearner,
    MeanLearner, Model,
};
pub use range::{AttributeRange, RangeSpec};
pub use search::{LinearSearch, NeighborIndex, NeighborSearch};

// Built states are shared across threads for concurrent apply.
static_assertions::assert_impl_all!(Dataset: Send, Sync);
static_assertions::assert_impl_all!(IrmiState: Send, Sync);
static_assertions::assert_impl_all!(Box<dyn Transform>: Send, Sync);
static_assertions::assert_impl_all!(Sequence: Send, Sync);
