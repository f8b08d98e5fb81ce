//! Injection algorithms: introduce missing values.
//!
//! This module provides:
//! - [`AllWithinRange`]: masks every attribute of a range
//! - [`ClassOnly`]: masks the target attribute
//! - [`RandomPercentage`]: masks a reproducible random share of cells
//! - [`LabelMasking`]: masks nominal/string values matching literals or a
//!   regular expression, optionally removing them from the nominal domains
//! - [`NullInjection`]: leaves everything as is

mod labels;
mod null;
mod random;
mod range;

pub use labels::{DEFAULT_PATTERN, LabelMasking, LabelMatcher};
pub use null::NullInjection;
pub use random::{DEFAULT_PERCENTAGE, DEFAULT_SEED, RandomPercentage, derive_seeds};
pub use range::{AllWithinRange, ClassOnly};
