//! Configuration types for imputation and injection algorithms.
//!
//! Every algorithm of the crate can be described as JSON, validated, and
//! turned into a boxed [`Algorithm`]. Omitted fields take the usual defaults.
//!
//! # Example
//!
//! ```rust,ignore
//! use lex_imputation::config::ImputationConfig;
//!
//! let config = ImputationConfig::from_json(r#"{
//!     "algorithm": "sequence",
//!     "stages": [
//!         { "algorithm": "irmi", "epochs": 20 },
//!         { "algorithm": "means_and_modes" }
//!     ]
//! }"#)?;
//! let algorithm = config.into_algorithm()?;
//! ```

use crate::algorithm::{Algorithm, Sequence};
use crate::dataset::AttributeType;
use crate::error::{ImputationError, Result};
use crate::imputers::{
    Irmi, MeansAndModes, NearestNeighbor, NominalChoice, NullImputation, SupervisedPrediction,
    UserSuppliedValues,
};
use crate::injectors::{AllWithinRange, ClassOnly, LabelMasking, NullInjection, RandomPercentage};
use crate::models::LearnerKind;
use crate::range::RangeSpec;
use serde::{Deserialize, Serialize};

fn default_neighbors() -> usize {
    crate::imputers::DEFAULT_NEIGHBORS
}

fn default_epochs() -> usize {
    crate::imputers::DEFAULT_EPOCHS
}

fn default_epsilon() -> f64 {
    crate::imputers::DEFAULT_EPSILON
}

fn default_nominal_learner() -> LearnerKind {
    LearnerKind::Logistic
}

fn default_numeric_learner() -> LearnerKind {
    LearnerKind::LinearRegression
}

fn default_date() -> String {
    crate::imputers::DEFAULT_DATE.to_string()
}

fn default_date_format() -> String {
    crate::imputers::DEFAULT_DATE_FORMAT.to_string()
}

fn default_seed() -> u64 {
    crate::injectors::DEFAULT_SEED
}

fn default_percentage() -> f64 {
    crate::injectors::DEFAULT_PERCENTAGE
}

fn default_pattern() -> String {
    crate::injectors::DEFAULT_PATTERN.to_string()
}

/// An imputation algorithm and its parameters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum ImputationConfig {
    /// Leave the data as is
    Null,

    /// Replace missing values with the mean or mode of the training data
    #[default]
    MeansAndModes,

    /// Mean / majority vote of the nearest training rows.
    /// Default: 100 neighbors
    NearestNeighbor {
        #[serde(default = "default_neighbors")]
        num_neighbors: usize,
    },

    /// Iterative robust model-based imputation.
    /// Default: 100 epochs, epsilon 5.0, logistic / linear regression
    Irmi {
        #[serde(default = "default_epochs")]
        epochs: usize,
        #[serde(default = "default_epsilon")]
        epsilon: f64,
        #[serde(default)]
        range: RangeSpec,
        #[serde(default = "default_nominal_learner")]
        nominal_learner: LearnerKind,
        #[serde(default = "default_numeric_learner")]
        numeric_learner: LearnerKind,
    },

    /// One model per attribute, trained once
    SupervisedPrediction {
        #[serde(default)]
        range: RangeSpec,
        #[serde(default = "default_nominal_learner")]
        classification: LearnerKind,
        #[serde(default = "default_numeric_learner")]
        regression: LearnerKind,
    },

    /// Fixed replacement values
    UserSupplied {
        #[serde(default)]
        range: RangeSpec,
        #[serde(default)]
        numeric: f64,
        #[serde(default = "default_date")]
        date: String,
        #[serde(default = "default_date_format")]
        date_format: String,
        #[serde(default)]
        nominal: NominalChoice,
    },

    /// Several imputations applied in order
    Sequence {
        #[serde(default)]
        stages: Vec<ImputationConfig>,
    },
}

/// An injection algorithm and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum InjectionConfig {
    /// Leave the data as is
    Null,

    /// Mask every attribute of a range
    AllWithinRange {
        #[serde(default)]
        range: RangeSpec,
    },

    /// Mask the target attribute
    ClassOnly,

    /// Mask a reproducible random share of cells.
    /// Default: seed 1, 20%
    RandomPercentage {
        #[serde(default)]
        range: RangeSpec,
        #[serde(default = "default_seed")]
        seed: u64,
        #[serde(default = "default_percentage")]
        percentage: f64,
    },

    /// Mask labels from a blank-separated list
    Values {
        #[serde(default)]
        range: RangeSpec,
        #[serde(default)]
        values: String,
        #[serde(default)]
        update_header: bool,
    },

    /// Mask labels matching a regular expression.
    /// Default: `\?`
    Regex {
        #[serde(default)]
        range: RangeSpec,
        #[serde(default = "default_pattern")]
        expression: String,
        #[serde(default)]
        update_header: bool,
    },

    /// Several injections applied in order
    Sequence {
        #[serde(default)]
        stages: Vec<InjectionConfig>,
    },
}

impl Default for InjectionConfig {
    fn default() -> Self {
        InjectionConfig::RandomPercentage {
            range: RangeSpec::default(),
            seed: default_seed(),
            percentage: default_percentage(),
        }
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid attribute range '{range}': {reason}")]
    InvalidRange { range: String, reason: String },

    #[error("Invalid KNN neighbors: {0} (must be at least 1)")]
    InvalidKnnNeighbors(usize),

    #[error("Invalid epochs: {0} (must be at least 1)")]
    InvalidEpochs(usize),

    #[error("Invalid epsilon: {0} (must be a non-negative number)")]
    InvalidEpsilon(f64),

    #[error("Invalid percentage: {0} (must be between 0.0 and 1.0)")]
    InvalidPercentage(f64),

    #[error("Learner '{learner:?}' cannot predict {kind} attributes ('{field}')")]
    LearnerMismatch {
        field: String,
        learner: LearnerKind,
        kind: AttributeType,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Stage #{stage}: {source}")]
    Stage {
        stage: usize,
        #[source]
        source: Box<ConfigValidationError>,
    },
}

impl From<ConfigValidationError> for ImputationError {
    fn from(err: ConfigValidationError) -> Self {
        ImputationError::InvalidConfig(err.to_string())
    }
}

fn validate_range(spec: &RangeSpec) -> std::result::Result<(), ConfigValidationError> {
    spec.to_range()
        .map(|_| ())
        .map_err(|e| ConfigValidationError::InvalidRange {
            range: spec.range.clone(),
            reason: e.to_string(),
        })
}

fn validate_learner(
    field: &str,
    learner: LearnerKind,
    kind: AttributeType,
) -> std::result::Result<(), ConfigValidationError> {
    if learner.create().handles(kind) {
        Ok(())
    } else {
        Err(ConfigValidationError::LearnerMismatch {
            field: field.to_string(),
            learner,
            kind,
        })
    }
}

fn validate_stages<T>(
    stages: &[T],
    validate: impl Fn(&T) -> std::result::Result<(), ConfigValidationError>,
) -> std::result::Result<(), ConfigValidationError> {
    for (i, stage) in stages.iter().enumerate() {
        validate(stage).map_err(|e| ConfigValidationError::Stage {
            stage: i + 1,
            source: Box::new(e),
        })?;
    }
    Ok(())
}

impl ImputationConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Configuration of the algorithm called `name`, with default parameters.
    pub fn named(name: &str) -> Result<Self> {
        Ok(serde_json::from_value(serde_json::json!({ "algorithm": name }))?)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        match self {
            ImputationConfig::Null | ImputationConfig::MeansAndModes => Ok(()),
            ImputationConfig::NearestNeighbor { num_neighbors } => {
                if *num_neighbors == 0 {
                    return Err(ConfigValidationError::InvalidKnnNeighbors(*num_neighbors));
                }
                Ok(())
            }
            ImputationConfig::Irmi {
                epochs,
                epsilon,
                range,
                nominal_learner,
                numeric_learner,
            } => {
                if *epochs == 0 {
                    return Err(ConfigValidationError::InvalidEpochs(*epochs));
                }
                if !epsilon.is_finite() || *epsilon < 0.0 {
                    return Err(ConfigValidationError::InvalidEpsilon(*epsilon));
                }
                validate_range(range)?;
                validate_learner("nominal_learner", *nominal_learner, AttributeType::Nominal)?;
                validate_learner("numeric_learner", *numeric_learner, AttributeType::Numeric)
            }
            ImputationConfig::SupervisedPrediction {
                range,
                classification,
                regression,
            } => {
                validate_range(range)?;
                validate_learner("classification", *classification, AttributeType::Nominal)?;
                validate_learner("regression", *regression, AttributeType::Numeric)
            }
            ImputationConfig::UserSupplied {
                range,
                date,
                date_format,
                ..
            } => {
                validate_range(range)?;
                crate::imputers::parse_date_millis(date, date_format)
                    .map(|_| ())
                    .map_err(|e| ConfigValidationError::InvalidValue {
                        field: "date".to_string(),
                        reason: e.to_string(),
                    })
            }
            ImputationConfig::Sequence { stages } => validate_stages(stages, Self::validate),
        }
    }

    /// Validate and create the described algorithm.
    pub fn into_algorithm(self) -> Result<Box<dyn Algorithm>> {
        self.validate()?;
        self.create()
    }

    fn create(self) -> Result<Box<dyn Algorithm>> {
        Ok(match self {
            ImputationConfig::Null => Box::new(NullImputation),
            ImputationConfig::MeansAndModes => Box::new(MeansAndModes::new()),
            ImputationConfig::NearestNeighbor { num_neighbors } => {
                Box::new(NearestNeighbor::new().with_num_neighbors(num_neighbors))
            }
            ImputationConfig::Irmi {
                epochs,
                epsilon,
                range,
                nominal_learner,
                numeric_learner,
            } => Box::new(
                Irmi::new()
                    .with_epochs(epochs)
                    .with_epsilon(epsilon)
                    .with_range(range.to_range()?)
                    .with_nominal_learner(nominal_learner.create())
                    .with_numeric_learner(numeric_learner.create()),
            ),
            ImputationConfig::SupervisedPrediction {
                range,
                classification,
                regression,
            } => Box::new(
                SupervisedPrediction::new()
                    .with_range(range.to_range()?)
                    .with_classification(classification.create())
                    .with_regression(regression.create()),
            ),
            ImputationConfig::UserSupplied {
                range,
                numeric,
                date,
                date_format,
                nominal,
            } => Box::new(
                UserSuppliedValues::new()
                    .with_range(range.to_range()?)
                    .with_numeric(numeric)
                    .with_date(date, date_format)
                    .with_nominal(nominal),
            ),
            ImputationConfig::Sequence { stages } => {
                let stages = stages
                    .into_iter()
                    .map(Self::create)
                    .collect::<Result<Vec<_>>>()?;
                Box::new(Sequence::imputation(stages)?)
            }
        })
    }
}

impl InjectionConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Configuration of the algorithm called `name`, with default parameters.
    pub fn named(name: &str) -> Result<Self> {
        Ok(serde_json::from_value(serde_json::json!({ "algorithm": name }))?)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        match self {
            InjectionConfig::Null | InjectionConfig::ClassOnly => Ok(()),
            InjectionConfig::AllWithinRange { range } | InjectionConfig::Values { range, .. } => {
                validate_range(range)
            }
            InjectionConfig::RandomPercentage {
                range, percentage, ..
            } => {
                if !(0.0..=1.0).contains(percentage) {
                    return Err(ConfigValidationError::InvalidPercentage(*percentage));
                }
                validate_range(range)
            }
            InjectionConfig::Regex {
                range, expression, ..
            } => {
                validate_range(range)?;
                crate::injectors::LabelMatcher::pattern(expression)
                    .map(|_| ())
                    .map_err(|e| ConfigValidationError::InvalidValue {
                        field: "expression".to_string(),
                        reason: e.to_string(),
                    })
            }
            InjectionConfig::Sequence { stages } => validate_stages(stages, Self::validate),
        }
    }

    /// Validate and create the described algorithm.
    pub fn into_algorithm(self) -> Result<Box<dyn Algorithm>> {
        self.validate()?;
        self.create()
    }

    fn create(self) -> Result<Box<dyn Algorithm>> {
        Ok(match self {
            InjectionConfig::Null => Box::new(NullInjection),
            InjectionConfig::AllWithinRange { range } => {
                Box::new(AllWithinRange::new(range.to_range()?))
            }
            InjectionConfig::ClassOnly => Box::new(ClassOnly),
            InjectionConfig::RandomPercentage {
                range,
                seed,
                percentage,
            } => Box::new(
                RandomPercentage::new()
                    .with_range(range.to_range()?)
                    .with_seed(seed)
                    .with_percentage(percentage),
            ),
            InjectionConfig::Values {
                range,
                values,
                update_header,
            } => Box::new(
                LabelMasking::values(&values)
                    .with_range(range.to_range()?)
                    .with_update_header(update_header),
            ),
            InjectionConfig::Regex {
                range,
                expression,
                update_header,
            } => Box::new(
                LabelMasking::regex(&expression)?
                    .with_range(range.to_range()?)
                    .with_update_header(update_header),
            ),
            InjectionConfig::Sequence { stages } => {
                let stages = stages
                    .into_iter()
                    .map(Self::create)
                    .collect::<Result<Vec<_>>>()?;
                Box::new(Sequence::injection(stages)?)
            }
        })
    }
}
