//! Custom error types for imputation and injection algorithms.
//!
//! This module provides a single error hierarchy using `thiserror` covering
//! capability checks, uninitialized algorithms, attribute ranges and
//! sequential compositions.
//!
//! Errors are serializable so a caller (CLI, service, UI) can forward them as
//! `{code, message}` pairs.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for imputation and injection.
#[derive(Error, Debug)]
pub enum ImputationError {
    /// The dataset violates the algorithm's declared capabilities.
    #[error("Algorithm '{algorithm}' cannot handle the data: {requirement}")]
    Capability {
        algorithm: String,
        requirement: String,
    },

    /// `apply` was called before a successful `build`.
    #[error("Algorithm '{0}' not initialized, call build first")]
    Uninitialized(String),

    /// An attribute range could not be parsed or resolved.
    #[error("Invalid attribute range '{range}': {reason}")]
    InvalidRange { range: String, reason: String },

    /// A stage of a sequential composition failed (1-based position).
    #[error("Algorithm #{stage} failed: {source}")]
    Stage {
        stage: usize,
        #[source]
        source: Box<ImputationError>,
    },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A row or dataset does not conform to the schema it is applied against.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// A nominal domain received the same label twice.
    #[error("Duplicate label '{label}' in attribute '{attribute}'")]
    DuplicateLabel { attribute: String, label: String },

    /// A user supplied value could not be interpreted.
    #[error("Invalid value '{value}': {reason}")]
    InvalidValue { value: String, reason: String },

    /// A model collaborator failed to train or predict.
    #[error("Model for attribute '{attribute}' failed: {reason}")]
    ModelFailed { attribute: String, reason: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regular expression compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ImputationError>,
    },
}

impl ImputationError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ImputationError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Wrap an error with the 1-based position of the failing stage.
    pub fn at_stage(self, stage: usize) -> Self {
        ImputationError::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// Get error code for callers that dispatch on the kind of failure.
    ///
    /// Stage and context wrappers keep their own code so the position of a
    /// failure in a composition is not lost.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Capability { .. } => "CAPABILITY",
            Self::Uninitialized(_) => "UNINITIALIZED",
            Self::InvalidRange { .. } => "INVALID_RANGE",
            Self::Stage { .. } => "STAGE_FAILED",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::SchemaMismatch(_) => "SCHEMA_MISMATCH",
            Self::DuplicateLabel { .. } => "DUPLICATE_LABEL",
            Self::InvalidValue { .. } => "INVALID_VALUE",
            Self::ModelFailed { .. } => "MODEL_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Regex(_) => "REGEX_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// The innermost error, looking through stage and context wrappers.
    pub fn root_cause(&self) -> &ImputationError {
        match self {
            Self::Stage { source, .. } | Self::WithContext { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Stage number of the outermost failing stage, if any.
    pub fn stage(&self) -> Option<usize> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            Self::WithContext { source, .. } => source.stage(),
            _ => None,
        }
    }

    /// Check if this error was raised by applying an unbuilt algorithm.
    pub fn is_uninitialized(&self) -> bool {
        matches!(self.root_cause(), Self::Uninitialized(_))
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for ImputationError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ImputationError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for imputation operations.
pub type Result<T> = std::result::Result<T, ImputationError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ImputationError::Polars(e).with_context(context))
    }
}
