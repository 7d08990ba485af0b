//! Custom error types for the car-data preprocessing pipeline.
//!
//! This module provides the error hierarchy using `thiserror` for better
//! error handling and context throughout the pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for preprocessing operations.
#[derive(Error, Debug)]
pub enum PreprocessingError {
    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No valid values found in a column for computation.
    #[error("No valid values found in column '{0}'")]
    NoValidValues(String),

    /// A categorical column was encountered that the encoder was never
    /// fitted on.
    #[error("Encoder has no mapping for column '{0}'; fit it during training first")]
    EncoderNotFitted(String),

    /// An encoder artifact exists on disk but could not be parsed.
    ///
    /// Deliberately distinct from the file simply not existing, which is an
    /// acceptable condition handled by [`crate::encoder::OrdinalEncoder::load`].
    #[error("Encoder artifact at '{path}' is corrupt or incompatible: {reason}")]
    EncoderCorrupt { path: PathBuf, reason: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PreprocessingError>,
    },
}

impl PreprocessingError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PreprocessingError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for preprocessing operations.
pub type Result<T> = std::result::Result<T, PreprocessingError>;

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
        self.map_err(|e| PreprocessingError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_context() {
        let error = PreprocessingError::ColumnNotFound("engine".to_string())
            .with_context("During feature composition");
        assert!(error.to_string().contains("During feature composition"));
        assert!(error.to_string().contains("engine"));
    }

    #[test]
    fn test_corrupt_encoder_message() {
        let error = PreprocessingError::EncoderCorrupt {
            path: PathBuf::from("models/ordinal_encoder.json"),
            reason: "unexpected end of file".to_string(),
        };
        assert!(error.to_string().contains("ordinal_encoder.json"));
        assert!(error.to_string().contains("corrupt"));
    }

    #[test]
    fn test_result_ext_on_polars_result() {
        let polars_err: std::result::Result<(), polars::error::PolarsError> =
            Err(polars::error::PolarsError::ComputeError("bad cast".into()));
        let err = polars_err.context("While encoding").unwrap_err();
        assert!(err.to_string().contains("While encoding"));
    }
}
