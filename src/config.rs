//! Configuration types for the preprocessing pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup. Column contracts that the
//! original workflow spread across hardcoded lists live here explicitly
//! and are validated before a pipeline is built.

use crate::features;
use serde::{Deserialize, Serialize};

/// Configuration for the preprocessing pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration with a
/// fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use carprep::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .knn_neighbors(25)
///     .target_column("price")
///     .scale_features(true)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of neighbors for KNN imputation.
    /// Default: 25
    pub knn_neighbors: usize,

    /// Year used as the reference point for `car_age`.
    /// Default: 2024
    pub reference_year: i32,

    /// Identifier column dropped before any transformation, if present.
    /// Default: Some("id")
    pub id_column: Option<String>,

    /// Target column for training.
    /// Default: "price"
    pub target_column: String,

    /// Whether `prepare_for_training` standardizes the scale columns.
    /// Default: true
    pub scale_features: bool,

    /// Columns subjected to IQR outlier removal during training, applied in
    /// order. Each removal recomputes quartiles on the already-filtered
    /// frame, so the order is significant.
    /// Default: ["milage", "price"]
    pub outlier_columns: Vec<String>,

    /// Columns standardized by the scaler during training.
    /// Default: ["brand", "model", "milage", "int_ext_color", "engine_transmission"]
    pub scale_columns: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            knn_neighbors: 25,
            reference_year: 2024,
            id_column: Some("id".to_string()),
            target_column: "price".to_string(),
            scale_features: true,
            outlier_columns: vec!["milage".to_string(), "price".to_string()],
            scale_columns: vec![
                "brand".to_string(),
                "model".to_string(),
                "milage".to_string(),
                "int_ext_color".to_string(),
                "engine_transmission".to_string(),
            ],
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    ///
    /// Outlier and scale columns are applied after feature composition, so
    /// they must not name any of the columns the composer consumes.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.knn_neighbors == 0 {
            return Err(ConfigValidationError::InvalidKnnNeighbors(
                self.knn_neighbors,
            ));
        }

        if self.target_column.is_empty() {
            return Err(ConfigValidationError::EmptyTargetColumn);
        }

        for col in self.outlier_columns.iter().chain(self.scale_columns.iter()) {
            if features::SOURCE_COLUMNS.contains(&col.as_str()) {
                return Err(ConfigValidationError::ConsumedColumn(col.clone()));
            }
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid KNN neighbors: {0} (must be at least 1)")]
    InvalidKnnNeighbors(usize),

    #[error("Target column must not be empty")]
    EmptyTargetColumn,

    #[error(
        "Column '{0}' is consumed by feature composition and no longer exists \
         at the outlier/scaling stage"
    )]
    ConsumedColumn(String),
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    knn_neighbors: Option<usize>,
    reference_year: Option<i32>,
    id_column: Option<Option<String>>,
    target_column: Option<String>,
    scale_features: Option<bool>,
    outlier_columns: Option<Vec<String>>,
    scale_columns: Option<Vec<String>>,
}

impl PipelineConfigBuilder {
    /// Set the number of neighbors for KNN imputation.
    pub fn knn_neighbors(mut self, k: usize) -> Self {
        self.knn_neighbors = Some(k);
        self
    }

    /// Set the reference year used to derive `car_age`.
    pub fn reference_year(mut self, year: i32) -> Self {
        self.reference_year = Some(year);
        self
    }

    /// Set the identifier column dropped before processing.
    pub fn id_column(mut self, column: impl Into<String>) -> Self {
        self.id_column = Some(Some(column.into()));
        self
    }

    /// Disable identifier column dropping entirely.
    pub fn no_id_column(mut self) -> Self {
        self.id_column = Some(None);
        self
    }

    /// Set the target column for training.
    pub fn target_column(mut self, column: impl Into<String>) -> Self {
        self.target_column = Some(column.into());
        self
    }

    /// Enable or disable feature scaling during training preparation.
    pub fn scale_features(mut self, scale: bool) -> Self {
        self.scale_features = Some(scale);
        self
    }

    /// Set the columns subjected to IQR outlier removal, in order.
    pub fn outlier_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outlier_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the columns standardized during training preparation.
    pub fn scale_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scale_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let defaults = PipelineConfig::default();
        let config = PipelineConfig {
            knn_neighbors: self.knn_neighbors.unwrap_or(defaults.knn_neighbors),
            reference_year: self.reference_year.unwrap_or(defaults.reference_year),
            id_column: self.id_column.unwrap_or(defaults.id_column),
            target_column: self.target_column.unwrap_or(defaults.target_column),
            scale_features: self.scale_features.unwrap_or(defaults.scale_features),
            outlier_columns: self.outlier_columns.unwrap_or(defaults.outlier_columns),
            scale_columns: self.scale_columns.unwrap_or(defaults.scale_columns),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.knn_neighbors, 25);
        assert_eq!(config.reference_year, 2024);
        assert_eq!(config.id_column.as_deref(), Some("id"));
        assert_eq!(config.target_column, "price");
        assert!(config.scale_features);
        assert_eq!(config.outlier_columns, vec!["milage", "price"]);
        assert_eq!(config.scale_columns.len(), 5);
    }

    #[test]
    fn test_builder_defaults() {
        let config = PipelineConfig::builder().build().unwrap();
        assert_eq!(config.knn_neighbors, 25);
        assert_eq!(config.target_column, "price");
    }

    #[test]
    fn test_builder_custom_values() {
        let config = PipelineConfig::builder()
            .knn_neighbors(5)
            .reference_year(2025)
            .target_column("log_price")
            .scale_features(false)
            .outlier_columns(["milage"])
            .build()
            .unwrap();

        assert_eq!(config.knn_neighbors, 5);
        assert_eq!(config.reference_year, 2025);
        assert_eq!(config.target_column, "log_price");
        assert!(!config.scale_features);
        assert_eq!(config.outlier_columns, vec!["milage"]);
    }

    #[test]
    fn test_validation_rejects_zero_neighbors() {
        let result = PipelineConfig::builder().knn_neighbors(0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidKnnNeighbors(0)
        ));
    }

    #[test]
    fn test_validation_rejects_consumed_column() {
        let result = PipelineConfig::builder()
            .outlier_columns(["model_year"])
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::ConsumedColumn(col) if col == "model_year"
        ));
    }

    #[test]
    fn test_no_id_column() {
        let config = PipelineConfig::builder().no_id_column().build().unwrap();
        assert_eq!(config.id_column, None);
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = PipelineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: PipelineConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config.knn_neighbors, deserialized.knn_neighbors);
        assert_eq!(config.scale_columns, deserialized.scale_columns);
    }
}
