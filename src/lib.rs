//! Car-Data Preprocessing Library
//!
//! Prepares tabular used-car listings for price-prediction models, built on
//! Rust and Polars.
//!
//! # Overview
//!
//! The pipeline applies a fixed sequence of transformations:
//!
//! - **KNN imputation**: fills missing values, categorical and numeric, via
//!   neighbor-based estimation over a numeric-encoded copy of the table
//! - **Ordinal encoding**: stable integer codes per categorical column with
//!   a sentinel (-1) for values unseen during fit
//! - **Feature composition**: interaction and age features replace their
//!   source columns
//! - **Outlier removal** (training only): IQR filtering on mileage and price
//! - **Scaling** (training only): standardization of a fixed feature set
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use carprep::{Mode, OrdinalEncoder, Pipeline, PipelineConfig};
//! use polars::prelude::*;
//!
//! // Training: fit the encoder, drop outliers, scale, split X/y
//! let mut pipeline = Pipeline::builder()
//!     .config(PipelineConfig::builder().knn_neighbors(25).build()?)
//!     .build()?;
//! let training_set = pipeline.prepare_for_training(&train_df)?;
//! pipeline.encoder().save("models/ordinal_encoder.json")?;
//!
//! // Inference: reuse the fitted encoder; rows are never dropped
//! let encoder = OrdinalEncoder::load("models/ordinal_encoder.json")?
//!     .expect("encoder artifact missing");
//! let mut pipeline = Pipeline::builder().encoder(encoder).build()?;
//! let features = pipeline.preprocess(&test_df, Mode::Inference)?;
//! ```
//!
//! # Configuration
//!
//! Use [`PipelineConfig`] to customize behavior:
//!
//! ```rust,ignore
//! let config = PipelineConfig::builder()
//!     .knn_neighbors(25)
//!     .reference_year(2024)
//!     .target_column("price")
//!     .outlier_columns(["milage", "price"])
//!     .scale_features(true)
//!     .build()?;
//! ```

pub mod config;
pub mod encoder;
pub mod error;
pub mod features;
pub mod imputers;
pub mod outliers;
pub mod pipeline;
pub mod scaler;
pub mod utils;

// Re-exports for convenient access
pub use config::{ConfigValidationError, PipelineConfig, PipelineConfigBuilder};
pub use encoder::{OrdinalEncoder, UNKNOWN_CODE};
pub use error::{PreprocessingError, Result as PreprocessingResult, ResultExt};
pub use features::{DERIVED_COLUMNS, FeatureComposer, SOURCE_COLUMNS};
pub use imputers::KNNImputer;
pub use outliers::remove_outliers_iqr;
pub use pipeline::{Mode, Pipeline, PipelineBuilder, TrainingSet};
pub use scaler::{ColumnStats, StandardScaler};
