//! The preprocessing pipeline.
//!
//! Composes imputation, categorical encoding, feature composition, outlier
//! removal, and scaling in a fixed order. Training and inference share the
//! first three stages; outlier removal and scaler fitting happen only
//! during training, so inference never drops rows.

use crate::config::PipelineConfig;
use crate::encoder::OrdinalEncoder;
use crate::error::{PreprocessingError, Result};
use crate::features::FeatureComposer;
use crate::imputers::KNNImputer;
use crate::outliers::remove_outliers_iqr;
use crate::scaler::StandardScaler;
use polars::prelude::*;
use tracing::{debug, info};

/// Whether a preprocessing call prepares training data or serves inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Fit the encoder if needed, remove outliers.
    Training,
    /// Transform only; row count is preserved.
    Inference,
}

/// Features and target produced by [`Pipeline::prepare_for_training`].
#[derive(Debug, Clone)]
pub struct TrainingSet {
    /// Feature table X, every column except the target.
    pub features: DataFrame,
    /// Target series y.
    pub target: Series,
    /// The scaler fitted during preparation, when scaling was enabled.
    /// Hand this to inference workflows that need the same standardization.
    pub scaler: Option<StandardScaler>,
}

/// The car-data preprocessing pipeline.
///
/// Use [`Pipeline::builder()`] to construct one, optionally injecting a
/// previously fitted [`OrdinalEncoder`] for inference workflows.
///
/// # Example
///
/// ```rust,ignore
/// use carprep::{Mode, Pipeline, PipelineConfig};
///
/// let mut pipeline = Pipeline::builder()
///     .config(PipelineConfig::builder().knn_neighbors(25).build()?)
///     .build()?;
///
/// let training_set = pipeline.prepare_for_training(&train_df)?;
/// let features = pipeline.preprocess(&test_df, Mode::Inference)?;
/// ```
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    encoder: OrdinalEncoder,
    imputer: KNNImputer,
    composer: FeatureComposer,
}

// The pipeline moves into background tasks in batch workflows.
static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// The encoder currently held by the pipeline.
    ///
    /// After a training call this is fitted; persist it for inference runs.
    pub fn encoder(&self) -> &OrdinalEncoder {
        &self.encoder
    }

    /// The active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full preprocessing sequence on a frame.
    ///
    /// Sequence: drop the id column if present, KNN impute, encode
    /// categoricals, compose features, and (training only) remove outliers
    /// per configured column in order. Takes `&mut self` because training
    /// may fit the encoder.
    pub fn preprocess(&mut self, df: &DataFrame, mode: Mode) -> Result<DataFrame> {
        info!(
            "Preprocessing {} rows x {} columns ({:?})",
            df.height(),
            df.width(),
            mode
        );

        let mut df = df.clone();
        if let Some(id_column) = &self.config.id_column
            && df.column(id_column).is_ok()
        {
            df = df.drop(id_column)?;
            debug!("Dropped identifier column '{}'", id_column);
        }

        let df = self.imputer.impute(&df)?;
        debug!("Imputation complete: {} rows", df.height());

        if mode == Mode::Training && !self.encoder.is_fitted() {
            self.encoder.fit(&df)?;
            info!("Fitted ordinal encoder on training categoricals");
        }
        let df = self.encoder.transform(&df)?;

        let mut df = self.composer.compose(&df)?;

        if mode == Mode::Training {
            for column in &self.config.outlier_columns {
                df = remove_outliers_iqr(&df, column)?;
            }
            info!("Outlier removal complete: {} rows remain", df.height());
        }

        Ok(df)
    }

    /// Preprocess for training, optionally scale, and split features from
    /// the target.
    pub fn prepare_for_training(&mut self, df: &DataFrame) -> Result<TrainingSet> {
        let processed = self.preprocess(df, Mode::Training)?;

        let (processed, scaler) = if self.config.scale_features {
            let scaler = StandardScaler::fit(&processed, &self.config.scale_columns)?;
            let scaled = scaler.transform(&processed)?;
            debug!("Standardized {} columns", self.config.scale_columns.len());
            (scaled, Some(scaler))
        } else {
            (processed, None)
        };

        let target_column = &self.config.target_column;
        let target = processed
            .column(target_column)
            .map_err(|_| PreprocessingError::ColumnNotFound(target_column.clone()))?
            .as_materialized_series()
            .clone();
        let features = processed.drop(target_column)?;

        info!(
            "Prepared training set: {} rows, {} feature columns",
            features.height(),
            features.width()
        );
        Ok(TrainingSet {
            features,
            target,
            scaler,
        })
    }
}

/// Builder for [`Pipeline`].
#[derive(Debug, Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    encoder: Option<OrdinalEncoder>,
}

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Inject a previously fitted encoder.
    ///
    /// Inference workflows load the encoder persisted by training and pass
    /// it here; without one, the pipeline starts with a fresh unfit encoder
    /// that training will fit.
    pub fn encoder(mut self, encoder: OrdinalEncoder) -> Self {
        self.encoder = Some(encoder);
        self
    }

    /// Build the pipeline, validating the configuration.
    pub fn build(self) -> Result<Pipeline> {
        let config = self.config.unwrap_or_default();
        config
            .validate()
            .map_err(|e| PreprocessingError::InvalidConfig(e.to_string()))?;

        let imputer = KNNImputer::new(config.knn_neighbors);
        let composer = FeatureComposer::new(config.reference_year);

        Ok(Pipeline {
            imputer,
            composer,
            encoder: self.encoder.unwrap_or_default(),
            config,
        })
    }
}
