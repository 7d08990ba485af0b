//! Composite feature engineering for the car dataset.
//!
//! Derives interaction and age features from the encoded raw columns and
//! drops the sources, so downstream stages only ever see the derived set.

use crate::error::{PreprocessingError, Result};
use polars::prelude::*;
use tracing::debug;

/// Raw columns consumed by feature composition.
pub const SOURCE_COLUMNS: [&str; 5] =
    ["engine", "transmission", "int_col", "ext_col", "model_year"];

/// Columns produced by feature composition.
pub const DERIVED_COLUMNS: [&str; 3] = ["engine_transmission", "int_ext_color", "car_age"];

/// Derives composite numeric features and retires their source columns.
#[derive(Debug, Clone)]
pub struct FeatureComposer {
    reference_year: i32,
}

impl FeatureComposer {
    /// Create a composer with the given reference year for `car_age`.
    pub fn new(reference_year: i32) -> Self {
        Self { reference_year }
    }

    /// Produce a new frame with the derived features appended and the five
    /// source columns removed.
    ///
    /// Requires the source columns to be numeric already (categoricals must
    /// be encoded first). Errors with [`PreprocessingError::ColumnNotFound`]
    /// when a source column is absent.
    pub fn compose(&self, df: &DataFrame) -> Result<DataFrame> {
        for required in SOURCE_COLUMNS {
            if df.column(required).is_err() {
                return Err(PreprocessingError::ColumnNotFound(required.to_string()));
            }
        }

        let engine_transmission =
            Self::product_column(df, "engine", "transmission", "engine_transmission")?;
        let int_ext_color = Self::product_column(df, "int_col", "ext_col", "int_ext_color")?;

        let model_year = df
            .column("model_year")?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        let reference_year = self.reference_year as f64;
        let car_age = model_year
            .f64()?
            .apply(|v| v.map(|year| reference_year - year))
            .with_name("car_age".into())
            .into_series();

        let mut result_df = df.clone();
        for source in SOURCE_COLUMNS {
            result_df = result_df.drop(source)?;
        }
        result_df.with_column(engine_transmission)?;
        result_df.with_column(int_ext_color)?;
        result_df.with_column(car_age)?;

        debug!(
            "Composed features: shape {:?} -> {:?}",
            df.shape(),
            result_df.shape()
        );
        Ok(result_df)
    }

    /// Element-wise product of two numeric columns under a new name.
    fn product_column(df: &DataFrame, left: &str, right: &str, name: &str) -> Result<Series> {
        let left_series = df.column(left)?.as_materialized_series().cast(&DataType::Float64)?;
        let right_series = df.column(right)?.as_materialized_series().cast(&DataType::Float64)?;

        let product: Float64Chunked = left_series
            .f64()?
            .into_iter()
            .zip(right_series.f64()?.into_iter())
            .map(|(l, r)| match (l, r) {
                (Some(l), Some(r)) => Some(l * r),
                _ => None,
            })
            .collect();

        Ok(product.with_name(name.into()).into_series())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn encoded_df() -> DataFrame {
        df![
            "brand" => [1.0, 2.0],
            "engine" => [2.0, 3.0],
            "transmission" => [4.0, 5.0],
            "int_col" => [1.0, 2.0],
            "ext_col" => [3.0, 4.0],
            "model_year" => [2020.0, 2010.0],
            "milage" => [10_000.0, 20_000.0],
        ]
        .unwrap()
    }

    #[test]
    fn test_compose_swaps_exact_column_sets() {
        let composer = FeatureComposer::new(2024);
        let result = composer.compose(&encoded_df()).unwrap();

        let names: Vec<String> = result
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "brand",
                "milage",
                "engine_transmission",
                "int_ext_color",
                "car_age"
            ]
        );
        for source in SOURCE_COLUMNS {
            assert!(result.column(source).is_err());
        }
    }

    #[test]
    fn test_compose_values() {
        let composer = FeatureComposer::new(2024);
        let result = composer.compose(&encoded_df()).unwrap();

        let et: Vec<f64> = result
            .column("engine_transmission")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(et, vec![8.0, 15.0]);

        let color: Vec<f64> = result
            .column("int_ext_color")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(color, vec![3.0, 8.0]);

        let age: Vec<f64> = result
            .column("car_age")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(age, vec![4.0, 14.0]);
    }

    #[test]
    fn test_compose_missing_source_is_error() {
        let df = encoded_df().drop("engine").unwrap();
        let composer = FeatureComposer::new(2024);

        let result = composer.compose(&df);
        assert!(matches!(
            result.unwrap_err(),
            PreprocessingError::ColumnNotFound(col) if col == "engine"
        ));
    }

    #[test]
    fn test_compose_does_not_mutate_input() {
        let df = encoded_df();
        let composer = FeatureComposer::new(2024);
        composer.compose(&df).unwrap();

        assert!(df.column("engine").is_ok());
        assert_eq!(df.width(), 7);
    }
}
