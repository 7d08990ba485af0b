//! Standardization of numeric feature columns.

use crate::error::{PreprocessingError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Mean/standard-deviation pair for a single column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnStats {
    pub column: String,
    pub mean: f64,
    pub std: f64,
}

/// Standard scaler fit over a fixed column set.
///
/// Fit state is an explicit value: `fit` returns a scaler that `transform`
/// applies to exactly the columns it was fitted on. Population standard
/// deviation is used; a zero-variance column scales by 1 so its values map
/// to 0 rather than dividing by zero (sklearn convention).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    stats: Vec<ColumnStats>,
}

impl StandardScaler {
    /// Fit the scaler on the given columns.
    ///
    /// Errors if a column is absent or holds no valid values.
    pub fn fit(df: &DataFrame, columns: &[String]) -> Result<Self> {
        let mut stats = Vec::with_capacity(columns.len());

        for col_name in columns {
            let col = df
                .column(col_name)
                .map_err(|_| PreprocessingError::ColumnNotFound(col_name.clone()))?;
            let float_series = col.as_materialized_series().cast(&DataType::Float64)?;
            let chunked = float_series.f64()?;

            let mean = chunked
                .mean()
                .ok_or_else(|| PreprocessingError::NoValidValues(col_name.clone()))?;
            let std = chunked.std(0).unwrap_or(0.0);

            debug!("Fitted scaler for '{}': mean={:.4}, std={:.4}", col_name, mean, std);
            stats.push(ColumnStats {
                column: col_name.clone(),
                mean,
                std,
            });
        }

        Ok(Self { stats })
    }

    /// Columns this scaler was fitted on, in fit order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.stats.iter().map(|s| s.column.as_str())
    }

    /// Fitted statistics per column.
    pub fn stats(&self) -> &[ColumnStats] {
        &self.stats
    }

    /// Standardize the fitted columns, leaving all others untouched.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut result_df = df.clone();

        for stat in &self.stats {
            let col = result_df
                .column(&stat.column)
                .map_err(|_| PreprocessingError::ColumnNotFound(stat.column.clone()))?;
            let float_series = col.as_materialized_series().cast(&DataType::Float64)?;

            let divisor = if stat.std > 0.0 { stat.std } else { 1.0 };
            let mean = stat.mean;
            let scaled = float_series
                .f64()?
                .apply(|v| v.map(|val| (val - mean) / divisor));

            result_df.replace(&stat.column, scaled.into_series())?;
        }

        Ok(result_df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_fit_computes_population_stats() {
        let df = df![
            "milage" => [10.0, 20.0, 30.0, 40.0],
        ]
        .unwrap();

        let scaler = StandardScaler::fit(&df, &columns(&["milage"])).unwrap();
        let stat = &scaler.stats()[0];
        assert!((stat.mean - 25.0).abs() < 1e-12);
        // Population std: sqrt(mean of squared deviations) = sqrt(125)
        assert!((stat.std - 125.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_transform_zero_mean_unit_variance() {
        let df = df![
            "milage" => [10.0, 20.0, 30.0, 40.0],
            "price" => [1.0, 2.0, 3.0, 4.0],
        ]
        .unwrap();

        let scaler = StandardScaler::fit(&df, &columns(&["milage"])).unwrap();
        let scaled = scaler.transform(&df).unwrap();

        let values: Vec<f64> = scaled
            .column("milage")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        let mean: f64 = values.iter().sum::<f64>() / values.len() as f64;
        assert!(mean.abs() < 1e-12);

        // Untouched column keeps its values
        let price = scaled.column("price").unwrap();
        assert_eq!(price.as_materialized_series().get(0).unwrap().try_extract::<f64>().unwrap(), 1.0);
    }

    #[test]
    fn test_zero_variance_column_maps_to_zero() {
        let df = df![
            "constant" => [7.0, 7.0, 7.0],
        ]
        .unwrap();

        let scaler = StandardScaler::fit(&df, &columns(&["constant"])).unwrap();
        let scaled = scaler.transform(&df).unwrap();

        let values: Vec<f64> = scaled
            .column("constant")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert!(values.iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn test_fit_missing_column_is_error() {
        let df = df!["a" => [1.0]].unwrap();
        let result = StandardScaler::fit(&df, &columns(&["missing"]));
        assert!(matches!(
            result.unwrap_err(),
            PreprocessingError::ColumnNotFound(col) if col == "missing"
        ));
    }
}
