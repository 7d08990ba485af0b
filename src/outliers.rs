//! IQR-based outlier removal.

use crate::error::{PreprocessingError, Result};
use crate::utils::{quantile_linear, sorted_f64_values};
use polars::prelude::*;
use tracing::debug;

/// Multiplier applied to the interquartile range when computing bounds.
const IQR_FACTOR: f64 = 1.5;

/// Return the rows of `df` whose value in `column` lies within
/// `[Q1 - 1.5*IQR, Q3 + 1.5*IQR]`.
///
/// Quartiles are the 25th/75th percentiles of the input frame, computed
/// with linear interpolation. The input is not mutated. Rows with a null in
/// `column` fail the bounds check and are dropped, matching the comparison
/// semantics of the original workflow.
pub fn remove_outliers_iqr(df: &DataFrame, column: &str) -> Result<DataFrame> {
    let col = df
        .column(column)
        .map_err(|_| PreprocessingError::ColumnNotFound(column.to_string()))?;
    let series = col.as_materialized_series();

    let sorted = sorted_f64_values(series)?;
    let (Some(q1), Some(q3)) = (
        quantile_linear(&sorted, 0.25),
        quantile_linear(&sorted, 0.75),
    ) else {
        return Err(PreprocessingError::NoValidValues(column.to_string()));
    };

    let iqr = q3 - q1;
    let lower_bound = q1 - IQR_FACTOR * iqr;
    let upper_bound = q3 + IQR_FACTOR * iqr;

    let float_series = series.cast(&DataType::Float64)?;
    let f64_chunked = float_series.f64()?;
    let mut mask_values = Vec::with_capacity(f64_chunked.len());
    for opt_val in f64_chunked.into_iter() {
        mask_values.push(
            opt_val
                .map(|val| val >= lower_bound && val <= upper_bound)
                .unwrap_or(false),
        );
    }

    let mask = BooleanChunked::from_slice("mask".into(), &mask_values);
    let filtered = df.filter(&mask)?;
    debug!(
        "Outlier filter on '{}': bounds [{:.2}, {:.2}], {} -> {} rows",
        column,
        lower_bound,
        upper_bound,
        df.height(),
        filtered.height()
    );
    Ok(filtered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_extreme_value() {
        // Q1=3.25, Q3=7.75, IQR=4.5, bounds=[-3.5, 14.5]; 100 is out
        let df = df![
            "value" => [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 100.0],
        ]
        .unwrap();

        let filtered = remove_outliers_iqr(&df, "value").unwrap();
        assert_eq!(filtered.height(), 9);

        let max = filtered
            .column("value")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .max()
            .unwrap();
        assert!(max < 100.0);
    }

    #[test]
    fn test_all_values_within_bounds_kept() {
        let df = df![
            "value" => [1.0, 2.0, 3.0, 4.0, 5.0],
        ]
        .unwrap();

        let filtered = remove_outliers_iqr(&df, "value").unwrap();
        assert_eq!(filtered.height(), 5);
    }

    #[test]
    fn test_output_within_input_bounds() {
        let df = df![
            "value" => [-50.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 200.0],
        ]
        .unwrap();

        let sorted = crate::utils::sorted_f64_values(
            df.column("value").unwrap().as_materialized_series(),
        )
        .unwrap();
        let q1 = crate::utils::quantile_linear(&sorted, 0.25).unwrap();
        let q3 = crate::utils::quantile_linear(&sorted, 0.75).unwrap();
        let iqr = q3 - q1;

        let filtered = remove_outliers_iqr(&df, "value").unwrap();
        assert!(filtered.height() <= df.height());
        for opt_val in filtered
            .column("value")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
        {
            let val = opt_val.unwrap();
            assert!(val >= q1 - 1.5 * iqr && val <= q3 + 1.5 * iqr);
        }
    }

    #[test]
    fn test_zero_iqr_keeps_identical_values() {
        let df = df![
            "value" => [5.0, 5.0, 5.0, 5.0],
        ]
        .unwrap();

        let filtered = remove_outliers_iqr(&df, "value").unwrap();
        assert_eq!(filtered.height(), 4);
    }

    #[test]
    fn test_null_rows_dropped() {
        let df = df![
            "value" => [Some(1.0), Some(2.0), None, Some(3.0), Some(4.0)],
        ]
        .unwrap();

        let filtered = remove_outliers_iqr(&df, "value").unwrap();
        assert_eq!(filtered.height(), 4);
        assert_eq!(filtered.column("value").unwrap().null_count(), 0);
    }

    #[test]
    fn test_missing_column_is_error() {
        let df = df!["a" => [1.0]].unwrap();
        let result = remove_outliers_iqr(&df, "milage");
        assert!(matches!(
            result.unwrap_err(),
            PreprocessingError::ColumnNotFound(col) if col == "milage"
        ));
    }

    #[test]
    fn test_all_null_column_is_error() {
        let df = df![
            "value" => [Option::<f64>::None, None],
        ]
        .unwrap();
        let result = remove_outliers_iqr(&df, "value");
        assert!(matches!(
            result.unwrap_err(),
            PreprocessingError::NoValidValues(_)
        ));
    }

    #[test]
    fn test_sequential_application_recomputes_quartiles() {
        // After filtering on "a", the remaining "b" values change the
        // quartiles used for the second pass.
        let df = df![
            "a" => [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 1000.0],
            "b" => [10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 55.0],
        ]
        .unwrap();

        let first = remove_outliers_iqr(&df, "a").unwrap();
        assert_eq!(first.height(), 9);
        let second = remove_outliers_iqr(&first, "b").unwrap();
        assert_eq!(second.height(), 9);
    }
}
