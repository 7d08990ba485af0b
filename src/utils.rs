//! Shared utilities for the preprocessing pipeline.
//!
//! Common helpers used across multiple modules: dtype checks, categorical
//! enumeration, and percentile computation.

use polars::prelude::*;

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a Series holds categorical (string) data.
#[inline]
pub fn is_categorical_series(series: &Series) -> bool {
    matches!(series.dtype(), DataType::String)
}

/// Names of all String columns in a DataFrame, in frame order.
pub fn categorical_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| matches!(col.dtype(), DataType::String))
        .map(|col| col.name().to_string())
        .collect()
}

/// Stable enumeration of the unique non-null values of a String Series.
///
/// The position of a value in the returned vector is its integer code.
/// Values are sorted lexicographically, so the enumeration is independent of
/// row order and reproducible across calls on the same data.
pub fn sorted_categories(series: &Series) -> PolarsResult<Vec<String>> {
    let str_chunked = series.str()?;
    let mut categories: Vec<String> = str_chunked
        .into_iter()
        .flatten()
        .map(|s| s.to_string())
        .collect();
    categories.sort_unstable();
    categories.dedup();
    Ok(categories)
}

/// Percentile of a sorted slice using linear interpolation between ranks
/// (pandas `quantile` semantics).
///
/// `values` must be sorted ascending and free of NaN. Returns `None` for an
/// empty slice or a quantile outside `[0, 1]`.
pub fn quantile_linear(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let pos = q * (values.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        return Some(values[lower]);
    }
    let frac = pos - lower as f64;
    Some(values[lower] + frac * (values[upper] - values[lower]))
}

/// Collect the non-null values of a column as a sorted `Vec<f64>`.
pub fn sorted_f64_values(series: &Series) -> PolarsResult<Vec<f64>> {
    let float_series = series.cast(&DataType::Float64)?;
    let mut values: Vec<f64> = float_series.f64()?.into_iter().flatten().collect();
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    Ok(values)
}
