//! Category-aware KNN imputation.
//!
//! Categorical columns are temporarily replaced by integer codes from a
//! stable enumeration of their unique values, the whole table is imputed as
//! one numeric matrix, and the code columns are rounded and mapped back to
//! strings afterwards. This lets missing categoricals borrow information
//! from numeric neighbors and vice versa.

use crate::error::Result;
use crate::utils::{is_numeric_dtype, sorted_categories};
use polars::prelude::*;
use tracing::debug;

#[derive(Debug)]
pub struct KNNImputer {
    n_neighbors: usize,
}

impl KNNImputer {
    /// Create a new KNN imputer with the specified number of neighbors.
    pub fn new(n_neighbors: usize) -> Self {
        Self {
            n_neighbors: n_neighbors.max(1),
        }
    }

    /// Fill every missing cell of the frame.
    ///
    /// Returns a frame with the identical column set and order. Numeric
    /// columns come back as `Float64` (the whole matrix passes through the
    /// imputer), categorical columns as strings. Imputed categorical codes
    /// are rounded and saturated to the nearest valid code before mapping
    /// back. A String column with no observed values has no enumeration and
    /// is passed through unchanged.
    pub fn impute(&self, df: &DataFrame) -> Result<DataFrame> {
        if df.height() == 0 || df.width() == 0 {
            return Ok(df.clone());
        }

        // Stable enumeration per categorical column; None for numeric ones.
        let mut category_maps: Vec<Option<Vec<String>>> = Vec::with_capacity(df.width());
        for col in df.get_columns() {
            if matches!(col.dtype(), DataType::String) {
                category_maps.push(Some(sorted_categories(col.as_materialized_series())?));
            } else {
                category_maps.push(None);
            }
        }

        let matrix = Self::build_matrix(df, &category_maps)?;
        let n_rows = df.height();
        let n_cols = df.width();

        // Impute from the observed matrix only, so fill order cannot
        // influence results.
        let mut filled = matrix.clone();
        let mut cells_filled = 0usize;
        for col_idx in 0..n_cols {
            for row_idx in 0..n_rows {
                if matrix[row_idx][col_idx].is_none() {
                    filled[row_idx][col_idx] =
                        Some(self.impute_cell(&matrix, row_idx, col_idx));
                    cells_filled += 1;
                }
            }
        }
        debug!("KNN imputed {} cells over {} columns", cells_filled, n_cols);

        // Reassemble, preserving column order.
        let mut result_df = df.clone();
        for (col_idx, col) in df.get_columns().iter().enumerate() {
            let col_name = col.name().to_string();
            match &category_maps[col_idx] {
                Some(categories) => {
                    if categories.is_empty() {
                        continue; // nothing to map back onto
                    }
                    let max_code = (categories.len() - 1) as i64;
                    let values: Vec<Option<String>> = (0..n_rows)
                        .map(|row_idx| {
                            filled[row_idx][col_idx].map(|code| {
                                let code = (code.round() as i64).clamp(0, max_code);
                                categories[code as usize].clone()
                            })
                        })
                        .collect();
                    result_df.replace(&col_name, Series::new(col_name.as_str().into(), values))?;
                }
                None => {
                    let values: Vec<Option<f64>> = (0..n_rows)
                        .map(|row_idx| filled[row_idx][col_idx])
                        .collect();
                    result_df.replace(&col_name, Series::new(col_name.as_str().into(), values))?;
                }
            }
        }

        Ok(result_df)
    }

    /// Convert the frame to an f64 matrix, categoricals as codes.
    fn build_matrix(
        df: &DataFrame,
        category_maps: &[Option<Vec<String>>],
    ) -> Result<Vec<Vec<Option<f64>>>> {
        let n_rows = df.height();
        let n_cols = df.width();
        let mut matrix = vec![vec![None; n_cols]; n_rows];

        for (col_idx, col) in df.get_columns().iter().enumerate() {
            let series = col.as_materialized_series();
            match &category_maps[col_idx] {
                Some(categories) => {
                    let str_chunked = series.str()?;
                    for (row_idx, opt_val) in str_chunked.into_iter().enumerate() {
                        matrix[row_idx][col_idx] = opt_val.map(|val| {
                            // Enumeration is sorted, so the code is the
                            // binary-search position.
                            categories
                                .binary_search_by(|c| c.as_str().cmp(val))
                                .map(|pos| pos as f64)
                                .unwrap_or(-1.0)
                        });
                    }
                }
                None if is_numeric_dtype(series.dtype()) => {
                    let float_series = series.cast(&DataType::Float64)?;
                    let f64_chunked = float_series.f64()?;
                    for (row_idx, opt_val) in f64_chunked.into_iter().enumerate() {
                        matrix[row_idx][col_idx] = opt_val;
                    }
                }
                None => {
                    // Non-numeric, non-string columns cast through f64 or
                    // stay missing.
                    let float_series = series.cast(&DataType::Float64)?;
                    let f64_chunked = float_series.f64()?;
                    for (row_idx, opt_val) in f64_chunked.into_iter().enumerate() {
                        matrix[row_idx][col_idx] = opt_val;
                    }
                }
            }
        }

        Ok(matrix)
    }

    /// Impute a single missing cell using the K nearest rows that have the
    /// target column observed, weighted by inverse distance.
    fn impute_cell(
        &self,
        matrix: &[Vec<Option<f64>>],
        target_row: usize,
        target_col: usize,
    ) -> f64 {
        let candidate_rows: Vec<usize> = (0..matrix.len())
            .filter(|&row| row != target_row && matrix[row][target_col].is_some())
            .collect();

        if candidate_rows.is_empty() {
            return Self::column_mean(matrix, target_col);
        }

        let mut distances: Vec<(usize, f64)> = candidate_rows
            .iter()
            .map(|&row| {
                (
                    row,
                    Self::distance(&matrix[target_row], &matrix[row], target_col),
                )
            })
            .collect();
        distances.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        let k = self.n_neighbors.min(distances.len());
        let mut weighted_sum = 0.0;
        let mut weight_sum = 0.0;
        for &(row, distance) in distances.iter().take(k) {
            let Some(value) = matrix[row][target_col] else {
                continue;
            };
            if !distance.is_finite() {
                continue;
            }
            // Inverse distance as weight; an identical row dominates.
            let weight = if distance < 1e-10 { 1e10 } else { 1.0 / distance };
            weighted_sum += value * weight;
            weight_sum += weight;
        }

        if weight_sum > 0.0 {
            weighted_sum / weight_sum
        } else {
            Self::column_mean(matrix, target_col)
        }
    }

    /// Euclidean distance between two rows over the dimensions observed in
    /// both, normalized by dimension count and ignoring the target column.
    fn distance(row1: &[Option<f64>], row2: &[Option<f64>], skip_col: usize) -> f64 {
        let mut sum_squared_diff = 0.0;
        let mut count = 0usize;

        for col_idx in 0..row1.len() {
            if col_idx == skip_col {
                continue;
            }
            if let (Some(val1), Some(val2)) = (row1[col_idx], row2[col_idx]) {
                let diff = val1 - val2;
                sum_squared_diff += diff * diff;
                count += 1;
            }
        }

        if count > 0 {
            (sum_squared_diff / count as f64).sqrt()
        } else {
            f64::INFINITY
        }
    }

    /// Mean of the observed values in a column, 0.0 when none exist.
    fn column_mean(matrix: &[Vec<Option<f64>>], col: usize) -> f64 {
        let mut sum = 0.0;
        let mut count = 0usize;
        for row in matrix {
            if let Some(val) = row[col] {
                sum += val;
                count += 1;
            }
        }
        if count > 0 { sum / count as f64 } else { 0.0 }
    }
}
