//! Ordinal encoding of categorical columns.
//!
//! The encoder maps each observed string value of a categorical column to an
//! integer code. Codes are assigned once during fit and reused unchanged at
//! inference; values never seen during fit map to a sentinel code instead of
//! failing. A fitted encoder can be persisted to disk as JSON and injected
//! into a pipeline at construction.

use crate::error::{PreprocessingError, Result};
use crate::utils::sorted_categories;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Sentinel code emitted for values not seen during fit.
pub const UNKNOWN_CODE: i64 = -1;

/// Per-column ordinal mapping from category strings to integer codes.
///
/// The code of a value is its position in the column's sorted category list,
/// so codes are stable across runs on the same training data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdinalEncoder {
    /// Column name -> categories in code order.
    mappings: BTreeMap<String, Vec<String>>,
    /// Code emitted for values missing from the fitted mapping.
    unknown_value: i64,
}

impl Default for OrdinalEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl OrdinalEncoder {
    /// Create an unfit encoder with the default unknown sentinel of -1.
    pub fn new() -> Self {
        Self {
            mappings: BTreeMap::new(),
            unknown_value: UNKNOWN_CODE,
        }
    }

    /// Whether the encoder holds any fitted mappings.
    pub fn is_fitted(&self) -> bool {
        !self.mappings.is_empty()
    }

    /// The sentinel code emitted for unseen values.
    pub fn unknown_value(&self) -> i64 {
        self.unknown_value
    }

    /// Categories fitted for a column, in code order.
    pub fn categories(&self, column: &str) -> Option<&[String]> {
        self.mappings.get(column).map(|v| v.as_slice())
    }

    /// Fit the encoder on every String column of the frame.
    ///
    /// Replaces any previous mappings. Null values do not receive a code.
    pub fn fit(&mut self, df: &DataFrame) -> Result<()> {
        self.mappings.clear();
        for col in df.get_columns() {
            if matches!(col.dtype(), DataType::String) {
                let series = col.as_materialized_series();
                let categories = sorted_categories(series)?;
                debug!(
                    "Fitted '{}' with {} categories",
                    col.name(),
                    categories.len()
                );
                self.mappings.insert(col.name().to_string(), categories);
            }
        }
        Ok(())
    }

    /// Replace every String column with its `Int64` codes.
    ///
    /// Unseen values become [`Self::unknown_value`]; nulls stay null.
    /// A String column without a fitted mapping is an error: it means the
    /// encoder was never fitted on data of this shape.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut result_df = df.clone();

        for col in df.get_columns() {
            if !matches!(col.dtype(), DataType::String) {
                continue;
            }
            let col_name = col.name().to_string();
            let categories = self
                .mappings
                .get(&col_name)
                .ok_or_else(|| PreprocessingError::EncoderNotFitted(col_name.clone()))?;

            let series = col.as_materialized_series();
            let str_chunked = series.str()?;
            let codes: Vec<Option<i64>> = str_chunked
                .into_iter()
                .map(|opt_val| {
                    opt_val.map(|val| {
                        categories
                            .iter()
                            .position(|c| c == val)
                            .map(|pos| pos as i64)
                            .unwrap_or(self.unknown_value)
                    })
                })
                .collect();

            let encoded = Series::new(col_name.as_str().into(), codes);
            result_df.replace(&col_name, encoded)?;
        }

        Ok(result_df)
    }

    /// Persist the fitted mappings as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load a previously persisted encoder.
    ///
    /// Returns `Ok(None)` when the file does not exist, which callers treat
    /// as "start with a fresh unfit encoder". A file that exists but cannot
    /// be parsed is reported as [`PreprocessingError::EncoderCorrupt`]
    /// rather than silently downgraded.
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| PreprocessingError::EncoderCorrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }
}
