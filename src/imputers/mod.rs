//! Imputation of missing values.
//!
//! The pipeline fills every missing cell, categorical or numeric, with a
//! single KNN pass over a temporarily numeric-encoded copy of the table.

mod knn;

pub use knn::KNNImputer;
