//! Dataset analysis
//!
//! Stateless utilities over a DataFrame used to decide which columns to
//! bucket, drop or decorrelate:
//! - least frequent category per categorical column
//! - entropy-based high-cardinality detection
//! - null column listing
//! - summed high Pearson correlations
//! - variance inflation factors

pub mod correlation;

pub use correlation::{correlation_matrix, least_squares, pearson_pairwise, variance_inflation_factor};

use crate::error::Result;
use crate::preprocessing::{Scaler, ScalerType};
use crate::utils::{
    categorical_columns, column_names, f64_values, frame_to_matrix, null_columns,
    numeric_columns, string_values, take_rows,
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default cut-off for `FeatureManager::high_entropy`
pub const DEFAULT_ENTROPY_THRESHOLD: f64 = 0.95;

/// Default cut-off for `FeatureManager::high_correlation_features`
pub const DEFAULT_CORRELATION_THRESHOLD: f64 = 0.75;

/// Least frequent value of a categorical column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmallestCategory {
    pub column: String,
    pub value: String,
    /// Share of non-null rows holding `value`, in percent
    pub frequency_pct: f64,
}

/// Stateless analysis utilities
pub struct FeatureManager;

impl FeatureManager {
    /// Least frequent value of every categorical column, ascending by frequency.
    /// Ties resolve to the value seen first; all-null columns are skipped.
    pub fn smallest_category(df: &DataFrame) -> Result<Vec<SmallestCategory>> {
        let mut result = Vec::new();

        for column in categorical_columns(df) {
            let values = string_values(df, &column)?;
            let (order, counts) = value_counts(values.into_iter());
            let total: usize = counts.values().sum();
            if total == 0 {
                continue;
            }

            let mut best: Option<(&String, usize)> = None;
            for value in &order {
                let count = counts[value];
                if best.map_or(true, |(_, c)| count < c) {
                    best = Some((value, count));
                }
            }

            if let Some((value, count)) = best {
                result.push(SmallestCategory {
                    column,
                    value: value.clone(),
                    frequency_pct: count as f64 / total as f64 * 100.0,
                });
            }
        }

        result.sort_by(|a, b| {
            a.frequency_pct
                .partial_cmp(&b.frequency_pct)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(result)
    }

    /// Columns whose base-2 entropy reaches `log2(n_rows) * threshold`
    pub fn high_entropy(df: &DataFrame, threshold: f64) -> Result<Vec<String>> {
        let n_rows = df.height();
        if n_rows == 0 {
            return Ok(Vec::new());
        }
        let cutoff = (n_rows as f64).log2() * threshold;

        let mut result = Vec::new();
        for column in column_names(df) {
            let values = string_values(df, &column)?;
            let (_, counts) = value_counts(values.into_iter());
            if shannon_entropy(&counts) >= cutoff {
                result.push(column);
            }
        }
        Ok(result)
    }

    /// Columns holding at least one null
    pub fn features_with_none(df: &DataFrame) -> Vec<String> {
        null_columns(df)
    }

    /// Null columns joined with ", ", or "None" when there are none
    pub fn describe_features_with_none(df: &DataFrame) -> String {
        let columns = null_columns(df);
        if columns.is_empty() {
            "None".to_string()
        } else {
            columns.join(", ")
        }
    }

    /// For every numeric column, the sum of its absolute correlations that are
    /// at least `threshold` and not exactly 1. Columns without such a
    /// correlation are left out; result sorted descending.
    pub fn high_correlation_features(df: &DataFrame, threshold: f64) -> Result<Vec<(String, f64)>> {
        let (names, corr) = correlation_matrix(df)?;

        let mut result: Vec<(String, f64)> = names
            .iter()
            .enumerate()
            .filter_map(|(j, name)| {
                let kept: Vec<f64> = corr
                    .column(j)
                    .iter()
                    .map(|r| r.abs())
                    .filter(|r| r.is_finite() && *r >= threshold && *r != 1.0)
                    .collect();
                if kept.is_empty() {
                    None
                } else {
                    Some((name.clone(), kept.iter().sum()))
                }
            })
            .collect();

        result.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        Ok(result)
    }

    /// Variance inflation factor of every numeric column after standard
    /// scaling, sorted descending. Rows holding a null in any numeric column
    /// are excluded.
    pub fn vif(df: &DataFrame) -> Result<Vec<(String, f64)>> {
        let names = numeric_columns(df);
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let columns: Vec<Vec<Option<f64>>> = names
            .iter()
            .map(|name| f64_values(df, name))
            .collect::<Result<_>>()?;
        let complete_rows: Vec<usize> = (0..df.height())
            .filter(|&row| columns.iter().all(|col| col[row].is_some()))
            .collect();
        let numeric = take_rows(&df.select(names.iter().map(|s| s.as_str()))?, &complete_rows)?;

        let cols: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
        let mut scaler = Scaler::new(ScalerType::Standard);
        let scaled = scaler.fit_transform(&numeric, &cols)?;
        let x = frame_to_matrix(&scaled, &names)?;

        let mut result: Vec<(String, f64)> = names
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.clone(), variance_inflation_factor(&x, idx)))
            .collect();

        result.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        Ok(result)
    }
}

/// Counts of non-null values, plus the values in first-seen order
fn value_counts<I>(values: I) -> (Vec<String>, HashMap<String, usize>)
where
    I: Iterator<Item = Option<String>>,
{
    let mut order = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in values.flatten() {
        let entry = counts.entry(value.clone()).or_insert(0);
        if *entry == 0 {
            order.push(value);
        }
        *entry += 1;
    }
    (order, counts)
}

fn shannon_entropy(counts: &HashMap<String, usize>) -> f64 {
    let total: usize = counts.values().sum();
    if total == 0 {
        return 0.0;
    }
    counts
        .values()
        .map(|&c| {
            let p = c as f64 / total as f64;
            -p * p.log2()
        })
        .sum()
}
