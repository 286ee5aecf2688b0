//! Quantile transformation to a uniform output distribution
//!
//! Each fitted column keeps `min(n_quantiles, n_non_null)` empirical quantiles
//! at evenly spaced references in `[0, 1]`. Transform maps a value onto the
//! reference axis by linear interpolation, clipping outside the fitted range.

use crate::error::{PipelineError, Result};
use crate::utils::f64_values;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default number of quantiles
pub const DEFAULT_N_QUANTILES: usize = 1000;

/// Fitted reference points for one column
#[derive(Debug, Clone, Serialize, Deserialize)]
struct QuantileParams {
    quantiles: Vec<f64>,
    references: Vec<f64>,
}

impl QuantileParams {
    fn fit(values: &mut [f64], n_quantiles: usize) -> Self {
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let m = n_quantiles.min(values.len());
        let references: Vec<f64> = if m < 2 {
            vec![0.0; m]
        } else {
            (0..m).map(|j| j as f64 / (m - 1) as f64).collect()
        };
        let quantiles = references
            .iter()
            .map(|&r| percentile_linear(values, r))
            .collect();
        Self { quantiles, references }
    }

    /// Average of the first and last matching reference on ties, linear
    /// interpolation between neighbours otherwise. NaN maps to NaN.
    fn map(&self, x: f64) -> f64 {
        let q = &self.quantiles;
        let r = &self.references;
        if x.is_nan() {
            return f64::NAN;
        }
        if q.len() < 2 {
            return 0.0;
        }
        let last = q.len() - 1;
        if x < q[0] {
            return r[0];
        }
        if x > q[last] {
            return r[last];
        }

        // first index with q >= x
        let lo = q.partition_point(|&v| v < x);
        // one past the last index with q <= x
        let hi = q.partition_point(|&v| v <= x);

        if lo < hi {
            return 0.5 * (r[lo] + r[hi - 1]);
        }
        let (q0, q1) = (q[lo - 1], q[lo]);
        let (r0, r1) = (r[lo - 1], r[lo]);
        r0 + (x - q0) * (r1 - r0) / (q1 - q0)
    }
}

/// Percentile with linear interpolation over sorted values, `p` in `[0, 1]`
fn percentile_linear(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = p * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Column-wise quantile transformer. Output columns are `Float64` in `[0, 1]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuantileTransformer {
    n_quantiles: usize,
    params: HashMap<String, QuantileParams>,
    is_fitted: bool,
}

impl Default for QuantileTransformer {
    fn default() -> Self {
        Self::new(DEFAULT_N_QUANTILES)
    }
}

impl QuantileTransformer {
    /// Create a transformer keeping at most `n_quantiles` reference points per column
    pub fn new(n_quantiles: usize) -> Self {
        Self {
            n_quantiles: n_quantiles.max(2),
            params: HashMap::new(),
            is_fitted: false,
        }
    }

    /// Fit reference quantiles for the named columns, ignoring nulls
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        self.params.clear();
        for col_name in columns {
            let mut values: Vec<f64> = f64_values(df, col_name)?
                .into_iter()
                .flatten()
                .filter(|v| v.is_finite())
                .collect();
            let params = QuantileParams::fit(&mut values, self.n_quantiles);
            self.params.insert(col_name.to_string(), params);
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Transform every fitted column present in `df`; nulls stay null
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(PipelineError::ModelNotFitted);
        }

        let mut result = df.clone();
        for (col_name, params) in &self.params {
            if result.get_column_index(col_name).is_none() {
                continue;
            }
            let mapped: Vec<Option<f64>> = f64_values(df, col_name)?
                .into_iter()
                .map(|v| v.map(|x| params.map(x)))
                .collect();
            result.with_column(Series::new(col_name.as_str().into(), mapped))?;
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// Whether `fit` has been called
    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Number of reference quantiles kept for a column
    pub fn n_quantiles_fitted(&self, column: &str) -> Option<usize> {
        self.params.get(column).map(|p| p.quantiles.len())
    }
}
