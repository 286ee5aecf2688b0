//! Sampling approximation of SHAP values
//!
//! For every explained row, random feature orderings are walked from a
//! background row towards the explained row, crediting each feature with the
//! prediction change it causes. A whole walk is predicted in one batch.

use crate::error::{PipelineError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Background rows kept for the expectation
pub const MAX_BACKGROUND_ROWS: usize = 100;

/// Per-row feature contributions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapValues {
    /// `(n_rows, n_features)` contributions
    pub values: Array2<f64>,
    /// Mean prediction over the background
    pub base_value: f64,
    /// Model output for each explained row
    pub predictions: Array1<f64>,
}

impl ShapValues {
    /// Mean absolute contribution per feature index, descending
    pub fn mean_abs_importance(&self) -> Vec<(usize, f64)> {
        let mut importance: Vec<(usize, f64)> = self
            .values
            .axis_iter(Axis(1))
            .map(|col| col.mapv(f64::abs).mean().unwrap_or(0.0))
            .enumerate()
            .collect();
        importance.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        importance
    }
}

/// Permutation SHAP explainer over a batch prediction function
pub struct ShapExplainer<F>
where
    F: Fn(&Array2<f64>) -> Result<Array1<f64>> + Sync,
{
    predict_fn: F,
    background: Array2<f64>,
    n_permutations: usize,
    seed: u64,
}

impl<F> ShapExplainer<F>
where
    F: Fn(&Array2<f64>) -> Result<Array1<f64>> + Sync,
{
    /// Background larger than `MAX_BACKGROUND_ROWS` is subsampled
    pub fn new(predict_fn: F, background: Array2<f64>) -> Self {
        Self {
            predict_fn,
            background,
            n_permutations: 50,
            seed: 0,
        }
    }

    pub fn with_n_permutations(mut self, n: usize) -> Self {
        self.n_permutations = n.max(1);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn background_rows(&self) -> Array2<f64> {
        let n = self.background.nrows();
        if n <= MAX_BACKGROUND_ROWS {
            return self.background.clone();
        }
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let rows = rand::seq::index::sample(&mut rng, n, MAX_BACKGROUND_ROWS).into_vec();
        self.background.select(Axis(0), &rows)
    }

    /// Contributions for every row of `x`
    pub fn explain(&self, x: &Array2<f64>) -> Result<ShapValues> {
        let background = self.background_rows();
        if background.nrows() == 0 {
            return Err(PipelineError::ValidationError("SHAP background is empty".to_string()));
        }
        if background.ncols() != x.ncols() {
            return Err(PipelineError::ShapeError {
                expected: format!("{} features", background.ncols()),
                actual: format!("{} features", x.ncols()),
            });
        }

        let base_value = (self.predict_fn)(&background)?.mean().unwrap_or(0.0);
        let predictions = (self.predict_fn)(x)?;

        let rows: Vec<Array1<f64>> = (0..x.nrows())
            .into_par_iter()
            .map(|row_idx| self.explain_row(&background, &x.row(row_idx).to_owned(), row_idx))
            .collect::<Result<_>>()?;

        let n_features = x.ncols();
        let mut values = Array2::<f64>::zeros((x.nrows(), n_features));
        for (mut target, row) in values.axis_iter_mut(Axis(0)).zip(rows) {
            target.assign(&row);
        }

        Ok(ShapValues {
            values,
            base_value,
            predictions,
        })
    }

    fn explain_row(&self, background: &Array2<f64>, instance: &Array1<f64>, row_idx: usize) -> Result<Array1<f64>> {
        let n_features = instance.len();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(row_idx as u64 + 1));
        let mut contributions = Array1::<f64>::zeros(n_features);
        let mut order: Vec<usize> = (0..n_features).collect();

        for _ in 0..self.n_permutations {
            order.shuffle(&mut rng);
            let start = background.row(rng.gen_range(0..background.nrows()));

            // row k holds the first k features of `order` switched to the instance
            let mut walk = Array2::<f64>::zeros((n_features + 1, n_features));
            walk.row_mut(0).assign(&start);
            for (step, &feature) in order.iter().enumerate() {
                let (prev, mut next) = walk.multi_slice_mut((ndarray::s![step, ..], ndarray::s![step + 1, ..]));
                next.assign(&prev);
                next[feature] = instance[feature];
            }

            let preds = (self.predict_fn)(&walk)?;
            for (step, &feature) in order.iter().enumerate() {
                contributions[feature] += preds[step + 1] - preds[step];
            }
        }

        Ok(contributions / self.n_permutations as f64)
    }
}
