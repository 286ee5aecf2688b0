//! Exhaustive hyperparameter search scored by k-fold cross-validation

use super::cross_validation::KFold;
use super::estimator::Estimator;
use super::metrics::{mean, mse, r2, rmse};
use super::random_forest::{ForestParams, MaxFeatures};
use crate::error::{PipelineError, Result};
use ndarray::{Array1, Array2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Candidate values per hyperparameter. An empty list keeps the base value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamGrid {
    pub n_estimators: Vec<usize>,
    pub max_depth: Vec<Option<usize>>,
    pub min_samples_split: Vec<usize>,
    pub min_samples_leaf: Vec<usize>,
    pub max_features: Vec<MaxFeatures>,
}

impl ParamGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_n_estimators(mut self, values: Vec<usize>) -> Self {
        self.n_estimators = values;
        self
    }

    pub fn with_max_depth(mut self, values: Vec<Option<usize>>) -> Self {
        self.max_depth = values;
        self
    }

    pub fn with_min_samples_split(mut self, values: Vec<usize>) -> Self {
        self.min_samples_split = values;
        self
    }

    pub fn with_min_samples_leaf(mut self, values: Vec<usize>) -> Self {
        self.min_samples_leaf = values;
        self
    }

    pub fn with_max_features(mut self, values: Vec<MaxFeatures>) -> Self {
        self.max_features = values;
        self
    }

    /// Number of candidates `expand` yields
    pub fn n_candidates(&self) -> usize {
        [
            self.n_estimators.len(),
            self.max_depth.len(),
            self.min_samples_split.len(),
            self.min_samples_leaf.len(),
            self.max_features.len(),
        ]
        .iter()
        .map(|&n| n.max(1))
        .product()
    }

    /// Cartesian product over `base`, last field varying fastest
    pub fn expand(&self, base: &ForestParams) -> Vec<ForestParams> {
        fn or_base<T: Clone>(values: &[T], base: T) -> Vec<T> {
            if values.is_empty() {
                vec![base]
            } else {
                values.to_vec()
            }
        }

        let n_estimators = or_base(&self.n_estimators, base.n_estimators);
        let max_depth = or_base(&self.max_depth, base.max_depth);
        let min_split = or_base(&self.min_samples_split, base.min_samples_split);
        let min_leaf = or_base(&self.min_samples_leaf, base.min_samples_leaf);
        let max_features: Vec<Option<MaxFeatures>> = if self.max_features.is_empty() {
            vec![base.max_features]
        } else {
            self.max_features.iter().copied().map(Some).collect()
        };

        let mut candidates = Vec::with_capacity(self.n_candidates());
        for &n in &n_estimators {
            for &depth in &max_depth {
                for &split in &min_split {
                    for &leaf in &min_leaf {
                        for &features in &max_features {
                            candidates.push(ForestParams {
                                n_estimators: n,
                                max_depth: depth,
                                min_samples_split: split,
                                min_samples_leaf: leaf,
                                max_features: features,
                                ..base.clone()
                            });
                        }
                    }
                }
            }
        }
        candidates
    }
}

/// Cross-validation score, higher is better
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scoring {
    NegRootMeanSquaredError,
    NegMeanSquaredError,
    R2,
}

impl Scoring {
    pub fn score(&self, y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64> {
        match self {
            Scoring::NegRootMeanSquaredError => Ok(-rmse(y_true, y_pred)?),
            Scoring::NegMeanSquaredError => Ok(-mse(y_true, y_pred)?),
            Scoring::R2 => r2(y_true, y_pred),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Scoring::NegRootMeanSquaredError => "neg_root_mean_squared_error",
            Scoring::NegMeanSquaredError => "neg_mean_squared_error",
            Scoring::R2 => "r2",
        }
    }
}

impl fmt::Display for Scoring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scoring {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "neg_root_mean_squared_error" => Ok(Scoring::NegRootMeanSquaredError),
            "neg_mean_squared_error" => Ok(Scoring::NegMeanSquaredError),
            "r2" => Ok(Scoring::R2),
            other => Err(PipelineError::InvalidParameter {
                name: "scoring".to_string(),
                value: other.to_string(),
                reason: "expected neg_root_mean_squared_error, neg_mean_squared_error or r2".to_string(),
            }),
        }
    }
}

/// Score of one candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateScore {
    pub params: ForestParams,
    pub mean_score: f64,
    pub fold_scores: Vec<f64>,
}

/// Outcome of a grid search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSearchResult {
    pub best_params: ForestParams,
    pub best_score: f64,
    /// Every candidate in grid order
    pub results: Vec<CandidateScore>,
}

/// Grid search over forest hyperparameters
#[derive(Debug, Clone)]
pub struct GridSearch {
    grid: ParamGrid,
    scoring: Scoring,
    cv: usize,
    n_jobs: i32,
}

impl GridSearch {
    pub fn new(grid: ParamGrid, scoring: Scoring) -> Self {
        Self {
            grid,
            scoring,
            cv: 5,
            n_jobs: -1,
        }
    }

    /// Number of unshuffled folds
    pub fn with_cv(mut self, cv: usize) -> Self {
        self.cv = cv;
        self
    }

    /// `-1` uses every core, `1` runs sequentially, `n` a dedicated pool of `n` threads
    pub fn with_n_jobs(mut self, n_jobs: i32) -> Self {
        self.n_jobs = n_jobs;
        self
    }

    /// Evaluate every candidate built from `estimator` on `(x, y)`
    pub fn fit<E: Estimator>(&self, estimator: &E, x: &Array2<f64>, y: &Array1<f64>) -> Result<GridSearchResult> {
        if x.nrows() != y.len() {
            return Err(PipelineError::ShapeError {
                expected: format!("y length = {}", x.nrows()),
                actual: format!("y length = {}", y.len()),
            });
        }

        let candidates = self.grid.expand(&estimator.params());
        let folds = KFold::new(self.cv).split(x.nrows())?;
        info!(
            n_candidates = candidates.len(),
            n_folds = folds.len(),
            scoring = %self.scoring,
            n_jobs = self.n_jobs,
            "Starting grid search"
        );

        let evaluate = |params: &ForestParams| -> Result<CandidateScore> {
            let fold_scores = folds
                .iter()
                .map(|fold| {
                    let x_tr = x.select(Axis(0), &fold.train_indices);
                    let y_tr = y.select(Axis(0), &fold.train_indices);
                    let x_val = x.select(Axis(0), &fold.test_indices);
                    let y_val = y.select(Axis(0), &fold.test_indices);

                    let mut model = estimator.with_params(params);
                    model.fit(&x_tr, &y_tr)?;
                    self.scoring.score(&y_val, &model.predict(&x_val)?)
                })
                .collect::<Result<Vec<f64>>>()?;

            let mean_score = mean(&fold_scores);
            debug!(?params, mean_score, "Candidate evaluated");
            Ok(CandidateScore {
                params: params.clone(),
                mean_score,
                fold_scores,
            })
        };

        let results: Vec<CandidateScore> = match self.n_jobs {
            0 => {
                return Err(PipelineError::InvalidParameter {
                    name: "n_jobs".to_string(),
                    value: "0".to_string(),
                    reason: "use -1 for all cores or a positive thread count".to_string(),
                })
            }
            1 => candidates.iter().map(evaluate).collect::<Result<_>>()?,
            n if n < 0 => candidates.par_iter().map(evaluate).collect::<Result<_>>()?,
            n => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n as usize)
                    .build()
                    .map_err(|e| PipelineError::ComputationError(format!("Thread pool error: {}", e)))?;
                pool.install(|| candidates.par_iter().map(evaluate).collect::<Result<_>>())?
            }
        };

        // ties keep the earliest candidate
        let mut best_idx = 0;
        for (idx, candidate) in results.iter().enumerate() {
            if candidate.mean_score > results[best_idx].mean_score {
                best_idx = idx;
            }
        }
        let best = results
            .get(best_idx)
            .ok_or_else(|| PipelineError::TrainingError("grid produced no candidates".to_string()))?;
        let (best_params, best_score) = (best.params.clone(), best.mean_score);

        Ok(GridSearchResult {
            best_params,
            best_score,
            results,
        })
    }
}
