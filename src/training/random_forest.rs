//! Random forest over bootstrapped CART trees

use super::decision_tree::DecisionTree;
use crate::error::{PipelineError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Strategy for the number of features drawn per split
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MaxFeatures {
    /// Square root of n_features
    Sqrt,
    /// Log2 of n_features
    Log2,
    /// Fraction of n_features
    Fraction(f64),
    /// Fixed number
    Fixed(usize),
    /// All features
    All,
}

impl MaxFeatures {
    /// Number of features to draw, at least one
    pub fn resolve(&self, n_features: usize) -> usize {
        let n = match *self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().floor() as usize,
            MaxFeatures::Log2 => (n_features as f64).log2().floor() as usize,
            MaxFeatures::Fraction(f) => (n_features as f64 * f).floor() as usize,
            MaxFeatures::Fixed(n) => n,
            MaxFeatures::All => n_features,
        };
        n.clamp(1, n_features.max(1))
    }
}

/// Learning task of a forest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Task {
    Classification,
    Regression,
}

impl Task {
    /// `Sqrt` for classification, `All` for regression
    pub fn default_max_features(&self) -> MaxFeatures {
        match self {
            Task::Classification => MaxFeatures::Sqrt,
            Task::Regression => MaxFeatures::All,
        }
    }
}

/// Hyperparameters shared by forest classifiers and regressors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// `None` picks the task default
    pub max_features: Option<MaxFeatures>,
    pub bootstrap: bool,
    pub random_state: Option<u64>,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            random_state: None,
        }
    }
}

impl ForestParams {
    pub fn with_n_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = Some(max_features);
        self
    }

    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Reject values no forest can be built with
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(PipelineError::InvalidParameter {
                name: "n_estimators".to_string(),
                value: "0".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if self.min_samples_split < 2 {
            return Err(PipelineError::InvalidParameter {
                name: "min_samples_split".to_string(),
                value: self.min_samples_split.to_string(),
                reason: "must be at least 2".to_string(),
            });
        }
        if self.min_samples_leaf == 0 {
            return Err(PipelineError::InvalidParameter {
                name: "min_samples_leaf".to_string(),
                value: "0".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if let Some(MaxFeatures::Fraction(f)) = self.max_features {
            if !(f > 0.0 && f <= 1.0) {
                return Err(PipelineError::InvalidParameter {
                    name: "max_features".to_string(),
                    value: f.to_string(),
                    reason: "fraction must be in (0, 1]".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Random forest model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    params: ForestParams,
    task: Task,
    trees: Vec<DecisionTree>,
    n_features: usize,
    feature_importances: Option<Array1<f64>>,
}

impl RandomForest {
    pub fn new(params: ForestParams, task: Task) -> Self {
        Self {
            params,
            task,
            trees: Vec::new(),
            n_features: 0,
            feature_importances: None,
        }
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn task(&self) -> Task {
        self.task
    }

    /// Fit the forest, building trees in parallel
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        self.params.validate()?;
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(PipelineError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(PipelineError::TrainingError("cannot fit on zero samples".to_string()));
        }

        let max_features = self
            .params
            .max_features
            .unwrap_or_else(|| self.task.default_max_features())
            .resolve(n_features);
        let base_seed = self.params.random_state.unwrap_or_else(rand::random);
        let params = &self.params;
        let task = self.task;

        let trees: Vec<DecisionTree> = (0..params.n_estimators)
            .into_par_iter()
            .map(|tree_idx| -> Result<DecisionTree> {
                let seed = base_seed.wrapping_add(tree_idx as u64);
                let mut rng = ChaCha8Rng::seed_from_u64(seed);

                let mut tree = match task {
                    Task::Classification => DecisionTree::new_classifier(),
                    Task::Regression => DecisionTree::new_regressor(),
                }
                .with_max_depth(params.max_depth)
                .with_min_samples_split(params.min_samples_split)
                .with_min_samples_leaf(params.min_samples_leaf)
                .with_max_features(Some(max_features))
                .with_random_state(rng.gen());

                if params.bootstrap {
                    let sample: Vec<usize> = (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();
                    let x_boot = x.select(Axis(0), &sample);
                    let y_boot = y.select(Axis(0), &sample);
                    tree.fit(&x_boot, &y_boot)?;
                } else {
                    tree.fit(x, y)?;
                }
                Ok(tree)
            })
            .collect::<Result<Vec<_>>>()?;

        self.trees = trees;
        self.n_features = n_features;
        self.compute_feature_importances();
        Ok(self)
    }

    fn compute_feature_importances(&mut self) {
        let mut total = vec![0.0; self.n_features];
        for tree in &self.trees {
            if let Some(imp) = tree.feature_importances() {
                for (acc, &val) in total.iter_mut().zip(imp.iter()) {
                    *acc += val;
                }
            }
        }

        let sum: f64 = total.iter().sum();
        if sum > 0.0 {
            for imp in &mut total {
                *imp /= sum;
            }
        }
        self.feature_importances = Some(Array1::from_vec(total));
    }

    /// Majority vote (classification) or mean (regression) of the trees
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(PipelineError::ModelNotFitted);
        }

        let all_predictions: Vec<Array1<f64>> = self
            .trees
            .par_iter()
            .map(|tree| tree.predict(x))
            .collect::<Result<_>>()?;

        let n_trees = all_predictions.len() as f64;
        let predictions = (0..x.nrows()).map(|i| match self.task {
            Task::Regression => all_predictions.iter().map(|p| p[i]).sum::<f64>() / n_trees,
            Task::Classification => majority(all_predictions.iter().map(|p| p[i])),
        });

        Ok(predictions.collect())
    }

    /// Normalized mean impurity decrease across trees
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }
}

/// Most frequent label, smallest label on ties
fn majority(votes: impl Iterator<Item = f64>) -> f64 {
    let mut counts: Vec<(f64, usize)> = Vec::new();
    for vote in votes {
        match counts.iter_mut().find(|(label, _)| *label == vote) {
            Some((_, count)) => *count += 1,
            None => counts.push((vote, 1)),
        }
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal)))
        .map(|(label, _)| label)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn params(n: usize) -> ForestParams {
        ForestParams::default().with_n_estimators(n).with_random_state(42)
    }

    #[test]
    fn test_classifier() {
        let x = array![[0.0, 0.0], [0.1, 0.1], [0.2, 0.2], [1.0, 1.0], [1.1, 1.1], [1.2, 1.2]];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];

        let mut rf = RandomForest::new(params(10), Task::Classification);
        rf.fit(&x, &y).unwrap();

        let predictions = rf.predict(&x).unwrap();
        let correct = predictions.iter().zip(y.iter()).filter(|(p, a)| p == a).count();
        assert!(correct >= 5, "only {} correct", correct);
    }

    #[test]
    fn test_regressor() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0]];
        let y = array![1.0, 2.0, 3.0, 4.0, 5.0];

        let mut rf = RandomForest::new(params(20), Task::Regression);
        rf.fit(&x, &y).unwrap();

        let predictions = rf.predict(&x).unwrap();
        let mse: f64 = predictions.iter().zip(y.iter()).map(|(p, a)| (p - a).powi(2)).sum::<f64>() / 5.0;
        assert!(mse < 1.0, "MSE too high: {}", mse);
    }

    #[test]
    fn test_seeded_fit_is_reproducible() {
        let x = array![[1.0, 5.0], [2.0, 3.0], [3.0, 8.0], [4.0, 1.0], [5.0, 2.0], [6.0, 7.0]];
        let y = array![1.0, 3.0, 2.0, 5.0, 4.0, 6.0];

        let mut a = RandomForest::new(params(8), Task::Regression);
        let mut b = RandomForest::new(params(8), Task::Regression);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn test_feature_importances() {
        let x = array![[1.0, 0.0], [2.0, 0.0], [3.0, 0.0], [4.0, 0.0]];
        let y = array![1.0, 2.0, 3.0, 4.0];

        let mut rf = RandomForest::new(params(10), Task::Regression);
        rf.fit(&x, &y).unwrap();

        let importances = rf.feature_importances().unwrap();
        assert_eq!(importances.len(), 2);
        assert!(importances[0] >= importances[1]);
    }

    #[test]
    fn test_max_features_resolve() {
        assert_eq!(MaxFeatures::Sqrt.resolve(10), 3);
        assert_eq!(MaxFeatures::Log2.resolve(8), 3);
        assert_eq!(MaxFeatures::Fraction(0.5).resolve(10), 5);
        assert_eq!(MaxFeatures::Fixed(50).resolve(10), 10);
        assert_eq!(MaxFeatures::All.resolve(10), 10);
        assert_eq!(MaxFeatures::Sqrt.resolve(1), 1);
    }

    #[test]
    fn test_invalid_params() {
        let bad = ForestParams::default().with_n_estimators(0);
        assert!(bad.validate().is_err());
        let mut rf = RandomForest::new(bad, Task::Regression);
        assert!(rf.fit(&array![[1.0], [2.0]], &array![1.0, 2.0]).is_err());
    }

    #[test]
    fn test_majority_tie_takes_smallest_label() {
        assert_eq!(majority([1.0, 0.0, 1.0, 0.0].into_iter()), 0.0);
        assert_eq!(majority([2.0, 1.0, 2.0].into_iter()), 2.0);
    }
}
