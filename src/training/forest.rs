use super::estimator::Estimator;
use super::metrics::{accuracy, r2};
use super::random_forest::{ForestParams, RandomForest, Task};
use crate::error::Result;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Random forest behind the `Estimator` interface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestEstimator {
    model: RandomForest,
}

impl ForestEstimator {
    /// Majority-vote forest scored by accuracy
    pub fn classifier(params: ForestParams) -> Self {
        Self {
            model: RandomForest::new(params, Task::Classification),
        }
    }

    /// Mean-of-trees forest scored by R²
    pub fn regressor(params: ForestParams) -> Self {
        Self {
            model: RandomForest::new(params, Task::Regression),
        }
    }

    pub fn task(&self) -> Task {
        self.model.task()
    }

    pub fn model(&self) -> &RandomForest {
        &self.model
    }
}

impl Estimator for ForestEstimator {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        self.model.fit(x, y)?;
        let score = self.score(x, y)?;
        info!(
            task = ?self.model.task(),
            n_samples = x.nrows(),
            n_features = x.ncols(),
            score,
            "Forest fitted"
        );
        Ok(score)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let predictions = self.model.predict(x)?;
        debug!(n_predictions = predictions.len(), "Forest predicted");
        Ok(predictions)
    }

    fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        let predictions = self.model.predict(x)?;
        match self.model.task() {
            Task::Classification => accuracy(y, &predictions),
            Task::Regression => r2(y, &predictions),
        }
    }

    fn params(&self) -> ForestParams {
        self.model.params().clone()
    }

    fn with_params(&self, params: &ForestParams) -> Self {
        Self {
            model: RandomForest::new(params.clone(), self.model.task()),
        }
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        self.model.feature_importances().cloned()
    }

    fn is_fitted(&self) -> bool {
        self.model.n_trees() > 0
    }
}
