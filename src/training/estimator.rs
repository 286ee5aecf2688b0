use super::random_forest::ForestParams;
use crate::error::Result;
use ndarray::{Array1, Array2};

/// Model interface used by the `Trainer`, `Teacher` and grid search
pub trait Estimator: Send + Sync {
    /// Fit on `(x, y)` and return the score on the training data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64>;

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Accuracy for classifiers, R² for regressors
    fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64>;

    /// Hyperparameters the estimator was built with
    fn params(&self) -> ForestParams;

    /// Unfitted estimator of the same kind with other hyperparameters
    fn with_params(&self, params: &ForestParams) -> Self
    where
        Self: Sized;

    /// Unfitted copy with the same hyperparameters
    fn fresh(&self) -> Self
    where
        Self: Sized,
    {
        self.with_params(&self.params())
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        None
    }

    fn is_fitted(&self) -> bool;
}
