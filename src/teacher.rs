//! Cross-validation and diagnostics harness around an estimator
//!
//! The target is modelled in log space (`ln(1 + price)`) and mapped back with
//! `exp(x) - 1` before any error is reported.

use crate::error::{PipelineError, Result};
use crate::explainability::ShapExplainer;
use crate::training::{
    mean, rmse, rmsle, Estimator, GridSearch, GridSearchResult, KFold, ParamGrid, Scoring,
};
use crate::utils::{column_names, drop_columns, frame_to_matrix, has_column};
use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Folds used by `Teacher::fit`
pub const CV_FOLDS: usize = 5;
/// Seed of the fold shuffle
pub const CV_RANDOM_STATE: u64 = 0;

/// Per-fold errors of the last `Teacher::fit`, in price space
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvReport {
    pub rmse_scores: Vec<f64>,
    pub rmsle_scores: Vec<f64>,
    pub mean_rmse: f64,
    pub mean_rmsle: f64,
}

/// Trains an estimator on log prices and reports validation errors
pub struct Teacher<E: Estimator> {
    estimator: E,
    x_train: DataFrame,
    y_train: Array1<f64>,
    columns: Vec<String>,
    cv_folds: usize,
    shap_samples: usize,
    cv_report: Option<CvReport>,
}

impl<E: Estimator> Teacher<E> {
    /// Drop `uniformed_features` (missing ones ignored) and remember the
    /// remaining column order
    pub fn new(estimator: E, x_train: DataFrame, y_train: Array1<f64>, uniformed_features: &[&str]) -> Result<Self> {
        if x_train.height() != y_train.len() {
            return Err(PipelineError::ShapeError {
                expected: format!("{} targets", x_train.height()),
                actual: format!("{} targets", y_train.len()),
            });
        }
        let x_train = drop_columns(&x_train, uniformed_features)?;
        let columns = column_names(&x_train);

        Ok(Self {
            estimator,
            x_train,
            y_train,
            columns,
            cv_folds: CV_FOLDS,
            shap_samples: 50,
            cv_report: None,
        })
    }

    /// Number of folds for cross-validation and grid search
    pub fn with_cv_folds(mut self, folds: usize) -> Self {
        self.cv_folds = folds;
        self
    }

    /// Permutations sampled per explained row
    pub fn with_shap_samples(mut self, samples: usize) -> Self {
        self.shap_samples = samples;
        self
    }

    pub fn estimator(&self) -> &E {
        &self.estimator
    }

    /// Training features after the uniformed columns were dropped
    pub fn x_train(&self) -> &DataFrame {
        &self.x_train
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn cv_report(&self) -> Option<&CvReport> {
        self.cv_report.as_ref()
    }

    fn log_target(&self) -> Array1<f64> {
        self.y_train.mapv(f64::ln_1p)
    }

    /// Feature matrix of `x` in training column order
    fn select(&self, x: &DataFrame) -> Result<Array2<f64>> {
        if let Some(missing) = self.columns.iter().find(|c| !has_column(x, c)) {
            return Err(PipelineError::FeatureNotFound(missing.clone()));
        }
        frame_to_matrix(x, &self.columns)
    }

    /// Shuffled k-fold validation in price space, then a fit on the whole
    /// training set. Returns the training score on the log target.
    pub fn fit(&mut self) -> Result<f64> {
        let x = self.select(&self.x_train)?;
        let y = self.log_target();

        let folds = KFold::new(self.cv_folds)
            .with_shuffle(true)
            .with_random_state(CV_RANDOM_STATE)
            .split(x.nrows())?;

        let mut rmse_scores = Vec::with_capacity(folds.len());
        let mut rmsle_scores = Vec::with_capacity(folds.len());
        for fold in &folds {
            let x_tr = x.select(Axis(0), &fold.train_indices);
            let y_tr = y.select(Axis(0), &fold.train_indices);
            let x_val = x.select(Axis(0), &fold.test_indices);
            let y_val = y.select(Axis(0), &fold.test_indices);

            let mut model = self.estimator.fresh();
            model.fit(&x_tr, &y_tr)?;

            let y_true = y_val.mapv(f64::exp_m1);
            let y_pred = model.predict(&x_val)?.mapv(f64::exp_m1);
            rmse_scores.push(rmse(&y_true, &y_pred)?);
            rmsle_scores.push(rmsle(&y_true, &y_pred)?);
        }

        let report = CvReport {
            mean_rmse: mean(&rmse_scores),
            mean_rmsle: mean(&rmsle_scores),
            rmse_scores,
            rmsle_scores,
        };
        debug!(rmse = report.mean_rmse, "Valid score RMSE");
        debug!(rmsle = report.mean_rmsle, "Valid score RMSLE");
        self.cv_report = Some(report);

        self.estimator.fit(&x, &y)
    }

    /// Predict prices for `x`; with `y` the errors are logged at debug level
    pub fn predict(&self, x: &DataFrame, y: Option<&Array1<f64>>) -> Result<Array1<f64>> {
        let matrix = self.select(x)?;
        let y_pred = self.estimator.predict(&matrix)?.mapv(f64::exp_m1);

        if let Some(y_true) = y {
            debug!(rmse = rmse(y_true, &y_pred)?, "RMSE");
            debug!(rmsle = rmsle(y_true, &y_pred)?, "RMSLE");
        }
        Ok(y_pred)
    }

    /// Grid search on the log target, scored with `cv_folds` unshuffled folds
    pub fn search_params_by_grid(&self, grid: &ParamGrid, scoring: Scoring, n_jobs: i32) -> Result<GridSearchResult> {
        let x = self.select(&self.x_train)?;
        let result = GridSearch::new(grid.clone(), scoring)
            .with_cv(self.cv_folds)
            .with_n_jobs(n_jobs)
            .fit(&self.estimator, &x, &self.log_target())?;

        info!(best_params = ?result.best_params, best_score = result.best_score, "Best params");
        Ok(result)
    }

    /// Features of `x` ranked by mean |SHAP|. `max_display < 0` keeps all.
    pub fn show_shap(&self, x: &DataFrame, max_display: i32) -> Result<Vec<(String, f64)>> {
        if !self.estimator.is_fitted() {
            return Err(PipelineError::ModelNotFitted);
        }
        let matrix = self.select(x)?;

        let explainer = ShapExplainer::new(|m: &Array2<f64>| self.estimator.predict(m), matrix.clone())
            .with_n_permutations(self.shap_samples);
        let importance = explainer.explain(&matrix)?.mean_abs_importance();

        let limit = usize::try_from(max_display).unwrap_or(importance.len());
        let ranked: Vec<(String, f64)> = importance
            .into_iter()
            .take(limit)
            .map(|(idx, value)| (self.columns[idx].clone(), value))
            .collect();

        let names: Vec<&str> = ranked.iter().map(|(name, _)| name.as_str()).collect();
        debug!(features = ?names, "SHAP feature ranking");
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::{ForestEstimator, ForestParams};

    fn sample() -> (DataFrame, Array1<f64>) {
        let n = 30;
        let area: Vec<f64> = (0..n).map(|i| 500.0 + 50.0 * i as f64).collect();
        let noise: Vec<f64> = (0..n).map(|i| ((i * 7) % 5) as f64).collect();
        let constant: Vec<i64> = vec![1; n];
        let price: Vec<f64> = area.iter().map(|a| 100.0 * a).collect();

        let df = df!(
            "GrLivArea" => area,
            "MoSold" => noise,
            "Street" => constant,
        )
        .unwrap();
        (df, Array1::from_vec(price))
    }

    fn teacher() -> Teacher<ForestEstimator> {
        let (x, y) = sample();
        let estimator = ForestEstimator::regressor(ForestParams::default().with_n_estimators(10).with_random_state(0));
        Teacher::new(estimator, x, y, &["Street", "Alley"]).unwrap()
    }

    #[test]
    fn test_new_drops_uniformed_features() {
        assert_eq!(teacher().columns(), &["GrLivArea".to_string(), "MoSold".to_string()]);
    }

    #[test]
    fn test_fit_reports_cv_errors() {
        let mut teacher = teacher();
        let score = teacher.fit().unwrap();
        assert!(score > 0.8, "training R2 too low: {}", score);

        let report = teacher.cv_report().unwrap();
        assert_eq!(report.rmse_scores.len(), CV_FOLDS);
        assert!(report.mean_rmse.is_finite());
        assert!(report.mean_rmsle < 0.5);
    }

    #[test]
    fn test_predict_returns_prices() {
        let mut teacher = teacher();
        teacher.fit().unwrap();

        let (x, y) = sample();
        let predictions = teacher.predict(&x, Some(&y)).unwrap();
        assert_eq!(predictions.len(), 30);
        // back in price space, not log space
        assert!(predictions.iter().all(|&p| p > 10_000.0));
    }

    #[test]
    fn test_predict_requires_training_columns() {
        let mut teacher = teacher();
        teacher.fit().unwrap();
        let x = df!("GrLivArea" => &[1000.0]).unwrap();
        assert!(matches!(
            teacher.predict(&x, None),
            Err(PipelineError::FeatureNotFound(name)) if name == "MoSold"
        ));
    }

    #[test]
    fn test_show_shap_ranks_informative_feature_first() {
        let mut teacher = teacher().with_shap_samples(5);
        assert!(teacher.show_shap(&sample().0, -1).is_err());

        teacher.fit().unwrap();
        let ranking = teacher.show_shap(&sample().0, 1).unwrap();
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].0, "GrLivArea");

        let all = teacher.show_shap(&sample().0, -1).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_search_params_by_grid() {
        let teacher = teacher().with_cv_folds(3);
        let grid = ParamGrid::new().with_max_depth(vec![Some(1), Some(4)]);
        let result = teacher
            .search_params_by_grid(&grid, Scoring::NegRootMeanSquaredError, 1)
            .unwrap();
        assert_eq!(result.results.len(), 2);
        assert!(result.best_score <= 0.0);
    }
}
