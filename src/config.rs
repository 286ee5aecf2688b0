//! Run configuration, stored as JSON

use crate::analysis::{DEFAULT_CORRELATION_THRESHOLD, DEFAULT_ENTROPY_THRESHOLD};
use crate::error::{PipelineError, Result};
use crate::training::{ForestParams, ParamGrid, Scoring, SplitOptions};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings shared by the `train` and `validate` commands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Column holding the sale price
    pub target: String,

    pub split: SplitOptions,

    pub forest: ForestParams,

    /// Folds for `Teacher` cross-validation and grid search
    pub cv_folds: usize,

    /// Columns removed before cross-validation
    pub uniformed_features: Vec<String>,

    /// Permutations sampled per row when ranking features by SHAP
    pub shap_samples: usize,

    pub correlation_threshold: f64,

    pub entropy_threshold: f64,

    /// Searched by `validate --grid`
    pub param_grid: Option<ParamGrid>,

    pub scoring: Scoring,

    /// Grid search workers; `-1` uses every core
    pub n_jobs: i32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target: "SalePrice".to_string(),
            split: SplitOptions::default(),
            forest: ForestParams::default(),
            cv_folds: 5,
            uniformed_features: Vec::new(),
            shap_samples: 50,
            correlation_threshold: DEFAULT_CORRELATION_THRESHOLD,
            entropy_threshold: DEFAULT_ENTROPY_THRESHOLD,
            param_grid: None,
            scoring: Scoring::NegRootMeanSquaredError,
            n_jobs: -1,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    pub fn with_split(mut self, split: SplitOptions) -> Self {
        self.split = split;
        self
    }

    pub fn with_forest(mut self, forest: ForestParams) -> Self {
        self.forest = forest;
        self
    }

    pub fn with_cv_folds(mut self, folds: usize) -> Self {
        self.cv_folds = folds;
        self
    }

    pub fn with_uniformed_features(mut self, features: Vec<String>) -> Self {
        self.uniformed_features = features;
        self
    }

    pub fn with_shap_samples(mut self, samples: usize) -> Self {
        self.shap_samples = samples;
        self
    }

    pub fn with_correlation_threshold(mut self, threshold: f64) -> Self {
        self.correlation_threshold = threshold;
        self
    }

    pub fn with_entropy_threshold(mut self, threshold: f64) -> Self {
        self.entropy_threshold = threshold;
        self
    }

    pub fn with_param_grid(mut self, grid: ParamGrid) -> Self {
        self.param_grid = Some(grid);
        self
    }

    pub fn with_scoring(mut self, scoring: Scoring) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn with_n_jobs(mut self, n_jobs: i32) -> Self {
        self.n_jobs = n_jobs;
        self
    }

    /// Uniformed feature names as borrowed strings
    pub fn uniformed_feature_refs(&self) -> Vec<&str> {
        self.uniformed_features.iter().map(|s| s.as_str()).collect()
    }

    /// Read and validate a JSON config; missing fields take their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.target.is_empty() {
            return Err(PipelineError::ConfigError("target column is empty".to_string()));
        }
        if !(self.split.test_size > 0.0 && self.split.test_size < 1.0) {
            return Err(PipelineError::ConfigError(format!(
                "split.test_size must be in (0, 1), got {}",
                self.split.test_size
            )));
        }
        if self.cv_folds < 2 {
            return Err(PipelineError::ConfigError(format!(
                "cv_folds must be at least 2, got {}",
                self.cv_folds
            )));
        }
        if self.forest.n_estimators == 0 {
            return Err(PipelineError::ConfigError("forest.n_estimators must be positive".to_string()));
        }
        if self.n_jobs == 0 {
            return Err(PipelineError::ConfigError("n_jobs must be -1 or positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_is_valid() {
        let config = PipelineConfig::default();
        assert_eq!(config.target, "SalePrice");
        assert_eq!(config.cv_folds, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad_split = PipelineConfig::new().with_split(SplitOptions::default().with_test_size(1.0));
        assert!(bad_split.validate().is_err());

        assert!(PipelineConfig::new().with_cv_folds(1).validate().is_err());

        let no_trees = PipelineConfig::new().with_forest(ForestParams::default().with_n_estimators(0));
        assert!(matches!(no_trees.validate(), Err(PipelineError::ConfigError(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pipeline.json");

        let config = PipelineConfig::new()
            .with_uniformed_features(vec!["Street".to_string()])
            .with_param_grid(ParamGrid::new().with_n_estimators(vec![50, 100]));
        config.save(&path).unwrap();

        assert_eq!(PipelineConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.json");
        std::fs::write(&path, r#"{"cv_folds": 3, "forest": {"n_estimators": 20}}"#).unwrap();

        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config.cv_folds, 3);
        assert_eq!(config.forest.n_estimators, 20);
        assert_eq!(config.forest.min_samples_split, 2);
        assert_eq!(config.target, "SalePrice");
    }
}
