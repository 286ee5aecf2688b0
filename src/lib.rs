//! House price pipeline - feature engineering and forest training for
//! tabular house price regression
//!
//! # Modules
//!
//! ## Data
//! - [`utils`] - File loading and DataFrame / ndarray conversions
//! - [`analysis`] - Rare categories, entropy, nulls, correlation and VIF
//! - [`house_price`] - Domain transforms for housing columns
//! - [`preprocessing`] - Encoders, scalers, quantile transform and null filling
//!
//! ## Pipelines
//! - [`pipeline`] - Staged pipelines over a DataFrame (`TreeSimilarPipeline`)
//! - [`feature_transformer`] - Stateful stage-by-stage transformers
//!
//! ## Models
//! - [`training`] - Decision trees, random forests, metrics, CV, grid search
//! - [`explainability`] - Sampling SHAP values
//! - [`teacher`] - Log-target cross-validation harness
//! - [`trainer`] - Split, transform, fit and predict
//!
//! ## Services
//! - [`config`] - JSON run configuration
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Data
pub mod utils;
pub mod analysis;
pub mod house_price;
pub mod preprocessing;

// Pipelines
pub mod pipeline;
pub mod feature_transformer;

// Models
pub mod training;
pub mod explainability;
pub mod teacher;
pub mod trainer;

// Services
pub mod config;
pub mod cli;

pub use error::{PipelineError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{PipelineError, Result};

    // Data
    pub use crate::utils::{column_to_array, frame_to_matrix, DataLoader};
    pub use crate::analysis::FeatureManager;
    pub use crate::house_price::{HousePriceFeatureManager, HousePriceProcessor, Rating};

    // Pipelines
    pub use crate::pipeline::{PipelineStage, PipelineTemplate, SplitDataType, TreeSimilarPipeline};
    pub use crate::feature_transformer::{FeatureTransformer, TreeSimilarFeatureTransformer};

    // Models
    pub use crate::training::{
        Estimator, ForestEstimator, ForestParams, GridSearch, KFold, MaxFeatures, ParamGrid,
        RandomForest, Scoring, SplitOptions,
    };
    pub use crate::explainability::{ShapExplainer, ShapValues};
    pub use crate::teacher::{CvReport, Teacher};
    pub use crate::trainer::Trainer;

    // Config
    pub use crate::config::PipelineConfig;
}
