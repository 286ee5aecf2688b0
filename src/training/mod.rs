//! Model training module
//!
//! Provides the estimator layer of the pipeline:
//! - CART decision trees and random forests
//! - `Estimator` trait with the forest wrapper
//! - Regression / classification metrics
//! - K-fold cross-validation and train/test splitting
//! - Exhaustive grid search over forest hyperparameters

pub mod cross_validation;
pub mod decision_tree;
mod estimator;
mod forest;
pub mod grid_search;
pub mod metrics;
pub mod random_forest;
mod split;

pub use cross_validation::{CVSplit, KFold};
pub use decision_tree::{Criterion, DecisionTree, TreeNode};
pub use estimator::Estimator;
pub use forest::ForestEstimator;
pub use grid_search::{CandidateScore, GridSearch, GridSearchResult, ParamGrid, Scoring};
pub use metrics::{accuracy, mean, mse, r2, rmse, rmsle};
pub use random_forest::{ForestParams, MaxFeatures, RandomForest, Task};
pub use split::{train_test_split, SplitOptions};
