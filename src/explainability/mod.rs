//! Model explainability module
//!
//! Sampling SHAP values and the global feature ranking derived from them.

mod shap;

pub use shap::{ShapExplainer, ShapValues, MAX_BACKGROUND_ROWS};
