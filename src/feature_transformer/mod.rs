//! Stateful feature transformers driven stage by stage by the `Trainer`
//!
//! Unlike a `PipelineTemplate`, a transformer holds the frame it works on and
//! the caller decides which stages to run. Fitted state survives `attach`, so
//! one instance processes the training frame and then the test frame.

mod tree_similar;

pub use tree_similar::TreeSimilarFeatureTransformer;

use crate::error::Result;
use crate::pipeline::SplitDataType;
use crate::utils::null_columns;
use polars::prelude::*;
use tracing::info;

/// Stage-by-stage transformer over an owned frame
pub trait FeatureTransformer {
    /// Replace the held frame, keeping fitted state
    fn attach(&mut self, df: DataFrame, split: SplitDataType);

    fn frame(&self) -> &DataFrame;

    fn into_frame(self) -> DataFrame
    where
        Self: Sized;

    fn split_data_type(&self) -> SplitDataType;

    /// Whether stages should report their output
    fn logging(&self) -> bool {
        false
    }

    fn drop_not_needed(&mut self) -> Result<&DataFrame>;

    fn fill_null(&mut self) -> Result<&DataFrame>;

    fn encode(&mut self) -> Result<&DataFrame>;

    fn normalize(&mut self) -> Result<&DataFrame>;

    fn drop_high_correlation(&mut self) -> Result<&DataFrame>;

    /// Run every stage in order
    fn transform_all(&mut self) -> Result<&DataFrame> {
        self.drop_not_needed()?;
        self.fill_null()?;
        self.encode()?;
        self.normalize()?;
        self.drop_high_correlation()
    }

    /// Report a finished stage when logging is on
    fn log_stage(&self, stage: &str) {
        if self.logging() {
            let df = self.frame();
            info!(
                split = %self.split_data_type(),
                stage,
                rows = df.height(),
                cols = df.width(),
                null_columns = null_columns(df).len(),
                "Feature transformer stage finished"
            );
        }
    }
}
