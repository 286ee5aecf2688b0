//! Staged DataFrame pipelines
//!
//! A pipeline runs a fixed sequence of stages over a copy of its input.
//! Implementors supply the stages; `PipelineTemplate::build` owns the order
//! and the debug tracing around each stage.

mod tree_similar;

pub use tree_similar::{
    TreeSimilarPipeline, EXTERIOR_KEPT, HIGH_CORRELATION_DROPS, INDICATOR_COLUMNS, NOT_NEEDED_COLUMNS,
    RATING_COLUMNS, VIF_DROPS,
};

use crate::analysis::FeatureManager;
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, Level};

/// Which part of the data a pipeline or transformer is processing.
/// Stateful stages fit on `Train` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SplitDataType {
    Train,
    Validation,
    Test,
}

impl SplitDataType {
    pub fn name(&self) -> &'static str {
        match self {
            SplitDataType::Train => "TRAIN",
            SplitDataType::Validation => "VALIDATION",
            SplitDataType::Test => "TEST",
        }
    }

    /// Whether stateful stages may fit on this split
    pub fn is_train(&self) -> bool {
        matches!(self, SplitDataType::Train)
    }
}

impl fmt::Display for SplitDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for SplitDataType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "train" => Ok(SplitDataType::Train),
            "validation" | "valid" => Ok(SplitDataType::Validation),
            "test" => Ok(SplitDataType::Test),
            other => Err(format!("unknown split '{}'", other)),
        }
    }
}

/// Pipeline stages in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineStage {
    DropNotNeeded,
    FillNull,
    PreprocessFeatures,
    Encode,
    Normalize,
    DropHighCorrelation,
}

impl PipelineStage {
    /// All stages, in the order `build` runs them
    pub const ALL: [PipelineStage; 6] = [
        PipelineStage::DropNotNeeded,
        PipelineStage::FillNull,
        PipelineStage::PreprocessFeatures,
        PipelineStage::Encode,
        PipelineStage::Normalize,
        PipelineStage::DropHighCorrelation,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PipelineStage::DropNotNeeded => "drop_not_needed",
            PipelineStage::FillNull => "fill_null",
            PipelineStage::PreprocessFeatures => "preprocess_features",
            PipelineStage::Encode => "encode",
            PipelineStage::Normalize => "normalize",
            PipelineStage::DropHighCorrelation => "drop_high_correlation",
        }
    }

    /// Feature preprocessing is noisy and stays out of the debug trace
    fn is_traced(&self) -> bool {
        !matches!(self, PipelineStage::PreprocessFeatures)
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Template for staged pipelines
pub trait PipelineTemplate {
    fn split_data_type(&self) -> SplitDataType;

    fn drop_not_needed(&mut self, df: DataFrame) -> Result<DataFrame>;

    fn fill_null(&mut self, df: DataFrame) -> Result<DataFrame>;

    fn preprocess_features(&mut self, df: DataFrame) -> Result<DataFrame>;

    fn encode(&mut self, df: DataFrame) -> Result<DataFrame>;

    fn normalize(&mut self, df: DataFrame) -> Result<DataFrame>;

    fn drop_high_correlation(&mut self, df: DataFrame) -> Result<DataFrame>;

    /// Run one stage, tracing its output shape and null columns
    fn run_stage(&mut self, stage: PipelineStage, df: DataFrame) -> Result<DataFrame> {
        let result = match stage {
            PipelineStage::DropNotNeeded => self.drop_not_needed(df),
            PipelineStage::FillNull => self.fill_null(df),
            PipelineStage::PreprocessFeatures => self.preprocess_features(df),
            PipelineStage::Encode => self.encode(df),
            PipelineStage::Normalize => self.normalize(df),
            PipelineStage::DropHighCorrelation => self.drop_high_correlation(df),
        }?;

        if stage.is_traced() && tracing::enabled!(Level::DEBUG) {
            debug!(
                split = %self.split_data_type(),
                stage = %stage,
                rows = result.height(),
                cols = result.width(),
                columns_with_none = %FeatureManager::describe_features_with_none(&result),
                "Pipeline stage finished"
            );
        }

        Ok(result)
    }

    /// Run every stage over a copy of `df`
    fn build(&mut self, df: &DataFrame) -> Result<DataFrame> {
        let mut frame = df.clone();
        for stage in PipelineStage::ALL {
            frame = self.run_stage(stage, frame)?;
        }
        Ok(frame)
    }
}
