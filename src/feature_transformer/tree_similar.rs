use super::FeatureTransformer;
use crate::error::{PipelineError, Result};
use crate::pipeline::SplitDataType;
use crate::preprocessing::{fill_constant, Encoder, EncoderType};
use crate::utils::{align_dtypes, categorical_columns, column_dtypes, drop_columns};
use polars::prelude::*;

/// Minimal transformer for tree estimators: drop the identifier, fill every
/// null with `-1` and give string columns integer codes
#[derive(Debug, Clone)]
pub struct TreeSimilarFeatureTransformer {
    df: DataFrame,
    split: SplitDataType,
    logging: bool,
    encoder: Option<Encoder>,
    /// Column dtypes of the last training frame
    train_dtypes: Vec<(String, DataType)>,
}

impl TreeSimilarFeatureTransformer {
    pub fn new(df: DataFrame, split: SplitDataType) -> Self {
        Self {
            df,
            split,
            logging: false,
            encoder: None,
            train_dtypes: Vec::new(),
        }
    }

    pub fn with_logging(mut self, logging: bool) -> Self {
        self.logging = logging;
        self
    }
}

impl FeatureTransformer for TreeSimilarFeatureTransformer {
    fn attach(&mut self, df: DataFrame, split: SplitDataType) {
        self.df = df;
        self.split = split;
    }

    fn frame(&self) -> &DataFrame {
        &self.df
    }

    fn into_frame(self) -> DataFrame {
        self.df
    }

    fn split_data_type(&self) -> SplitDataType {
        self.split
    }

    fn logging(&self) -> bool {
        self.logging
    }

    fn drop_not_needed(&mut self) -> Result<&DataFrame> {
        if self.split.is_train() {
            self.train_dtypes = column_dtypes(&self.df);
        } else {
            self.df = align_dtypes(&self.df, &self.train_dtypes)?;
        }
        self.df = drop_columns(&self.df, &["Id"])?;
        self.log_stage("drop_not_needed");
        Ok(&self.df)
    }

    fn fill_null(&mut self) -> Result<&DataFrame> {
        self.df = fill_constant(&self.df, -1.0, "-1")?;
        self.log_stage("fill_null");
        Ok(&self.df)
    }

    fn encode(&mut self) -> Result<&DataFrame> {
        if self.split.is_train() {
            let columns = categorical_columns(&self.df);
            let cols: Vec<&str> = columns.iter().map(|s| s.as_str()).collect();
            let mut encoder = Encoder::new(EncoderType::Label);
            self.df = encoder.fit_transform(&self.df, &cols)?;
            self.encoder = Some(encoder);
        } else {
            let encoder = self.encoder.as_ref().ok_or(PipelineError::ModelNotFitted)?;
            self.df = encoder.transform(&self.df)?;
        }
        self.log_stage("encode");
        Ok(&self.df)
    }

    fn normalize(&mut self) -> Result<&DataFrame> {
        self.log_stage("normalize");
        Ok(&self.df)
    }

    fn drop_high_correlation(&mut self) -> Result<&DataFrame> {
        self.log_stage("drop_high_correlation");
        Ok(&self.df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{column_names, f64_values, null_columns, numeric_columns};

    #[test]
    fn test_transform_all() {
        let df = df!(
            "Id" => &[1i64, 2, 3],
            "LotFrontage" => &[Some(65.0), None, Some(80.0)],
            "Alley" => &[None, Some("Grvl"), Some("Pave")],
        )
        .unwrap();

        let mut transformer = TreeSimilarFeatureTransformer::new(df, SplitDataType::Train).with_logging(true);
        transformer.transform_all().unwrap();
        let out = transformer.frame();

        assert_eq!(column_names(out), vec!["LotFrontage", "Alley"]);
        assert!(null_columns(out).is_empty());
        assert_eq!(numeric_columns(out).len(), 2);
        assert_eq!(f64_values(out, "LotFrontage").unwrap()[1], Some(-1.0));
        // "-1" fill is the first category seen
        assert_eq!(f64_values(out, "Alley").unwrap(), vec![Some(0.0), Some(1.0), Some(2.0)]);
    }

    #[test]
    fn test_attach_keeps_encoder() {
        let train = df!("Street" => &["Pave", "Grvl"]).unwrap();
        let mut transformer = TreeSimilarFeatureTransformer::new(train, SplitDataType::Train);
        transformer.transform_all().unwrap();

        let test = df!("Street" => &["Grvl", "Dirt"]).unwrap();
        transformer.attach(test, SplitDataType::Test);
        transformer.transform_all().unwrap();
        assert_eq!(
            f64_values(&transformer.into_frame(), "Street").unwrap(),
            vec![Some(1.0), Some(-1.0)]
        );
    }

    #[test]
    fn test_all_na_test_column_takes_train_dtype() {
        let train = df!("LotFrontage" => &[Some(65i64), None, Some(80)], "Street" => &["Pave", "Grvl", "Pave"]).unwrap();
        let mut transformer = TreeSimilarFeatureTransformer::new(train, SplitDataType::Train);
        transformer.transform_all().unwrap();

        // a column that is entirely NA in its file is read as String
        let missing: [Option<&str>; 2] = [None, None];
        let test = df!("LotFrontage" => &missing, "Street" => &["Grvl", "Pave"]).unwrap();
        transformer.attach(test, SplitDataType::Test);
        let out = transformer.transform_all().unwrap();

        assert_eq!(numeric_columns(out).len(), 2);
        assert_eq!(f64_values(out, "LotFrontage").unwrap(), vec![Some(-1.0), Some(-1.0)]);
    }

    #[test]
    fn test_encode_before_fit_fails() {
        let df = df!("Street" => &["Pave"]).unwrap();
        let mut transformer = TreeSimilarFeatureTransformer::new(df, SplitDataType::Test);
        assert!(matches!(transformer.encode(), Err(PipelineError::ModelNotFitted)));
    }
}
