//! Pipeline tuned for tree ensembles

use super::{PipelineTemplate, SplitDataType};
use crate::error::{PipelineError, Result};
use crate::house_price::HousePriceProcessor;
use crate::preprocessing::{fill_constant, Encoder, EncoderType, QuantileTransformer, DEFAULT_N_QUANTILES};
use crate::utils::{categorical_columns, drop_columns, has_column, numeric_columns, string_values};
use polars::prelude::*;
use tracing::debug;

/// Identifier and near-constant columns
pub const NOT_NEEDED_COLUMNS: [&str; 5] = ["Id", "Utilities", "RoofMatl", "Condition2", "Heating"];

/// Exterior coverings frequent enough to keep as their own category
pub const EXTERIOR_KEPT: [&str; 5] = ["VinylSd", "HdBoard", "MetalSd", "Wd Sdng", "Plywood"];

/// Quality columns rewritten to rating labels
pub const RATING_COLUMNS: [&str; 3] = ["HeatingQC", "ExterCond", "BsmtCond"];

/// (source, indicator, value flagged as 1)
const INDICATORS: [(&str, &str, &str); 4] = [
    ("Functional", "Is_typical_functional", "Typ"),
    ("Electrical", "Is_standard_electrical", "SBrkr"),
    ("RoofStyle", "Is_gable_roof_style", "Gable"),
    ("Condition1", "Is_norm_condition1", "Norm"),
];

/// Indicator columns added by feature preprocessing
pub const INDICATOR_COLUMNS: [&str; 4] = [
    "Is_typical_functional",
    "Is_standard_electrical",
    "Is_gable_roof_style",
    "Is_norm_condition1",
];

/// Dropped for pairwise Pearson correlation with a kept column
pub const HIGH_CORRELATION_DROPS: [&str; 5] = ["PoolArea", "GarageArea", "TotRmsAbvGrd", "1stFlrSF", "BsmtFinSF2"];

/// Dropped for high variance inflation
pub const VIF_DROPS: [&str; 2] = ["TotalBsmtSF", "2ndFlrSF"];

const WARRANTY_DEED_TYPES: [&str; 3] = ["WD", "CWD", "VWD"];

/// House price pipeline for tree-based estimators.
///
/// Fitted state (category codes, quantiles) is learned on a `Train` build and
/// reused when the same instance is switched to another split.
#[derive(Debug, Clone)]
pub struct TreeSimilarPipeline {
    split: SplitDataType,
    target: Option<String>,
    n_quantiles: usize,
    encoder: Option<Encoder>,
    quantile: Option<QuantileTransformer>,
}

impl TreeSimilarPipeline {
    pub fn new(split: SplitDataType) -> Self {
        Self {
            split,
            target: None,
            n_quantiles: DEFAULT_N_QUANTILES,
            encoder: None,
            quantile: None,
        }
    }

    /// Column left out of normalization when present
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Switch split, keeping fitted state
    pub fn with_split(mut self, split: SplitDataType) -> Self {
        self.split = split;
        self
    }

    pub fn with_n_quantiles(mut self, n_quantiles: usize) -> Self {
        self.n_quantiles = n_quantiles;
        self
    }

    pub fn set_split(&mut self, split: SplitDataType) {
        self.split = split;
    }

    /// Whether the stateful stages have been fitted
    pub fn is_fitted(&self) -> bool {
        self.encoder.is_some() && self.quantile.is_some()
    }

    fn normalize_columns(&self, df: &DataFrame) -> Vec<String> {
        numeric_columns(df)
            .into_iter()
            .filter(|name| !INDICATOR_COLUMNS.contains(&name.as_str()))
            .filter(|name| self.target.as_deref() != Some(name.as_str()))
            .collect()
    }
}

impl PipelineTemplate for TreeSimilarPipeline {
    fn split_data_type(&self) -> SplitDataType {
        self.split
    }

    fn drop_not_needed(&mut self, df: DataFrame) -> Result<DataFrame> {
        drop_columns(&df, &NOT_NEEDED_COLUMNS)
    }

    fn fill_null(&mut self, df: DataFrame) -> Result<DataFrame> {
        fill_constant(&df, -1.0, "None")
    }

    fn preprocess_features(&mut self, mut df: DataFrame) -> Result<DataFrame> {
        for column in ["Exterior1st", "Exterior2nd"] {
            if has_column(&df, column) {
                let collapsed = HousePriceProcessor::transform_feature_with_others(&df, column, &EXTERIOR_KEPT)?;
                df.with_column(collapsed)?;
            }
        }

        for column in RATING_COLUMNS {
            if has_column(&df, column) {
                let rated = HousePriceProcessor::transform_feature_to_rating(&df, column)?;
                df.with_column(rated)?;
            }
        }

        if has_column(&df, "SaleType") {
            let sale_type: Vec<&str> = string_values(&df, "SaleType")?
                .iter()
                .map(|v| match v.as_deref() {
                    Some("New") => "New",
                    Some(s) if WARRANTY_DEED_TYPES.contains(&s) => "Warranty_deed",
                    _ => "Others",
                })
                .collect();
            df.with_column(Series::new("SaleType".into(), sale_type))?;
        }

        for (source, indicator, value) in INDICATORS {
            if has_column(&df, source) {
                HousePriceProcessor::transform_feature_to_are(&mut df, source, indicator, &[value])?;
            } else {
                debug!(column = source, "Indicator source missing, skipped");
            }
        }

        Ok(df)
    }

    fn encode(&mut self, df: DataFrame) -> Result<DataFrame> {
        if self.split.is_train() {
            let columns = categorical_columns(&df);
            let cols: Vec<&str> = columns.iter().map(|s| s.as_str()).collect();
            let mut encoder = Encoder::new(EncoderType::Label);
            let encoded = encoder.fit_transform(&df, &cols)?;
            self.encoder = Some(encoder);
            return Ok(encoded);
        }

        self.encoder
            .as_ref()
            .ok_or(PipelineError::ModelNotFitted)?
            .transform(&df)
    }

    fn normalize(&mut self, df: DataFrame) -> Result<DataFrame> {
        if self.split.is_train() {
            let columns = self.normalize_columns(&df);
            let cols: Vec<&str> = columns.iter().map(|s| s.as_str()).collect();
            let mut quantile = QuantileTransformer::new(self.n_quantiles);
            let normalized = quantile.fit_transform(&df, &cols)?;
            self.quantile = Some(quantile);
            return Ok(normalized);
        }

        self.quantile
            .as_ref()
            .ok_or(PipelineError::ModelNotFitted)?
            .transform(&df)
    }

    fn drop_high_correlation(&mut self, df: DataFrame) -> Result<DataFrame> {
        let df = drop_columns(&df, &HIGH_CORRELATION_DROPS)?;
        drop_columns(&df, &VIF_DROPS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{column_names, f64_values, null_columns};

    fn sample() -> DataFrame {
        df!(
            "Id" => &[1i64, 2, 3, 4],
            "Utilities" => &["AllPub", "AllPub", "AllPub", "NoSeWa"],
            "LotFrontage" => &[Some(65i64), None, Some(68), Some(60)],
            "Exterior1st" => &["VinylSd", "MetalSd", "Stone", "VinylSd"],
            "HeatingQC" => &[Some("Ex"), Some("TA"), Some("Po"), None],
            "SaleType" => &["WD", "New", "COD", "CWD"],
            "Functional" => &["Typ", "Typ", "Min1", "Typ"],
            "GarageArea" => &[548i64, 460, 608, 642],
            "TotalBsmtSF" => &[856i64, 1262, 920, 756],
            "SalePrice" => &[208500i64, 181500, 223500, 140000],
        )
        .unwrap()
    }

    #[test]
    fn test_train_build() {
        let mut pipeline = TreeSimilarPipeline::new(SplitDataType::Train).with_target("SalePrice");
        let built = pipeline.build(&sample()).unwrap();

        let names = column_names(&built);
        for dropped in ["Id", "Utilities", "Functional", "GarageArea", "TotalBsmtSF"] {
            assert!(!names.contains(&dropped.to_string()), "{} should be dropped", dropped);
        }
        assert!(names.contains(&"Is_typical_functional".to_string()));
        assert!(null_columns(&built).is_empty());
        assert!(pipeline.is_fitted());

        // target untouched, features mapped into [0, 1]
        assert_eq!(
            f64_values(&built, "SalePrice").unwrap()[0],
            Some(208500.0)
        );
        for v in f64_values(&built, "LotFrontage").unwrap() {
            let v = v.unwrap();
            assert!((0.0..=1.0).contains(&v));
        }
        // indicator not normalized
        assert_eq!(
            f64_values(&built, "Is_typical_functional").unwrap(),
            vec![Some(1.0), Some(1.0), Some(0.0), Some(1.0)]
        );
    }

    #[test]
    fn test_preprocess_features() {
        let mut pipeline = TreeSimilarPipeline::new(SplitDataType::Train);
        let filled = pipeline.fill_null(sample()).unwrap();
        let df = pipeline.preprocess_features(filled).unwrap();

        let exterior: Vec<Option<String>> = string_values(&df, "Exterior1st").unwrap();
        assert_eq!(exterior[2].as_deref(), Some("Others"));

        let rating = string_values(&df, "HeatingQC").unwrap();
        assert_eq!(
            rating.iter().map(|v| v.as_deref().unwrap()).collect::<Vec<_>>(),
            vec!["positive", "neutral", "negative", "Others"]
        );

        let sale = string_values(&df, "SaleType").unwrap();
        assert_eq!(
            sale.iter().map(|v| v.as_deref().unwrap()).collect::<Vec<_>>(),
            vec!["Warranty_deed", "New", "Others", "Warranty_deed"]
        );
    }

    #[test]
    fn test_test_split_reuses_fit() {
        let mut pipeline = TreeSimilarPipeline::new(SplitDataType::Train).with_target("SalePrice");
        pipeline.build(&sample()).unwrap();

        let test = df!(
            "Id" => &[5i64],
            "LotFrontage" => &[Some(1000i64)],
            "Exterior1st" => &["Stone"],
            "HeatingQC" => &[Some("Gd")],
            "SaleType" => &["Con"],
            "Functional" => &["Sev"],
        )
        .unwrap();

        let mut pipeline = pipeline.with_split(SplitDataType::Test);
        let built = pipeline.build(&test).unwrap();
        assert_eq!(f64_values(&built, "LotFrontage").unwrap(), vec![Some(1.0)]);
        // "Stone" collapses to "Others", the highest code seen during fit
        assert_eq!(f64_values(&built, "Exterior1st").unwrap(), vec![Some(1.0)]);
    }

    #[test]
    fn test_nan_feature_survives_build() {
        let df = df!(
            "LotFrontage" => &[65.0, f64::NAN, 80.0, 70.0],
            "SalePrice" => &[208500.0, 181500.0, 223500.0, 140000.0],
        )
        .unwrap();
        let mut pipeline = TreeSimilarPipeline::new(SplitDataType::Train).with_target("SalePrice");
        let built = pipeline.build(&df).unwrap();

        let values = f64_values(&built, "LotFrontage").unwrap();
        assert_eq!(values[0], Some(0.0));
        assert!(values[1].unwrap().is_nan());
        assert_eq!(values[2], Some(1.0));
    }

    #[test]
    fn test_non_train_without_fit_fails() {
        let mut pipeline = TreeSimilarPipeline::new(SplitDataType::Validation);
        let err = pipeline.build(&sample()).unwrap_err();
        assert!(matches!(err, PipelineError::ModelNotFitted));
    }

    #[test]
    fn test_missing_columns_are_ignored() {
        let df = df!("LotArea" => &[1i64, 2, 3]).unwrap();
        let mut pipeline = TreeSimilarPipeline::new(SplitDataType::Train);
        let built = pipeline.build(&df).unwrap();
        assert_eq!(column_names(&built), vec!["LotArea"]);
    }
}
