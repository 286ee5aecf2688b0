//! Integration test: load → tree pipeline / feature transformer

mod common;

use common::housing_frame;
use house_price_pipeline::feature_transformer::{FeatureTransformer, TreeSimilarFeatureTransformer};
use house_price_pipeline::pipeline::{
    PipelineTemplate, SplitDataType, TreeSimilarPipeline, HIGH_CORRELATION_DROPS, INDICATOR_COLUMNS,
    NOT_NEEDED_COLUMNS, VIF_DROPS,
};
use house_price_pipeline::utils::{
    column_names, f64_values, has_column, null_columns, numeric_columns, take_rows, write_csv, DataLoader,
};
use house_price_pipeline::PipelineError;
use polars::prelude::*;

#[test]
fn test_tree_pipeline_train_build() {
    let df = housing_frame(60);
    let mut pipeline = TreeSimilarPipeline::new(SplitDataType::Train).with_target("SalePrice");
    let built = pipeline.build(&df).unwrap();

    assert_eq!(built.height(), 60);
    assert!(null_columns(&built).is_empty());
    assert_eq!(numeric_columns(&built).len(), built.width());

    for dropped in NOT_NEEDED_COLUMNS.iter().chain(&HIGH_CORRELATION_DROPS).chain(&VIF_DROPS) {
        assert!(!has_column(&built, dropped), "{} should be dropped", dropped);
    }
    for indicator in INDICATOR_COLUMNS {
        assert!(has_column(&built, indicator), "{} missing", indicator);
    }
    // the source frame is left as it was
    assert_eq!(df.width(), 20);
    assert!(has_column(&df, "Id"));
}

#[test]
fn test_tree_pipeline_keeps_target_scale() {
    let df = housing_frame(40);
    let mut pipeline = TreeSimilarPipeline::new(SplitDataType::Train).with_target("SalePrice");
    let built = pipeline.build(&df).unwrap();

    let before: Vec<Option<f64>> = f64_values(&df, "SalePrice").unwrap();
    assert_eq!(f64_values(&built, "SalePrice").unwrap(), before);

    for value in f64_values(&built, "GrLivArea").unwrap() {
        assert!((0.0..=1.0).contains(&value.unwrap()));
    }
}

#[test]
fn test_tree_pipeline_test_split_reuses_fit() {
    let df = housing_frame(80);
    let train_rows: Vec<usize> = (0..60).collect();
    let test_rows: Vec<usize> = (60..80).collect();
    let train = take_rows(&df, &train_rows).unwrap();
    let test = take_rows(&df, &test_rows).unwrap().drop("SalePrice").unwrap();

    let mut pipeline = TreeSimilarPipeline::new(SplitDataType::Train).with_target("SalePrice");
    let train_built = pipeline.build(&train).unwrap();

    pipeline.set_split(SplitDataType::Test);
    let test_built = pipeline.build(&test).unwrap();

    let mut expected = column_names(&train_built);
    expected.retain(|c| c != "SalePrice");
    assert_eq!(column_names(&test_built), expected);
    assert!(null_columns(&test_built).is_empty());
}

#[test]
fn test_tree_pipeline_test_split_without_fit() {
    let mut pipeline = TreeSimilarPipeline::new(SplitDataType::Test);
    let result = pipeline.build(&housing_frame(10));
    assert!(matches!(result, Err(PipelineError::ModelNotFitted)));
}

#[test]
fn test_pipeline_on_loaded_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("train.csv");
    let mut df = housing_frame(30);
    write_csv(&mut df, &path).unwrap();

    let loaded = DataLoader::new().load_auto(&path).unwrap();
    assert_eq!(loaded.shape(), (30, 20));
    assert_eq!(loaded.column("LotFrontage").unwrap().null_count(), df.column("LotFrontage").unwrap().null_count());

    let mut pipeline = TreeSimilarPipeline::new(SplitDataType::Train).with_target("SalePrice");
    let built = pipeline.build(&loaded).unwrap();
    assert!(null_columns(&built).is_empty());
}

#[test]
fn test_feature_transformer_train_then_test() {
    let df = housing_frame(50).drop("SalePrice").unwrap();
    let train = take_rows(&df, &(0..40).collect::<Vec<_>>()).unwrap();
    let test = take_rows(&df, &(40..50).collect::<Vec<_>>()).unwrap();

    let mut transformer = TreeSimilarFeatureTransformer::new(train, SplitDataType::Train);
    let train_columns = column_names(transformer.transform_all().unwrap());
    assert!(!train_columns.contains(&"Id".to_string()));

    transformer.attach(test, SplitDataType::Test);
    let out = transformer.transform_all().unwrap();
    assert_eq!(column_names(out), train_columns);
    assert!(null_columns(out).is_empty());
    assert_eq!(numeric_columns(out).len(), out.width());

    let frame: DataFrame = transformer.into_frame();
    assert_eq!(frame.height(), 10);
}

#[test]
fn test_feature_transformer_test_split_without_fit() {
    let mut transformer = TreeSimilarFeatureTransformer::new(housing_frame(5), SplitDataType::Test);
    transformer.drop_not_needed().unwrap();
    transformer.fill_null().unwrap();
    assert!(matches!(transformer.encode(), Err(PipelineError::ModelNotFitted)));
}
