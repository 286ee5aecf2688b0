//! End-to-end training: split, transform, fit, predict

use crate::error::{PipelineError, Result};
use crate::feature_transformer::FeatureTransformer;
use crate::pipeline::SplitDataType;
use crate::training::{train_test_split, Estimator, SplitOptions};
use crate::utils::{column_names, column_to_array, frame_to_matrix, has_column, take_rows};
use ndarray::Array1;
use polars::prelude::*;
use tracing::{debug, info};

/// Holds the train/test partition of a labelled frame
#[derive(Debug, Clone)]
pub struct Trainer {
    x_train: DataFrame,
    x_test: DataFrame,
    y_train: Array1<f64>,
    y_test: Option<Array1<f64>>,
    target_column: String,
}

fn split_target(df: &DataFrame, target: &str) -> Result<(DataFrame, Array1<f64>)> {
    if !has_column(df, target) {
        return Err(PipelineError::FeatureNotFound(target.to_string()));
    }
    let y = column_to_array(df, target)?;
    Ok((df.drop(target)?, y))
}

impl Trainer {
    /// Separate `target` from `df` and split the rows
    pub fn from_frame(df: &DataFrame, target: &str, options: &SplitOptions) -> Result<Self> {
        let (x, y) = split_target(df, target)?;
        let (train_idx, test_idx) = train_test_split(x.height(), options)?;

        let y_train: Array1<f64> = train_idx.iter().map(|&i| y[i]).collect();
        let y_test: Array1<f64> = test_idx.iter().map(|&i| y[i]).collect();

        Ok(Self {
            x_train: take_rows(&x, &train_idx)?,
            x_test: take_rows(&x, &test_idx)?,
            y_train,
            y_test: Some(y_test),
            target_column: target.to_string(),
        })
    }

    /// Use a pre-split test set; `test_y` is `None` when the labels are unknown
    pub fn from_parts(train_df: &DataFrame, test_x: DataFrame, test_y: Option<Array1<f64>>, target: &str) -> Result<Self> {
        let (x_train, y_train) = split_target(train_df, target)?;

        if let Some(y) = &test_y {
            if y.len() != test_x.height() {
                return Err(PipelineError::ShapeError {
                    expected: format!("{} test targets", test_x.height()),
                    actual: format!("{} test targets", y.len()),
                });
            }
        }
        // a test frame exported with the target column still predicts
        let x_test = if has_column(&test_x, target) { test_x.drop(target)? } else { test_x };

        Ok(Self {
            x_train,
            x_test,
            y_train,
            y_test: test_y,
            target_column: target.to_string(),
        })
    }

    pub fn x_train(&self) -> &DataFrame {
        &self.x_train
    }

    pub fn x_test(&self) -> &DataFrame {
        &self.x_test
    }

    pub fn y_train(&self) -> &Array1<f64> {
        &self.y_train
    }

    pub fn y_test(&self) -> Option<&Array1<f64>> {
        self.y_test.as_ref()
    }

    pub fn target_column(&self) -> &str {
        &self.target_column
    }

    /// Run every transformer stage on the training frame, fit `estimator`,
    /// then push the test frame through the same fitted transformer and
    /// return the test predictions.
    pub fn train<T, F, E>(&self, make_transformer: F, estimator: &mut E) -> Result<Array1<f64>>
    where
        T: FeatureTransformer,
        F: FnOnce(DataFrame, SplitDataType) -> T,
        E: Estimator,
    {
        let mut transformer = make_transformer(self.x_train.clone(), SplitDataType::Train);
        let columns = column_names(transformer.transform_all()?);
        let x_train = frame_to_matrix(transformer.frame(), &columns)?;

        let score = estimator.fit(&x_train, &self.y_train)?;
        info!(
            rows = x_train.nrows(),
            features = x_train.ncols(),
            score,
            "Estimator trained"
        );

        transformer.attach(self.x_test.clone(), SplitDataType::Test);
        let test_frame = transformer.transform_all()?;
        if let Some(missing) = columns.iter().find(|c| !has_column(test_frame, c)) {
            return Err(PipelineError::FeatureNotFound(missing.clone()));
        }
        let x_test = frame_to_matrix(test_frame, &columns)?;

        let predictions = estimator.predict(&x_test)?;
        debug!(n_predictions = predictions.len(), "Test set predicted");
        Ok(predictions)
    }
}
