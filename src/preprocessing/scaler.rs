//! Feature scaling

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Type of scaler to use
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScalerType {
    /// Standard scaling (z-score): (x - mean) / std, population std
    Standard,
    /// Min-Max scaling: (x - min) / (max - min)
    MinMax,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScalerParams {
    center: f64,
    scale: f64,
}

/// Column-wise feature scaler. Output columns are `Float64`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaler {
    scaler_type: ScalerType,
    params: HashMap<String, ScalerParams>,
    is_fitted: bool,
}

impl Scaler {
    /// Create a new scaler
    pub fn new(scaler_type: ScalerType) -> Self {
        Self {
            scaler_type,
            params: HashMap::new(),
            is_fitted: false,
        }
    }

    /// Fit the scaler to the named columns
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        self.params.clear();
        for col_name in columns {
            let series = Self::float_series(df, col_name)?;
            let params = self.compute_params(&series)?;
            self.params.insert(col_name.to_string(), params);
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Scale every fitted column present in `df`
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(PipelineError::ModelNotFitted);
        }

        let mut result = df.clone();
        for (col_name, params) in &self.params {
            if result.get_column_index(col_name).is_none() {
                continue;
            }
            let series = Self::float_series(df, col_name)?;
            let ca = series.f64()?;
            let scaled: Float64Chunked = ca
                .into_iter()
                .map(|opt| opt.map(|v| (v - params.center) / params.scale))
                .collect();
            result.with_column(scaled.with_name(col_name.as_str().into()).into_series())?;
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// Whether `fit` has been called
    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    fn float_series(df: &DataFrame, col_name: &str) -> Result<Series> {
        let column = df
            .column(col_name)
            .map_err(|_| PipelineError::FeatureNotFound(col_name.to_string()))?;
        Ok(column.as_materialized_series().cast(&DataType::Float64)?)
    }

    fn compute_params(&self, series: &Series) -> Result<ScalerParams> {
        let ca = series.f64()?;

        match self.scaler_type {
            ScalerType::Standard => {
                let mean = ca.mean().unwrap_or(0.0);
                let std = ca.std(0).unwrap_or(1.0);
                Ok(ScalerParams {
                    center: mean,
                    scale: if std == 0.0 { 1.0 } else { std },
                })
            }
            ScalerType::MinMax => {
                let min = ca.min().unwrap_or(0.0);
                let max = ca.max().unwrap_or(1.0);
                let range = max - min;
                Ok(ScalerParams {
                    center: min,
                    scale: if range == 0.0 { 1.0 } else { range },
                })
            }
        }
    }
}
