//! Categorical encoding

use crate::error::{PipelineError, Result};
use crate::utils::string_values;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Code assigned to categories not seen during fit (and to nulls) by label encoding
pub const UNKNOWN_CODE: i64 = -1;

/// Type of encoder to use
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EncoderType {
    /// Ordinal codes `0..k` in first-seen order
    Label,
    /// One `Int8` column per category, source column dropped
    OneHot,
}

/// Categorical encoder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Encoder {
    encoder_type: EncoderType,
    // column order as passed to fit
    columns: Vec<String>,
    // column -> categories in first-seen order
    categories: HashMap<String, Vec<String>>,
    is_fitted: bool,
}

impl Encoder {
    /// Create a new encoder
    pub fn new(encoder_type: EncoderType) -> Self {
        Self {
            encoder_type,
            columns: Vec::new(),
            categories: HashMap::new(),
            is_fitted: false,
        }
    }

    /// Learn the categories of the named columns
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        self.columns.clear();
        self.categories.clear();

        for col_name in columns {
            let values = string_values(df, col_name)?;
            let mut seen: Vec<String> = Vec::new();
            for value in values.into_iter().flatten() {
                if !seen.contains(&value) {
                    seen.push(value);
                }
            }
            self.columns.push(col_name.to_string());
            self.categories.insert(col_name.to_string(), seen);
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Encode every fitted column present in `df`
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(PipelineError::ModelNotFitted);
        }

        match self.encoder_type {
            EncoderType::Label => self.transform_label(df),
            EncoderType::OneHot => self.transform_onehot(df),
        }
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

    /// Categories learned for a column
    pub fn categories(&self, column: &str) -> Option<&[String]> {
        self.categories.get(column).map(|c| c.as_slice())
    }

    fn lookup(&self, column: &str) -> HashMap<&str, usize> {
        self.categories
            .get(column)
            .map(|cats| {
                cats.iter()
                    .enumerate()
                    .map(|(idx, cat)| (cat.as_str(), idx))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn transform_label(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut result = df.clone();

        for col_name in &self.columns {
            if result.get_column_index(col_name).is_none() {
                continue;
            }
            let mapping = self.lookup(col_name);
            let codes: Vec<i64> = string_values(df, col_name)?
                .iter()
                .map(|v| {
                    v.as_deref()
                        .and_then(|s| mapping.get(s))
                        .map(|&idx| idx as i64)
                        .unwrap_or(UNKNOWN_CODE)
                })
                .collect();
            result.with_column(Series::new(col_name.as_str().into(), codes))?;
        }

        Ok(result)
    }

    fn transform_onehot(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut result = df.clone();

        for col_name in &self.columns {
            if result.get_column_index(col_name).is_none() {
                continue;
            }
            let values = string_values(df, col_name)?;
            let categories = self.categories.get(col_name).cloned().unwrap_or_default();

            for category in &categories {
                let indicator: Vec<i8> = values
                    .iter()
                    .map(|v| i8::from(v.as_deref() == Some(category.as_str())))
                    .collect();
                let name = format!("{}_{}", col_name, category);
                result.with_column(Series::new(name.into(), indicator))?;
            }

            result = result.drop(col_name)?;
        }

        Ok(result)
    }
}
