//! Column rewrites reused across house price pipelines

use super::rating::Rating;
use crate::error::{PipelineError, Result};
use crate::utils::{f64_values, has_column, string_values};
use polars::prelude::*;

/// Label for values outside a kept set
pub const OTHERS: &str = "Others";

/// Earliest plausible construction / sale year
pub const MIN_VALID_YEAR: f64 = 1800.0;
/// Latest year present in the dataset
pub const MAX_VALID_YEAR: f64 = 2016.0;

/// Stateless column rewrites for the house price schema
pub struct HousePriceProcessor;

impl HousePriceProcessor {
    /// Keep values listed in `valid`, replace everything else (null included)
    /// with `"Others"`
    pub fn transform_feature_with_others(df: &DataFrame, column: &str, valid: &[&str]) -> Result<Series> {
        let values: Vec<String> = string_values(df, column)?
            .into_iter()
            .map(|v| match v {
                Some(s) if valid.contains(&s.as_str()) => s,
                _ => OTHERS.to_string(),
            })
            .collect();
        Ok(Series::new(column.into(), values))
    }

    /// Replace a code column by its rating labels
    pub fn transform_feature_to_rating(df: &DataFrame, column: &str) -> Result<Series> {
        let values: Vec<&'static str> = string_values(df, column)?
            .iter()
            .map(|v| Rating::classify(v.as_deref()).label())
            .collect();
        Ok(Series::new(column.into(), values))
    }

    /// Add `new_column` as an `Int8` flag of `column ∈ true_values`, then
    /// drop `column`
    pub fn transform_feature_to_are(
        df: &mut DataFrame,
        column: &str,
        new_column: &str,
        true_values: &[&str],
    ) -> Result<()> {
        let flags: Vec<i8> = string_values(df, column)?
            .iter()
            .map(|v| i8::from(v.as_deref().is_some_and(|s| true_values.contains(&s))))
            .collect();
        replace_with_indicator(df, column, new_column, flags)
    }

    /// Add `new_column` as an `Int8` flag of non-null, then drop `column`
    pub fn transform_feature_to_is_not_none(df: &mut DataFrame, column: &str, new_column: &str) -> Result<()> {
        let flags: Vec<i8> = df
            .column(column)
            .map_err(|_| PipelineError::FeatureNotFound(column.to_string()))?
            .is_not_null()
            .into_iter()
            .map(|v| i8::from(v.unwrap_or(false)))
            .collect();
        replace_with_indicator(df, column, new_column, flags)
    }

    /// Add `new_column` as an `Int8` flag of `value != 0`, then drop `column`.
    /// A null is not zero.
    pub fn transform_feature_to_is_not_0(df: &mut DataFrame, column: &str, new_column: &str) -> Result<()> {
        let flags: Vec<i8> = f64_values(df, column)?
            .iter()
            .map(|v| i8::from(v.map_or(true, |x| x != 0.0)))
            .collect();
        replace_with_indicator(df, column, new_column, flags)
    }

    /// Replace years outside `[1800, 2016]` with the column mean. The mean is
    /// taken before replacement and ignores nulls; nulls stay null.
    pub fn year_validation(df: &mut DataFrame, column: &str) -> Result<()> {
        let values = f64_values(df, column)?;
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        if present.is_empty() {
            return Ok(());
        }
        let mean_year = present.iter().sum::<f64>() / present.len() as f64;

        let validated: Vec<Option<f64>> = values
            .into_iter()
            .map(|v| {
                v.map(|year| {
                    if year > MAX_VALID_YEAR || year < MIN_VALID_YEAR {
                        mean_year
                    } else {
                        year
                    }
                })
            })
            .collect();
        df.with_column(Series::new(column.into(), validated))?;
        Ok(())
    }
}

fn replace_with_indicator(df: &mut DataFrame, column: &str, new_column: &str, flags: Vec<i8>) -> Result<()> {
    df.with_column(Series::new(new_column.into(), flags))?;
    if column != new_column && has_column(df, column) {
        *df = df.drop(column)?;
    }
    Ok(())
}
