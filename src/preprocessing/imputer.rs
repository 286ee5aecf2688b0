//! Constant null filling

use crate::error::Result;
use crate::utils::{f64_values, is_categorical_dtype, is_numeric_dtype, string_values};
use polars::prelude::*;
use tracing::trace;

/// Replace nulls: numeric columns get `numeric` (the column becomes `Float64`),
/// String / Categorical columns get `categorical`. Columns without nulls are
/// left untouched, dtype included.
pub fn fill_constant(df: &DataFrame, numeric: f64, categorical: &str) -> Result<DataFrame> {
    let mut result = df.clone();

    let targets: Vec<(String, DataType)> = df
        .get_columns()
        .iter()
        .filter(|col| col.null_count() > 0)
        .map(|col| (col.name().to_string(), col.dtype().clone()))
        .collect();

    for (name, dtype) in targets {
        if is_numeric_dtype(&dtype) {
            let filled: Vec<f64> = f64_values(df, &name)?
                .into_iter()
                .map(|v| v.unwrap_or(numeric))
                .collect();
            result.with_column(Series::new(name.as_str().into(), filled))?;
        } else if is_categorical_dtype(&dtype) {
            let filled: Vec<String> = string_values(df, &name)?
                .into_iter()
                .map(|v| v.unwrap_or_else(|| categorical.to_string()))
                .collect();
            result.with_column(Series::new(name.as_str().into(), filled))?;
        } else {
            trace!(column = %name, dtype = %dtype, "Skipping null fill for unsupported dtype");
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::null_columns;

    #[test]
    fn test_fill_constant() {
        let df = df!(
            "LotFrontage" => &[Some(65i64), None, Some(80)],
            "Alley" => &[None, Some("Grvl"), None],
            "LotArea" => &[8450i64, 9600, 11250],
        )
        .unwrap();

        let filled = fill_constant(&df, -1.0, "None").unwrap();

        assert!(null_columns(&filled).is_empty());
        assert_eq!(
            f64_values(&filled, "LotFrontage").unwrap(),
            vec![Some(65.0), Some(-1.0), Some(80.0)]
        );
        assert_eq!(
            string_values(&filled, "Alley").unwrap()[0].as_deref(),
            Some("None")
        );
        // untouched column keeps its dtype
        assert_eq!(filled.column("LotArea").unwrap().dtype(), &DataType::Int64);
    }
}
