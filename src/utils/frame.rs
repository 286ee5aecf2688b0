//! DataFrame helpers shared by the analysis, pipeline and training code

use crate::error::{PipelineError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;

/// Whether a dtype holds numbers the pipeline treats as numeric
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Whether a dtype holds category labels
pub fn is_categorical_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::String | DataType::Categorical(_, _))
}

/// Column names in frame order
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

/// Names of numeric columns in frame order
pub fn numeric_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| is_numeric_dtype(col.dtype()))
        .map(|col| col.name().to_string())
        .collect()
}

/// Names of String / Categorical columns in frame order
pub fn categorical_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| is_categorical_dtype(col.dtype()))
        .map(|col| col.name().to_string())
        .collect()
}

/// Names of columns holding at least one null, in frame order
pub fn null_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| col.null_count() > 0)
        .map(|col| col.name().to_string())
        .collect()
}

/// Whether the frame has a column with this name
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_index(name).is_some()
}

/// Values of a column cast to `f64`, nulls preserved
pub fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .map_err(|_| PipelineError::FeatureNotFound(name.to_string()))?;
    let casted = column.as_materialized_series().cast(&DataType::Float64)?;
    Ok(casted.f64()?.into_iter().collect())
}

/// Values of a column rendered as strings, nulls preserved
pub fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df
        .column(name)
        .map_err(|_| PipelineError::FeatureNotFound(name.to_string()))?;
    let casted = column.as_materialized_series().cast(&DataType::String)?;
    Ok(casted
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Drop the named columns, ignoring names that are not present
pub fn drop_columns(df: &DataFrame, names: &[&str]) -> Result<DataFrame> {
    let mut result = df.clone();
    for name in names {
        if has_column(&result, name) {
            result = result.drop(name)?;
        }
    }
    Ok(result)
}

/// Column names with their dtypes, in frame order
pub fn column_dtypes(df: &DataFrame) -> Vec<(String, DataType)> {
    df.get_columns()
        .iter()
        .map(|col| (col.name().to_string(), col.dtype().clone()))
        .collect()
}

/// Cast columns of `df` to the dtypes recorded in `reference`.
///
/// An all-null column takes the reference dtype whatever it was read as.
/// Numeric columns stay as they are when both sides are numeric. Any other
/// mismatch is an error naming the column. Columns absent from either side
/// are left alone.
pub fn align_dtypes(df: &DataFrame, reference: &[(String, DataType)]) -> Result<DataFrame> {
    let mut result = df.clone();
    for (name, dtype) in reference {
        let Ok(column) = df.column(name) else {
            continue;
        };
        if column.dtype() == dtype || (is_numeric_dtype(column.dtype()) && is_numeric_dtype(dtype)) {
            continue;
        }
        if column.null_count() != column.len() {
            return Err(PipelineError::DataError(format!(
                "column '{}' is {} here but {} in the fitted frame",
                name,
                column.dtype(),
                dtype
            )));
        }
        let casted = column.as_materialized_series().cast(dtype)?;
        result.with_column(casted)?;
    }
    Ok(result)
}

/// Select rows by position
pub fn take_rows(df: &DataFrame, indices: &[usize]) -> Result<DataFrame> {
    let idx: Vec<IdxSize> = indices.iter().map(|&i| i as IdxSize).collect();
    let idx = IdxCa::from_vec("idx".into(), idx);
    Ok(df.take(&idx)?)
}

/// Extract named columns into a row-major matrix. Nulls become `0.0`.
pub fn frame_to_matrix(df: &DataFrame, col_names: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = col_names.len();

    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|name| {
            let column = df
                .column(name)
                .map_err(|_| PipelineError::FeatureNotFound(name.clone()))?;
            if !is_numeric_dtype(column.dtype()) {
                return Err(PipelineError::DataError(format!(
                    "column '{}' has non-numeric dtype {}",
                    name,
                    column.dtype()
                )));
            }
            Ok(f64_values(df, name)?
                .into_iter()
                .map(|v| v.unwrap_or(0.0))
                .collect())
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| col_data[c][r]))
}

/// Extract every column of the frame into a matrix
pub fn frame_to_matrix_all(df: &DataFrame) -> Result<Array2<f64>> {
    frame_to_matrix(df, &column_names(df))
}

/// Extract a column as a dense vector; a null is an error
pub fn column_to_array(df: &DataFrame, name: &str) -> Result<Array1<f64>> {
    f64_values(df, name)?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.ok_or_else(|| {
                PipelineError::ValidationError(format!("column '{}' is null at row {}", name, row))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        df!(
            "Id" => &[1i64, 2, 3],
            "LotArea" => &[Some(8450.0), None, Some(11250.0)],
            "Street" => &[Some("Pave"), Some("Grvl"), None],
        )
        .unwrap()
    }

    #[test]
    fn test_column_kinds() {
        let df = sample();
        assert_eq!(numeric_columns(&df), vec!["Id", "LotArea"]);
        assert_eq!(categorical_columns(&df), vec!["Street"]);
        assert_eq!(null_columns(&df), vec!["LotArea", "Street"]);
    }

    #[test]
    fn test_drop_columns_ignores_missing() {
        let df = sample();
        let dropped = drop_columns(&df, &["Id", "Utilities"]).unwrap();
        assert_eq!(column_names(&dropped), vec!["LotArea", "Street"]);
    }

    #[test]
    fn test_take_rows() {
        let df = sample();
        let taken = take_rows(&df, &[2, 0]).unwrap();
        assert_eq!(f64_values(&taken, "Id").unwrap(), vec![Some(3.0), Some(1.0)]);
    }

    #[test]
    fn test_frame_to_matrix_fills_nulls() {
        let df = sample();
        let x = frame_to_matrix(&df, &["Id".to_string(), "LotArea".to_string()]).unwrap();
        assert_eq!(x.shape(), &[3, 2]);
        assert_eq!(x[[1, 1]], 0.0);
        assert_eq!(x[[2, 0]], 3.0);
    }

    #[test]
    fn test_frame_to_matrix_rejects_strings() {
        let df = sample();
        let err = frame_to_matrix(&df, &["Street".to_string()]).unwrap_err();
        assert!(matches!(err, PipelineError::DataError(_)));
    }

    #[test]
    fn test_align_dtypes() {
        let train = df!("LotFrontage" => &[65i64, 80], "Street" => &["Pave", "Grvl"]).unwrap();
        let reference = column_dtypes(&train);

        // an all-NA column is read back as String
        let empty: [Option<&str>; 2] = [None, None];
        let test = df!("LotFrontage" => &empty, "Street" => &["Pave", "Pave"], "Extra" => &[1.0, 2.0]).unwrap();
        let aligned = align_dtypes(&test, &reference).unwrap();
        assert_eq!(aligned.column("LotFrontage").unwrap().dtype(), &DataType::Int64);
        assert_eq!(aligned.column("LotFrontage").unwrap().null_count(), 2);
        assert_eq!(aligned.column("Extra").unwrap().dtype(), &DataType::Float64);

        let floats = df!("LotFrontage" => &[70.5]).unwrap();
        let aligned = align_dtypes(&floats, &reference).unwrap();
        assert_eq!(aligned.column("LotFrontage").unwrap().dtype(), &DataType::Float64);

        let words = df!("LotFrontage" => &["unknown"]).unwrap();
        let err = align_dtypes(&words, &reference).unwrap_err();
        assert!(matches!(err, PipelineError::DataError(msg) if msg.contains("LotFrontage")));
    }

    #[test]
    fn test_column_to_array_rejects_null() {
        let df = sample();
        assert!(column_to_array(&df, "Id").is_ok());
        assert!(column_to_array(&df, "LotArea").is_err());
    }
}
