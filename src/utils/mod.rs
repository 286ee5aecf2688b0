//! Utility functions and types

pub mod data_loader;
pub mod frame;

pub use data_loader::{write_csv, DataLoader, FileInfo, NA_MARKER};
pub use frame::{
    align_dtypes, categorical_columns, column_dtypes, column_names, column_to_array, drop_columns, f64_values,
    frame_to_matrix, frame_to_matrix_all, has_column, is_categorical_dtype, is_numeric_dtype,
    null_columns, numeric_columns, string_values, take_rows,
};
