//! Data preprocessing module
//!
//! Fitted column transforms used by the pipeline stages:
//! - Constant null filling
//! - Feature scaling (Standard, MinMax)
//! - Categorical encoding (Label, OneHot)
//! - Quantile transformation to a uniform distribution

mod encoder;
mod imputer;
mod quantile;
mod scaler;

pub use encoder::{Encoder, EncoderType, UNKNOWN_CODE};
pub use imputer::fill_constant;
pub use quantile::{QuantileTransformer, DEFAULT_N_QUANTILES};
pub use scaler::{Scaler, ScalerType};
