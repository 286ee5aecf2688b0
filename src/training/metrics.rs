//! Regression and classification scores

use crate::error::{PipelineError, Result};
use ndarray::Array1;

fn check_lengths(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(PipelineError::ShapeError {
            expected: format!("{} predictions", y_true.len()),
            actual: format!("{} predictions", y_pred.len()),
        });
    }
    if y_true.is_empty() {
        return Err(PipelineError::ValidationError("cannot score zero samples".to_string()));
    }
    Ok(())
}

/// Arithmetic mean, NaN for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn mse(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    Ok(y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>()
        / y_true.len() as f64)
}

pub fn rmse(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64> {
    Ok(mse(y_true, y_pred)?.sqrt())
}

/// Root mean squared error of `ln(1 + y)`. Values below -1 are rejected.
pub fn rmsle(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    if y_true.iter().chain(y_pred.iter()).any(|&v| v < -1.0) {
        return Err(PipelineError::ComputationError(
            "RMSLE is undefined for values below -1".to_string(),
        ));
    }
    let sum: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t.ln_1p() - p.ln_1p()).powi(2))
        .sum();
    Ok((sum / y_true.len() as f64).sqrt())
}

/// Coefficient of determination. A constant target scores 1.0 when
/// predicted exactly and 0.0 otherwise.
pub fn r2(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    let y_mean = y_true.mean().unwrap_or(0.0);
    let ss_res: f64 = y_true.iter().zip(y_pred.iter()).map(|(t, p)| (t - p).powi(2)).sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - y_mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}

/// Share of exact label matches
pub fn accuracy(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    let correct = y_true.iter().zip(y_pred.iter()).filter(|(t, p)| t == p).count();
    Ok(correct as f64 / y_true.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_rmse() {
        let y = array![1.0, 2.0, 3.0];
        let p = array![1.0, 2.0, 5.0];
        assert!((rmse(&y, &p).unwrap() - (4.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_rmsle() {
        let y = array![0.0, (1.0f64).exp_m1()];
        let p = array![0.0, 0.0];
        // errors of ln1p are 0 and 1
        assert!((rmsle(&y, &p).unwrap() - 0.5f64.sqrt()).abs() < 1e-12);

        let bad = array![-2.0, 1.0];
        assert!(rmsle(&bad, &p).is_err());
    }

    #[test]
    fn test_r2() {
        let y = array![1.0, 2.0, 3.0, 4.0];
        assert_eq!(r2(&y, &y).unwrap(), 1.0);
        let mean_pred = array![2.5, 2.5, 2.5, 2.5];
        assert!(r2(&y, &mean_pred).unwrap().abs() < 1e-12);
    }

    #[test]
    fn test_accuracy() {
        let y = array![0.0, 1.0, 1.0, 0.0];
        let p = array![0.0, 1.0, 0.0, 0.0];
        assert_eq!(accuracy(&y, &p).unwrap(), 0.75);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(rmse(&array![1.0], &array![1.0, 2.0]).is_err());
        assert!(mean(&[]).is_nan());
    }
}
