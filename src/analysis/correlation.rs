//! Pearson correlation and variance inflation factors

use crate::error::Result;
use crate::utils::{f64_values, numeric_columns};
use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;

/// Pearson correlation over pairwise-complete observations.
/// `None` when fewer than two complete pairs exist or either side is constant.
pub fn pearson_pairwise(a: &[Option<f64>], b: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b.iter())
        .filter_map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some((*x, *y)),
            _ => None,
        })
        .collect();

    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let x_mean = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let y_mean = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let mut sum_xy = 0.0;
    let mut sum_x2 = 0.0;
    let mut sum_y2 = 0.0;
    for &(xi, yi) in &pairs {
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        sum_xy += dx * dy;
        sum_x2 += dx * dx;
        sum_y2 += dy * dy;
    }

    let denom = (sum_x2 * sum_y2).sqrt();
    if denom == 0.0 {
        None
    } else {
        Some((sum_xy / denom).clamp(-1.0, 1.0))
    }
}

/// Correlation matrix of every numeric column. Undefined entries are NaN.
pub fn correlation_matrix(df: &DataFrame) -> Result<(Vec<String>, Array2<f64>)> {
    let names = numeric_columns(df);
    let columns: Vec<Vec<Option<f64>>> = names
        .iter()
        .map(|name| f64_values(df, name))
        .collect::<Result<_>>()?;

    let k = names.len();
    let mut corr = Array2::from_elem((k, k), f64::NAN);
    for i in 0..k {
        for j in i..k {
            let r = pearson_pairwise(&columns[i], &columns[j]).unwrap_or(f64::NAN);
            corr[[i, j]] = r;
            corr[[j, i]] = r;
        }
    }

    Ok((names, corr))
}

/// Least squares solution of `x * beta = y` through the normal equations.
/// `None` when `x^T x` is singular.
pub fn least_squares(x: &Array2<f64>, y: &Array1<f64>) -> Option<Array1<f64>> {
    let xt = x.t();
    let xtx = xt.dot(x);
    let xty = xt.dot(y);
    solve_linear(xtx, xty)
}

/// Gaussian elimination with partial pivoting
fn solve_linear(mut a: Array2<f64>, mut b: Array1<f64>) -> Option<Array1<f64>> {
    let n = b.len();
    let scale = a.iter().fold(0.0f64, |m, v| m.max(v.abs())).max(1.0);
    let eps = 1e-12 * scale;

    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| {
            a[[i, col]]
                .abs()
                .partial_cmp(&a[[j, col]].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        if a[[pivot, col]].abs() < eps {
            return None;
        }
        if pivot != col {
            for k in 0..n {
                a.swap([pivot, k], [col, k]);
            }
            b.swap(pivot, col);
        }

        for row in (col + 1)..n {
            let factor = a[[row, col]] / a[[col, col]];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[[row, k]] -= factor * a[[col, k]];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut solution = Array1::zeros(n);
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| a[[row, k]] * solution[k]).sum();
        solution[row] = (b[row] - tail) / a[[row, row]];
    }
    Some(solution)
}

/// VIF of column `idx`: regress it on the remaining columns (no intercept,
/// the matrix is expected to be centered) and return `1 / (1 - R²)`.
pub fn variance_inflation_factor(x: &Array2<f64>, idx: usize) -> f64 {
    let y = x.column(idx).to_owned();
    let others: Vec<usize> = (0..x.ncols()).filter(|&j| j != idx).collect();
    if others.is_empty() {
        return 1.0;
    }
    let x_other = x.select(Axis(1), &others);

    let ss_tot: f64 = y.iter().map(|v| v * v).sum();
    if ss_tot == 0.0 {
        return f64::NAN;
    }

    let r2 = match least_squares(&x_other, &y) {
        Some(beta) => {
            let residual = &y - &x_other.dot(&beta);
            let ss_res: f64 = residual.iter().map(|v| v * v).sum();
            1.0 - ss_res / ss_tot
        }
        // singular design: the column is an exact combination of the others
        None => 1.0,
    };

    if r2 >= 1.0 - 1e-12 {
        f64::INFINITY
    } else {
        1.0 / (1.0 - r2)
    }
}
