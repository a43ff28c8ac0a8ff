//! Feature standardization (zero mean, unit variance).
//!
//! Parameters are fitted once per training cycle and reused verbatim for
//! every subsequent transform of that model generation, including single
//! inference rows. Refitting per request would silently shift the feature
//! space out from under the classifier weights.

use serde::{Deserialize, Serialize};

use super::PredictError;

/// Per-column mean and standard deviation, fixed at fit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

/// Compute column-wise mean and population standard deviation (divide by
/// row count, not n−1) over the given rows.
///
/// Columns with zero variance get a standard deviation of 1 so that
/// transforming them yields zeros instead of dividing by zero.
pub fn fit(rows: &[Vec<f64>]) -> Result<ScalerParams, PredictError> {
    let Some(first) = rows.first() else {
        return Err(PredictError::InvalidInput("no feature rows to fit".into()));
    };
    let cols = first.len();
    if cols == 0 {
        return Err(PredictError::InvalidInput("empty feature row".into()));
    }
    if let Some(bad) = rows.iter().find(|r| r.len() != cols) {
        return Err(PredictError::InvalidInput(format!(
            "inconsistent row length: expected {cols}, got {}",
            bad.len()
        )));
    }

    let n = rows.len() as f64;

    let mut mean = vec![0.0; cols];
    for row in rows {
        for (j, v) in row.iter().enumerate() {
            mean[j] += v;
        }
    }
    for m in &mut mean {
        *m /= n;
    }

    let mut std = vec![0.0; cols];
    for row in rows {
        for (j, v) in row.iter().enumerate() {
            std[j] += (v - mean[j]).powi(2);
        }
    }
    for s in &mut std {
        *s = (*s / n).sqrt();
        if *s == 0.0 {
            *s = 1.0;
        }
    }

    Ok(ScalerParams { mean, std })
}

/// Apply `(value − mean[j]) / std[j]` per column. Deterministic and
/// side-effect free given fixed params.
pub fn transform(rows: &[Vec<f64>], params: &ScalerParams) -> Vec<Vec<f64>> {
    rows.iter()
        .map(|row| transform_row(row, params))
        .collect()
}

/// Standardize a single feature row
pub fn transform_row(row: &[f64], params: &ScalerParams) -> Vec<f64> {
    row.iter()
        .zip(params.mean.iter().zip(params.std.iter()))
        .map(|(v, (m, s))| (v - m) / s)
        .collect()
}
