//! Turns raw score vectors into probability distributions.
//!
//! The two models do not agree on an output convention: one may already end in a
//! softmax, the other may emit logits. A vector that already looks like a distribution
//! (every value in `[0, 1]`, sum close to 1) is only rescaled to sum to exactly 1.
//! Anything else is treated as logits and passed through a max-shifted softmax.
//!
//! The check is a heuristic. A distribution with a small rounding error beyond the
//! tolerance takes the softmax path and comes out flattened.

use crate::errors::{ClassifierError, Result};

const RELATIVE_TOLERANCE: f64 = 1e-5;
const ABSOLUTE_TOLERANCE: f64 = 1e-8;

/// Which branch `normalize` took for a vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalization {
    Rescaled,
    Softmax,
}

/// Normalizes `scores` over the full vector, whatever its length.
pub fn normalize(scores: &[f32]) -> Result<(Vec<f64>, Normalization)> {
    if scores.is_empty() {
        return Err(ClassifierError::inference("model returned an empty score vector"));
    }
    if let Some(index) = scores.iter().position(|v| !v.is_finite()) {
        return Err(ClassifierError::inference(format!(
            "model returned a non-finite score at index {index}"
        )));
    }

    let scores: Vec<f64> = scores.iter().map(|&v| f64::from(v)).collect();
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let sum: f64 = scores.iter().sum();

    if max > 1.0 || min < 0.0 || !is_close(sum, 1.0) {
        Ok((softmax(&scores), Normalization::Softmax))
    } else {
        Ok((scores.iter().map(|v| v / sum).collect(), Normalization::Rescaled))
    }
}

pub fn softmax(values: &[f64]) -> Vec<f64> {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = values.iter().map(|v| (v - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= ABSOLUTE_TOLERANCE + RELATIVE_TOLERANCE * b.abs()
}
