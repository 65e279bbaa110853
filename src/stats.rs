//! Population- and weight-adjusted statistic combination
//!
//! Combines several sub-groups' (mean, sd, population) triples into one
//! statistic, each sub-group contributing in proportion to its population
//! size times an externally configured importance weight. The population
//! divisor is `n`, not `n - 1`; output compatibility requires preserving
//! that choice.

use crate::error::{EvalError, Result};

/// Combine sub-group means into a population/weight-adjusted mean.
///
/// Returns `Σ(mean·pop·weight) / Σ(pop·weight)`. All three slices must have
/// the same length and the total population weight must be non-zero.
pub fn combine_mean(means: &[f64], populations: &[f64], weights: &[f64]) -> Result<f64> {
    check_lengths("combine_mean", &[means.len(), populations.len(), weights.len()])?;

    let total_weight: f64 = populations
        .iter()
        .zip(weights)
        .map(|(p, w)| p * w)
        .sum();
    if total_weight == 0.0 {
        return Err(EvalError::ZeroWeightSum {
            operation: "combine_mean",
        });
    }

    let weighted_sum: f64 = means
        .iter()
        .zip(populations)
        .zip(weights)
        .map(|((m, p), w)| m * p * w)
        .sum();

    Ok(weighted_sum / total_weight)
}

/// Combine sub-group standard deviations into a pooled standard deviation.
///
/// Uses the variance-pooling identity: within-group variance plus weighted
/// between-group variance around the pooled mean,
/// `sqrt(Σ(pop·w·sd² + pop·w·(mean−pooled_mean)²) / Σ(pop·w))`.
pub fn combine_sd(
    sds: &[f64],
    means: &[f64],
    populations: &[f64],
    weights: &[f64],
) -> Result<f64> {
    check_lengths(
        "combine_sd",
        &[sds.len(), means.len(), populations.len(), weights.len()],
    )?;

    let pooled_mean = combine_mean(means, populations, weights)?;

    let total_weight: f64 = populations
        .iter()
        .zip(weights)
        .map(|(p, w)| p * w)
        .sum();

    let deviance: f64 = sds
        .iter()
        .zip(means)
        .zip(populations)
        .zip(weights)
        .map(|(((sd, m), p), w)| p * w * sd * sd + p * w * (m - pooled_mean).powi(2))
        .sum();

    let sd = (deviance / total_weight).sqrt();
    if !sd.is_finite() {
        return Err(EvalError::NonFinite {
            statistic: "standard deviation",
        });
    }
    Ok(sd)
}

fn check_lengths(operation: &'static str, lengths: &[usize]) -> Result<()> {
    if lengths.windows(2).any(|pair| pair[0] != pair[1]) {
        return Err(EvalError::LengthMismatch {
            operation,
            lengths: lengths.to_vec(),
        });
    }
    Ok(())
}
