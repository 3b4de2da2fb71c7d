//! Descriptive statistics and significance testing shared by the estimators.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::error::{PsychometricError, Result};

/// Whether an estimate came from a well-defined computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateStatus {
    /// The statistic was computed from non-degenerate input.
    Computed,
    /// The input had zero variance (or an empty comparison group); the value
    /// is reported as `0.0`.
    Degenerate,
    /// Too few examinees for the statistic to exist; the value is reported
    /// as `0.0`.
    Insufficient,
}

/// A statistic value tagged with how it was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub value: f64,
    pub status: EstimateStatus,
}

impl Estimate {
    pub fn computed(value: f64) -> Self {
        Self {
            value,
            status: EstimateStatus::Computed,
        }
    }

    pub fn degenerate() -> Self {
        Self {
            value: 0.0,
            status: EstimateStatus::Degenerate,
        }
    }

    pub fn insufficient() -> Self {
        Self {
            value: 0.0,
            status: EstimateStatus::Insufficient,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.status == EstimateStatus::Degenerate
    }

    pub fn is_insufficient(&self) -> bool {
        self.status == EstimateStatus::Insufficient
    }

    /// Keep an `InsufficientData` failure in-band so the other statistics of
    /// the same item survive it. Any other error is passed through.
    pub fn or_insufficient(result: Result<Estimate>) -> Result<Estimate> {
        match result {
            Err(PsychometricError::InsufficientData { statistic, found, .. }) => {
                tracing::debug!(statistic = %statistic, found, "statistic left undefined");
                Ok(Estimate::insufficient())
            }
            other => other,
        }
    }
}

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median, averaging the two middle values for even lengths.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Pearson product-moment correlation.
///
/// Fails with `InsufficientData` for fewer than two paired observations and
/// returns a degenerate zero when either series is constant.
pub fn pearson(x: &[f64], y: &[f64]) -> Result<Estimate> {
    if x.len() != y.len() {
        return Err(PsychometricError::ShapeMismatch {
            what: "correlation series".into(),
            expected: x.len(),
            found: y.len(),
        });
    }
    let n = x.len();
    if n < 2 {
        return Err(PsychometricError::insufficient("correlation", 2, n));
    }

    let mx = x.iter().sum::<f64>() / n as f64;
    let my = y.iter().sum::<f64>() / n as f64;

    let (mut sxy, mut sxx, mut syy) = (0.0f64, 0.0f64, 0.0f64);
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mx;
        let dy = yi - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx <= f64::EPSILON || syy <= f64::EPSILON {
        return Ok(Estimate::degenerate());
    }

    let r = sxy / (sxx.sqrt() * syy.sqrt());
    Ok(Estimate::computed(r.clamp(-1.0, 1.0)))
}

/// Survival function of the chi-square distribution, `P(X > x)`.
///
/// Returns `1.0` for `x <= 0` and `NaN` for a non-positive number of degrees
/// of freedom.
pub fn chi_square_sf(x: f64, degrees_of_freedom: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x <= 0.0 {
        return 1.0;
    }
    match ChiSquared::new(degrees_of_freedom) {
        Ok(dist) => dist.sf(x).clamp(0.0, 1.0),
        Err(_) => f64::NAN,
    }
}
