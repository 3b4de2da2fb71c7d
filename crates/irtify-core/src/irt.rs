//! Proxy three-parameter-logistic item parameters and the item characteristic
//! curve.
//!
//! The parameters are closed-form proxies, not likelihood fits:
//!
//! - `a` (discrimination) is the item-total correlation,
//! - `b` (difficulty) is the proportion correct, left on the `[0, 1]` scale,
//! - `c` (guessing) is `1 / k` where `k` is the number of distinct categories
//!   observed for the item, a missing response counting as one category.

use std::borrow::Borrow;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::ctt::{difficulty, item_total_correlation};
use crate::error::{PsychometricError, Result};
use crate::model::{check_shape, AnswerKey, ResponseRecord};
use crate::statistics::Estimate;

/// Proxy 3PL parameters for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrtItemParameters {
    /// Item label.
    pub item: String,
    /// `a`: item-total correlation.
    pub discrimination: Estimate,
    /// `b`: proportion correct.
    pub difficulty: f64,
    /// `c`: reciprocal of the observed category count.
    pub guessing: f64,
    /// Number of distinct categories observed for the item.
    pub categories_observed: usize,
}

impl IrtItemParameters {
    pub fn a(&self) -> f64 {
        self.discrimination.value
    }

    pub fn b(&self) -> f64 {
        self.difficulty
    }

    pub fn c(&self) -> f64 {
        self.guessing
    }

    /// Probability of a correct response at ability `theta`.
    pub fn probability(&self, theta: f64) -> f64 {
        icc(theta, self.a(), self.b(), self.c())
    }
}

/// Number of distinct response categories given to `item`, missing included.
pub fn observed_categories<R: Borrow<ResponseRecord>>(records: &[R], item: usize) -> usize {
    records
        .iter()
        .filter_map(|r| r.borrow().response(item))
        .map(Option::as_ref)
        .collect::<HashSet<_>>()
        .len()
}

/// Guessing parameter: `1 / k` over the observed categories for `item`.
pub fn guessing<R: Borrow<ResponseRecord>>(records: &[R], item: usize) -> Result<f64> {
    match observed_categories(records, item) {
        0 => Err(PsychometricError::insufficient("guessing", 1, records.len())),
        k => Ok(1.0 / k as f64),
    }
}

/// Estimate proxy 3PL parameters for every item, in item order.
///
/// `responses` may be any subset of a data set's records; the same key is
/// applied to all of them. Fails with `ShapeMismatch` on misaligned records
/// and `InsufficientData` for an empty subset. With a single examinee `a` is
/// marked insufficient and `b`, `c` are still reported.
pub fn estimate_irt<R: Borrow<ResponseRecord>>(
    key: &AnswerKey,
    responses: &[R],
) -> Result<Vec<IrtItemParameters>> {
    check_shape(key, responses)?;
    tracing::debug!(
        items = key.len(),
        examinees = responses.len(),
        "estimating proxy 3PL parameters"
    );

    key.items()
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let categories_observed = observed_categories(responses, i);
            Ok(IrtItemParameters {
                item: item.id().to_string(),
                discrimination: Estimate::or_insufficient(item_total_correlation(key, responses, i))?,
                difficulty: difficulty(key, responses, i)?,
                guessing: guessing(responses, i)?,
                categories_observed,
            })
        })
        .collect()
}

/// Item characteristic curve: `c + (1 - c) / (1 + exp(-a (theta - b)))`.
///
/// Large `|a|` saturates to `c` or `1` through IEEE-754 overflow of `exp`.
pub fn icc(theta: f64, a: f64, b: f64, c: f64) -> f64 {
    c + (1.0 - c) / (1.0 + (-a * (theta - b)).exp())
}

/// Evenly spaced ability grid with inclusive endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThetaGrid {
    pub min: f64,
    pub max: f64,
    pub points: usize,
}

impl Default for ThetaGrid {
    fn default() -> Self {
        Self {
            min: -3.0,
            max: 3.0,
            points: 100,
        }
    }
}

impl ThetaGrid {
    pub fn values(&self) -> Vec<f64> {
        match self.points {
            0 => Vec::new(),
            1 => vec![self.min],
            n => {
                let step = (self.max - self.min) / (n - 1) as f64;
                (0..n)
                    .map(|i| if i == n - 1 { self.max } else { self.min + step * i as f64 })
                    .collect()
            }
        }
    }
}

/// One sampled point of an item characteristic curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IccPoint {
    pub theta: f64,
    pub probability: f64,
}

/// Sample the item's characteristic curve over `grid`.
pub fn icc_curve(params: &IrtItemParameters, grid: &ThetaGrid) -> Vec<IccPoint> {
    grid.values()
        .into_iter()
        .map(|theta| IccPoint {
            theta,
            probability: params.probability(theta),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, ResponseMatrix};

    fn sample() -> ResponseMatrix {
        ResponseMatrix::from_rows(
            ["A", "B", "A", "A"],
            [
                ["A", "B", "A", "B"],
                ["A", "A", "A", "A"],
                ["B", "B", "B", "A"],
                ["A", "B", "A", "A"],
            ],
        )
        .unwrap()
    }

    #[test]
    fn icc_is_half_at_difficulty() {
        for a in [0.3, 1.0, -2.0, 50.0] {
            assert_eq!(icc(0.7, a, 0.7, 0.0), 0.5);
        }
    }

    #[test]
    fn icc_saturates_for_large_discrimination() {
        assert_eq!(icc(1.0, 1e6, 0.0, 0.2), 1.0);
        assert_eq!(icc(-1.0, 1e6, 0.0, 0.2), 0.2);
        assert!(icc(-1.0, f64::MAX, 0.0, 0.25).is_finite());
    }

    #[test]
    fn icc_lower_asymptote_is_guessing() {
        let p = icc(-3.0, 1.5, 0.5, 0.25);
        assert!(p > 0.25 && p < 0.3);
    }

    #[test]
    fn guessing_is_reciprocal_of_observed_categories() {
        let m = sample();
        let params = estimate_irt(m.key(), m.records()).unwrap();
        // item 1 sees {A, B}
        assert_eq!(params[0].guessing, 0.5);
        assert_eq!(params[0].categories_observed, 2);

        let uniform = ResponseMatrix::from_rows(["A"], [["C"], ["C"], ["C"]]).unwrap();
        let params = estimate_irt(uniform.key(), uniform.records()).unwrap();
        assert_eq!(params[0].guessing, 1.0);
    }

    #[test]
    fn missing_counts_as_a_category() {
        let key = AnswerKey::from_categories(["A"]);
        let records = vec![
            ResponseRecord::new("1", vec![Some(Category::from("A"))]),
            ResponseRecord::new("2", vec![None]),
            ResponseRecord::new("3", vec![None]),
        ];
        assert_eq!(observed_categories(&records, 0), 2);
        assert_eq!(guessing(&records, 0).unwrap(), 0.5);
    }

    #[test]
    fn parameters_reuse_ctt_estimators() {
        let m = sample();
        let ctt = crate::ctt::estimate_ctt(&m).unwrap();
        let irt = estimate_irt(m.key(), m.records()).unwrap();
        for (c, i) in ctt.iter().zip(&irt) {
            assert_eq!(c.difficulty, i.difficulty);
            assert_eq!(c.reliability_proxy, i.discrimination);
        }
    }

    #[test]
    fn works_on_borrowed_subsets() {
        let m = sample();
        let subset: Vec<&ResponseRecord> = m.records().iter().take(2).collect();
        let params = estimate_irt(m.key(), &subset).unwrap();
        assert_eq!(params[0].difficulty, 1.0);
    }

    #[test]
    fn single_examinee_leaves_discrimination_undefined() {
        let m = sample();
        let params = estimate_irt(m.key(), &m.records()[2..3]).unwrap();
        assert!(params[0].discrimination.is_insufficient());
        assert_eq!(params[0].difficulty, 0.0);
        assert_eq!(params[1].difficulty, 1.0);
        assert_eq!(params[0].guessing, 1.0);

        let none: Vec<&ResponseRecord> = Vec::new();
        let err = estimate_irt(m.key(), &none).unwrap_err();
        assert!(matches!(err, PsychometricError::InsufficientData { found: 0, .. }));
    }

    #[test]
    fn rejects_misaligned_records() {
        let key = AnswerKey::from_categories(["A", "B"]);
        let records = vec![ResponseRecord::new("1", vec![Some(Category::from("A"))])];
        let err = estimate_irt(&key, &records).unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn theta_grid_is_inclusive() {
        let values = ThetaGrid::default().values();
        assert_eq!(values.len(), 100);
        assert_eq!(values[0], -3.0);
        assert_eq!(values[99], 3.0);

        let grid = ThetaGrid {
            min: 0.0,
            max: 1.0,
            points: 3,
        };
        assert_eq!(grid.values(), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn curve_follows_parameters() {
        let m = sample();
        let params = estimate_irt(m.key(), m.records()).unwrap();
        let curve = icc_curve(&params[3], &ThetaGrid::default());
        assert_eq!(curve.len(), 100);
        for point in &curve {
            assert!(point.probability >= params[3].guessing - 1e-12);
            assert!(point.probability <= 1.0 + 1e-12);
        }
    }
}
