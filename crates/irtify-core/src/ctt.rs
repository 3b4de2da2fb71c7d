//! Classical Test Theory item statistics.
//!
//! Difficulty is the proportion correct. Discrimination is the upper-minus-lower
//! proportion correct with the median score as the split point. The
//! reliability proxy is the item-total Pearson correlation, which the IRT
//! estimator reuses as its `a` parameter.

use std::borrow::Borrow;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{PsychometricError, Result};
use crate::model::{AnswerKey, Category, ResponseMatrix, ResponseRecord};
use crate::scores::{item_indicator, total_scores};
use crate::statistics::{median, pearson, Estimate};

/// CTT statistics for a single item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemMetrics {
    /// Item label.
    pub item: String,
    /// Proportion of examinees answering correctly, in `[0, 1]`.
    pub difficulty: f64,
    /// Upper-group minus lower-group proportion correct, in `[-1, 1]`.
    pub discrimination: Estimate,
    /// Item-total correlation, in `[-1, 1]`.
    pub reliability_proxy: Estimate,
}

/// Proportion of examinees whose response to `item` equals the key.
pub fn difficulty<R: Borrow<ResponseRecord>>(key: &AnswerKey, records: &[R], item: usize) -> Result<f64> {
    if records.is_empty() {
        return Err(PsychometricError::insufficient("difficulty", 1, 0));
    }
    let indicator = item_indicator(key, records, item);
    Ok(indicator.iter().sum::<f64>() / records.len() as f64)
}

/// Upper/lower discrimination index.
///
/// Examinees scoring at or above the median total form the upper group, the
/// rest the lower group, so group sizes differ when scores tie at the median.
/// An empty lower group yields a degenerate zero. Needs two examinees.
pub fn discrimination<R: Borrow<ResponseRecord>>(
    key: &AnswerKey,
    records: &[R],
    item: usize,
) -> Result<Estimate> {
    if records.len() < 2 {
        return Err(PsychometricError::insufficient("discrimination", 2, records.len()));
    }
    let totals = total_scores(key, records);
    let Some(split) = median(&totals) else {
        return Err(PsychometricError::insufficient("discrimination", 2, 0));
    };
    let indicator = item_indicator(key, records, item);

    let (mut upper_n, mut lower_n) = (0usize, 0usize);
    let (mut upper_correct, mut lower_correct) = (0.0f64, 0.0f64);
    for (&score, &correct) in totals.iter().zip(&indicator) {
        if score >= split {
            upper_n += 1;
            upper_correct += correct;
        } else {
            lower_n += 1;
            lower_correct += correct;
        }
    }

    if upper_n == 0 || lower_n == 0 {
        return Ok(Estimate::degenerate());
    }
    let d = upper_correct / upper_n as f64 - lower_correct / lower_n as f64;
    Ok(Estimate::computed(d))
}

/// Pearson correlation between the item's 0/1 indicator and the total score.
///
/// Reported as the CTT reliability proxy and as the IRT discrimination.
pub fn item_total_correlation<R: Borrow<ResponseRecord>>(
    key: &AnswerKey,
    records: &[R],
    item: usize,
) -> Result<Estimate> {
    let totals = total_scores(key, records);
    let indicator = item_indicator(key, records, item);
    pearson(&indicator, &totals).map_err(|e| match e {
        PsychometricError::InsufficientData { required, found, .. } => {
            PsychometricError::insufficient("item-total correlation", required, found)
        }
        other => other,
    })
}

/// Compute CTT metrics for every item, in item order.
///
/// Fails only for an empty matrix. With a single examinee the difficulty is
/// still reported and both split statistics are marked insufficient.
pub fn estimate_ctt(matrix: &ResponseMatrix) -> Result<Vec<ItemMetrics>> {
    let key = matrix.key();
    let records = matrix.records();
    tracing::debug!(
        items = key.len(),
        examinees = records.len(),
        "estimating CTT item statistics"
    );

    key.items()
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let metrics = ItemMetrics {
                item: item.id().to_string(),
                difficulty: difficulty(key, records, i)?,
                discrimination: Estimate::or_insufficient(discrimination(key, records, i))?,
                reliability_proxy: Estimate::or_insufficient(item_total_correlation(key, records, i))?,
            };
            if metrics.reliability_proxy.is_degenerate() {
                tracing::debug!(item = item.id(), "zero-variance item-total correlation");
            }
            Ok(metrics)
        })
        .collect()
}

/// Response counts for one item over the data set's full category axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionDistribution {
    pub item: String,
    pub key: Category,
    /// One entry per category observed anywhere in the data set, sorted.
    pub counts: Vec<OptionCount>,
    /// Number of examinees who gave no response.
    pub missing: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionCount {
    pub category: Category,
    pub count: usize,
    pub is_key: bool,
}

/// Per-item answer histograms. Categories never chosen for an item still
/// appear with a zero count.
pub fn option_distribution(matrix: &ResponseMatrix) -> Vec<OptionDistribution> {
    let all_options: BTreeSet<&Category> = matrix
        .records()
        .iter()
        .flat_map(|r| r.responses().iter().flatten())
        .collect();

    matrix
        .key()
        .items()
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let mut missing = 0usize;
            let mut counts: Vec<OptionCount> = all_options
                .iter()
                .map(|&category| OptionCount {
                    category: category.clone(),
                    count: 0,
                    is_key: category == item.key(),
                })
                .collect();

            for record in matrix.records() {
                match record.response(i) {
                    Some(Some(answer)) => {
                        if let Some(slot) = counts.iter_mut().find(|c| &c.category == answer) {
                            slot.count += 1;
                        }
                    }
                    _ => missing += 1,
                }
            }

            OptionDistribution {
                item: item.id().to_string(),
                key: item.key().clone(),
                counts,
                missing,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::EstimateStatus;

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
    fn difficulty_matches_worked_example() {
        let metrics = estimate_ctt(&sample()).unwrap();
        assert_eq!(metrics[0].difficulty, 0.75);
        assert_eq!(metrics[2].difficulty, 0.75);
        assert_eq!(metrics.len(), 4);
    }

    #[test]
    fn difficulty_bounds() {
        let m = ResponseMatrix::from_rows(["A", "B"], [["A", "C"], ["A", "D"], ["A", "C"]]).unwrap();
        let metrics = estimate_ctt(&m).unwrap();
        assert_eq!(metrics[0].difficulty, 1.0);
        assert_eq!(metrics[1].difficulty, 0.0);
    }

    #[test]
    fn median_split_discrimination() {
        // scores [3, 3, 2, 4] -> median 3; upper = {0, 1, 3}, lower = {2}
        let m = sample();
        let d = discrimination(m.key(), m.records(), 0).unwrap();
        assert_eq!(d.status, EstimateStatus::Computed);
        assert!((d.value - 1.0).abs() < 1e-12);

        // item 4: upper correct {1, 3} of 3, lower correct {2} of 1
        let d = discrimination(m.key(), m.records(), 3).unwrap();
        assert!((d.value - (2.0 / 3.0 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn identical_scores_give_zero_discrimination() {
        let m = ResponseMatrix::from_rows(["A", "B"], [["A", "C"], ["C", "B"], ["A", "D"]]).unwrap();
        for metrics in estimate_ctt(&m).unwrap() {
            assert_eq!(metrics.discrimination.value, 0.0);
            assert!(metrics.discrimination.is_degenerate());
            assert_eq!(metrics.reliability_proxy.value, 0.0);
            assert!(metrics.reliability_proxy.is_degenerate());
        }
    }

    #[test]
    fn statistics_stay_in_range() {
        for metrics in estimate_ctt(&sample()).unwrap() {
            assert!((0.0..=1.0).contains(&metrics.difficulty));
            assert!((-1.0..=1.0).contains(&metrics.discrimination.value));
            assert!((-1.0..=1.0).contains(&metrics.reliability_proxy.value));
        }
    }

    #[test]
    fn no_examinees_is_insufficient() {
        let m = ResponseMatrix::new(AnswerKey::from_categories(["A"]), vec![]).unwrap();
        let err = estimate_ctt(&m).unwrap_err();
        assert!(matches!(err, PsychometricError::InsufficientData { found: 0, .. }));
    }

    #[test]
    fn single_examinee_keeps_difficulty() {
        let m = ResponseMatrix::from_rows(["A", "B"], [["A", "C"]]).unwrap();
        let metrics = estimate_ctt(&m).unwrap();
        assert_eq!(metrics[0].difficulty, 1.0);
        assert_eq!(metrics[1].difficulty, 0.0);
        for item in &metrics {
            assert_eq!(item.discrimination.status, EstimateStatus::Insufficient);
            assert_eq!(item.reliability_proxy.status, EstimateStatus::Insufficient);
            assert_eq!(item.reliability_proxy.value, 0.0);
        }

        let err = item_total_correlation(m.key(), m.records(), 0).unwrap_err();
        assert!(matches!(
            err,
            PsychometricError::InsufficientData { required: 2, found: 1, .. }
        ));
    }

    #[test]
    fn option_distribution_zero_fills_categories() {
        let dist = option_distribution(&sample());
        let first = &dist[0];
        assert_eq!(first.key, Category::from("A"));
        let counts: Vec<(&str, usize, bool)> = first
            .counts
            .iter()
            .map(|c| (c.category.as_str(), c.count, c.is_key))
            .collect();
        assert_eq!(counts, vec![("A", 3, true), ("B", 1, false)]);
        assert_eq!(first.missing, 0);
    }

    #[test]
    fn option_distribution_counts_missing() {
        let key = AnswerKey::from_categories(["A"]);
        let m = ResponseMatrix::new(
            key,
            vec![
                ResponseRecord::new("1", vec![None]),
                ResponseRecord::new("2", vec![Some("C".into())]),
            ],
        )
        .unwrap();
        let dist = option_distribution(&m);
        assert_eq!(dist[0].missing, 1);
        assert_eq!(dist[0].counts.len(), 1);
        assert!(!dist[0].counts[0].is_key);
    }
}
