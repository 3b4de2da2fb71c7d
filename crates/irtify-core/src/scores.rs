//! Examinee raw scores and the 0/1 correctness matrix.

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};

use crate::model::{AnswerKey, ResponseMatrix, ResponseRecord};

/// Total score of one examinee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    /// Examinee identifier.
    pub examinee: String,
    /// Number of items whose response equals the key.
    pub total: u32,
}

/// Count correct answers for every examinee, in examinee order.
pub fn compute_scores(matrix: &ResponseMatrix) -> Vec<Score> {
    matrix
        .records()
        .iter()
        .map(|record| Score {
            examinee: record.id().to_string(),
            total: record.raw_score(matrix.key()),
        })
        .collect()
}

/// Raw scores as `f64`, the ability proxy used by the estimators.
pub(crate) fn total_scores<R: Borrow<ResponseRecord>>(key: &AnswerKey, records: &[R]) -> Vec<f64> {
    records
        .iter()
        .map(|r| r.borrow().raw_score(key) as f64)
        .collect()
}

/// The item's correct/incorrect indicator across examinees.
pub(crate) fn item_indicator<R: Borrow<ResponseRecord>>(
    key: &AnswerKey,
    records: &[R],
    item: usize,
) -> Vec<f64> {
    let Some(answer) = key.key(item) else {
        return vec![0.0; records.len()];
    };
    records
        .iter()
        .map(|r| if r.borrow().is_correct(item, answer) { 1.0 } else { 0.0 })
        .collect()
}

/// Examinee × item matrix of correctness flags (1 = correct).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectnessMatrix {
    pub items: Vec<String>,
    pub rows: Vec<CorrectnessRow>,
}

/// One examinee's correctness flags plus total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectnessRow {
    pub examinee: String,
    pub correct: Vec<u8>,
    pub total: u32,
}

pub fn correctness_matrix(matrix: &ResponseMatrix) -> CorrectnessMatrix {
    let key = matrix.key();
    let rows = matrix
        .records()
        .iter()
        .map(|record| {
            let correct: Vec<u8> = key
                .items()
                .iter()
                .enumerate()
                .map(|(i, item)| u8::from(record.is_correct(i, item.key())))
                .collect();
            let total = correct.iter().map(|&c| u32::from(c)).sum();
            CorrectnessRow {
                examinee: record.id().to_string(),
                correct,
                total,
            }
        })
        .collect();

    CorrectnessMatrix {
        items: key.items().iter().map(|i| i.id().to_string()).collect(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;

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
    fn scores_match_worked_example() {
        let totals: Vec<u32> = compute_scores(&sample()).iter().map(|s| s.total).collect();
        // examinee 3 answers [B, B, B, A] against [A, B, A, A]: items 2 and 4 match
        assert_eq!(totals, vec![3, 3, 2, 4]);
    }

    #[test]
    fn scores_keep_examinee_ids() {
        let scores = compute_scores(&sample());
        assert_eq!(scores[0].examinee, "1");
        assert_eq!(scores[3].examinee, "4");
    }

    #[test]
    fn missing_responses_score_zero() {
        let key = AnswerKey::from_categories(["A", "B"]);
        let m = ResponseMatrix::new(
            key,
            vec![ResponseRecord::new("s1", vec![None, Some(Category::from("B"))])],
        )
        .unwrap();
        assert_eq!(compute_scores(&m)[0].total, 1);
    }

    #[test]
    fn correctness_rows_sum_to_scores() {
        let m = sample();
        let cm = correctness_matrix(&m);
        assert_eq!(cm.items, vec!["1", "2", "3", "4"]);
        assert_eq!(cm.rows[2].correct, vec![0, 1, 0, 1]);
        for (row, score) in cm.rows.iter().zip(compute_scores(&m)) {
            assert_eq!(row.total, score.total);
        }
    }

    #[test]
    fn empty_matrix_has_no_scores() {
        let m = ResponseMatrix::new(AnswerKey::from_categories(["A"]), vec![]).unwrap();
        assert!(compute_scores(&m).is_empty());
    }
}
