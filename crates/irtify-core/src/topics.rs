//! Topic cross-tabulation.
//!
//! Topic labels come from an external collaborator; this module only joins
//! them against item statistics and examinee responses.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ctt::ItemMetrics;
use crate::model::ResponseMatrix;
use crate::statistics::mean;

/// Item label → topic labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicMap {
    topics: HashMap<String, Vec<String>>,
}

impl TopicMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag `item` with `topics`. Labels are trimmed, blanks and repeats dropped.
    pub fn insert<I, S>(&mut self, item: impl Into<String>, topics: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entry = self.topics.entry(item.into()).or_default();
        for topic in topics {
            let topic = topic.as_ref().trim();
            if !topic.is_empty() && !entry.iter().any(|t| t == topic) {
                entry.push(topic.to_string());
            }
        }
    }

    pub fn topics_for(&self, item: &str) -> &[String] {
        self.topics.get(item).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.topics.values().all(Vec::is_empty)
    }
}

/// Mean difficulty of the items tagged with one topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicDifficulty {
    pub topic: String,
    pub items: Vec<String>,
    pub mean_difficulty: f64,
}

/// Cross-tabulate item difficulty against topics, topics in first-seen order.
pub fn difficulty_by_topic(metrics: &[ItemMetrics], topics: &TopicMap) -> Vec<TopicDifficulty> {
    let mut order: Vec<&str> = Vec::new();
    let mut grouped: HashMap<&str, (Vec<String>, Vec<f64>)> = HashMap::new();

    for m in metrics {
        for topic in topics.topics_for(&m.item) {
            let slot = grouped.entry(topic.as_str()).or_insert_with(|| {
                order.push(topic.as_str());
                (Vec::new(), Vec::new())
            });
            slot.0.push(m.item.clone());
            slot.1.push(m.difficulty);
        }
    }

    order
        .into_iter()
        .filter_map(|topic| {
            let (items, difficulties) = grouped.remove(topic)?;
            Some(TopicDifficulty {
                topic: topic.to_string(),
                items,
                mean_difficulty: mean(&difficulties)?,
            })
        })
        .collect()
}

/// Topics an examinee has shown and topics still to study.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentMastery {
    pub examinee: String,
    /// Topics with at least one correctly answered item.
    pub mastered: Vec<String>,
    /// Topics with at least one incorrectly answered item.
    pub needs_study: Vec<String>,
}

/// Per-examinee topic mastery. A topic may appear in both lists.
pub fn student_mastery(matrix: &ResponseMatrix, topics: &TopicMap) -> Vec<StudentMastery> {
    let key = matrix.key();
    matrix
        .records()
        .iter()
        .map(|record| {
            let mut mastered: Vec<String> = Vec::new();
            let mut needs_study: Vec<String> = Vec::new();
            for (i, item) in key.items().iter().enumerate() {
                let target = if record.is_correct(i, item.key()) {
                    &mut mastered
                } else {
                    &mut needs_study
                };
                for topic in topics.topics_for(item.id()) {
                    if !target.contains(topic) {
                        target.push(topic.clone());
                    }
                }
            }
            StudentMastery {
                examinee: record.id().to_string(),
                mastered,
                needs_study,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ctt::estimate_ctt;

    fn sample() -> (ResponseMatrix, TopicMap) {
        let m = ResponseMatrix::from_rows(
            ["A", "B", "A"],
            [["A", "B", "C"], ["A", "C", "A"], ["B", "B", "A"]],
        )
        .unwrap();
        let mut topics = TopicMap::new();
        topics.insert("1", ["Algebra", " Fractions "]);
        topics.insert("2", ["Geometry"]);
        topics.insert("3", ["Algebra", "Algebra", ""]);
        (m, topics)
    }

    #[test]
    fn insert_normalizes_labels() {
        let (_, topics) = sample();
        assert_eq!(topics.topics_for("1"), ["Algebra", "Fractions"]);
        assert_eq!(topics.topics_for("3"), ["Algebra"]);
        assert!(topics.topics_for("missing").is_empty());
        assert!(!topics.is_empty());
        assert!(TopicMap::new().is_empty());
    }

    #[test]
    fn difficulty_cross_tab() {
        let (m, topics) = sample();
        let metrics = estimate_ctt(&m).unwrap();
        let table = difficulty_by_topic(&metrics, &topics);

        let names: Vec<&str> = table.iter().map(|t| t.topic.as_str()).collect();
        assert_eq!(names, vec!["Algebra", "Fractions", "Geometry"]);

        let algebra = &table[0];
        assert_eq!(algebra.items, vec!["1", "3"]);
        // item 1: 2/3 correct, item 3: 2/3 correct
        assert!((algebra.mean_difficulty - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn mastery_splits_topics_by_correctness() {
        let (m, topics) = sample();
        let report = student_mastery(&m, &topics);
        assert_eq!(report.len(), 3);

        // examinee 1: items 1 and 2 right, item 3 wrong
        assert_eq!(report[0].mastered, vec!["Algebra", "Fractions", "Geometry"]);
        assert_eq!(report[0].needs_study, vec!["Algebra"]);

        // examinee 2: items 1 and 3 right, item 2 wrong
        assert_eq!(report[1].mastered, vec!["Algebra", "Fractions"]);
        assert_eq!(report[1].needs_study, vec!["Geometry"]);
    }

    #[test]
    fn untagged_items_are_ignored() {
        let (m, _) = sample();
        let metrics = estimate_ctt(&m).unwrap();
        assert!(difficulty_by_topic(&metrics, &TopicMap::new()).is_empty());
        for mastery in student_mastery(&m, &TopicMap::new()) {
            assert!(mastery.mastered.is_empty());
            assert!(mastery.needs_study.is_empty());
        }
    }
}
