//! Whole-data-set analysis.
//!
//! Runs every estimator over one response matrix and collects the results.
//! Structural errors abort the analysis. A DIF run that lacks data is recorded
//! in [`Analysis::dif_error`], and zero-variance or undersized statistics are
//! reported in-band; neither aborts the rest.

use serde::{Deserialize, Serialize};

use crate::ctt::{estimate_ctt, option_distribution, ItemMetrics, OptionDistribution};
use crate::dif::{analyze_dif_with, DifOptions, DifReport};
use crate::error::Result;
use crate::irt::{estimate_irt, IrtItemParameters};
use crate::model::ResponseMatrix;
use crate::scores::{compute_scores, Score};
use crate::topics::{difficulty_by_topic, student_mastery, StudentMastery, TopicDifficulty, TopicMap};

/// Optional inputs and settings for [`analyze`].
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest<'a> {
    /// Group label per examinee; DIF runs only when present.
    pub groups: Option<&'a [String]>,
    /// Item → topic labels; topic tables are built only when present.
    pub topics: Option<&'a TopicMap>,
    pub dif: DifOptions,
}

/// Everything the engine derives from one data set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub scores: Vec<Score>,
    pub ctt: Vec<ItemMetrics>,
    pub options: Vec<OptionDistribution>,
    pub irt: Vec<IrtItemParameters>,
    #[serde(default)]
    pub dif: Option<DifReport>,
    /// Why DIF was requested but not computed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dif_error: Option<String>,
    #[serde(default)]
    pub topic_difficulty: Vec<TopicDifficulty>,
    #[serde(default)]
    pub mastery: Vec<StudentMastery>,
}

impl Analysis {
    /// Items whose correlation-based statistics were degenerate.
    pub fn degenerate_items(&self) -> Vec<&str> {
        self.irt
            .iter()
            .filter(|p| p.discrimination.is_degenerate())
            .map(|p| p.item.as_str())
            .collect()
    }

    /// Items whose correlation-based statistics needed more examinees.
    pub fn insufficient_items(&self) -> Vec<&str> {
        self.irt
            .iter()
            .filter(|p| p.discrimination.is_insufficient())
            .map(|p| p.item.as_str())
            .collect()
    }
}

/// Analyze a response matrix.
pub fn analyze(matrix: &ResponseMatrix, request: &AnalysisRequest<'_>) -> Result<Analysis> {
    tracing::info!(
        items = matrix.item_count(),
        examinees = matrix.examinee_count(),
        "starting analysis"
    );

    let scores = compute_scores(matrix);
    let ctt = estimate_ctt(matrix)?;
    let options = option_distribution(matrix);
    let irt = estimate_irt(matrix.key(), matrix.records())?;

    let (dif, dif_error) = match request.groups.map(|g| analyze_dif_with(matrix, g, &request.dif)) {
        Some(Ok(report)) => (Some(report), None),
        Some(Err(e)) if e.is_structural() => return Err(e),
        Some(Err(e)) => {
            tracing::warn!(error = %e, "DIF not computed");
            (None, Some(e.to_string()))
        }
        None => (None, None),
    };

    let (topic_difficulty, mastery) = match request.topics {
        Some(topics) if !topics.is_empty() => (
            difficulty_by_topic(&ctt, topics),
            student_mastery(matrix, topics),
        ),
        _ => (Vec::new(), Vec::new()),
    };

    let analysis = Analysis {
        scores,
        ctt,
        options,
        irt,
        dif,
        dif_error,
        topic_difficulty,
        mastery,
    };

    for item in analysis.degenerate_items() {
        tracing::warn!(item, "item has zero variance; discrimination reported as 0");
    }
    let insufficient = analysis.insufficient_items();
    if !insufficient.is_empty() {
        tracing::warn!(items = insufficient.len(), "too few examinees for item-total correlations");
    }

    Ok(analysis)
}
