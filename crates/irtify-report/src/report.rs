//! Analysis report type with JSON persistence and markdown rendering.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use irtify_core::engine::Analysis;
use irtify_core::irt::ThetaGrid;
use irtify_core::statistics::{mean, Estimate};

/// A complete analysis report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Summary of the analysed data set.
    pub dataset: DatasetSummary,
    /// Ability grid used when sampling ICCs for rendering.
    pub theta_grid: ThetaGrid,
    /// Estimation results.
    pub analysis: Analysis,
    /// Wall-clock duration of the analysis in milliseconds.
    pub duration_ms: u64,
}

/// Summary of a data set (without the responses themselves).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub id: String,
    pub name: String,
    pub item_count: usize,
    pub examinee_count: usize,
}

impl AnalysisReport {
    pub fn new(dataset: DatasetSummary, analysis: Analysis, theta_grid: ThetaGrid, duration_ms: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            dataset,
            theta_grid,
            analysis,
            duration_ms,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        tracing::debug!(path = %path.display(), "wrote JSON report");
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: AnalysisReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let a = &self.analysis;
        let mut md = String::new();

        md.push_str(&format!("# {}\n\n", self.dataset.name));
        md.push_str(&format!(
            "**Summary:** {} items, {} examinees, mean score {:.2}\n\n",
            self.dataset.item_count,
            self.dataset.examinee_count,
            mean_score(a)
        ));

        md.push_str("## Classical Test Theory\n\n");
        md.push_str("| Item | Difficulty | Discrimination | Reliability proxy |\n");
        md.push_str("|------|------------|----------------|-------------------|\n");
        for m in &a.ctt {
            md.push_str(&format!(
                "| {} | {:.3} | {} | {} |\n",
                m.item,
                m.difficulty,
                fmt_estimate(&m.discrimination),
                fmt_estimate(&m.reliability_proxy)
            ));
        }
        md.push('\n');

        md.push_str("## Item Response Theory (proxy 3PL)\n\n");
        md.push_str("| Item | a | b | c |\n");
        md.push_str("|------|---|---|---|\n");
        for p in &a.irt {
            md.push_str(&format!(
                "| {} | {} | {:.3} | {:.3} |\n",
                p.item,
                fmt_estimate(&p.discrimination),
                p.difficulty,
                p.guessing
            ));
        }
        md.push('\n');

        if let Some(dif) = &a.dif {
            md.push_str(&format!(
                "## Differential Item Functioning ({} vs {})\n\n",
                dif.groups[0], dif.groups[1]
            ));
            md.push_str("| Item | Δa | Δb | Δc | χ² | p | DIF |\n");
            md.push_str("|------|----|----|----|----|---|-----|\n");
            for r in &dif.items {
                md.push_str(&format!(
                    "| {} | {:+.3} | {:+.3} | {:+.3} | {:.4} | {:.4} | {} |\n",
                    r.item,
                    r.delta.discrimination,
                    r.delta.difficulty,
                    r.delta.guessing,
                    r.chi2,
                    r.p_value,
                    if r.dif_detected { "yes" } else { "no" }
                ));
            }
            md.push('\n');
        } else if let Some(reason) = &a.dif_error {
            md.push_str("## Differential Item Functioning\n\n");
            md.push_str(&format!("Not computed: {reason}\n\n"));
        }

        if !a.topic_difficulty.is_empty() {
            md.push_str("## Difficulty by topic\n\n");
            md.push_str("| Topic | Items | Mean difficulty |\n");
            md.push_str("|-------|-------|-----------------|\n");
            for t in &a.topic_difficulty {
                md.push_str(&format!(
                    "| {} | {} | {:.3} |\n",
                    t.topic,
                    t.items.join(", "),
                    t.mean_difficulty
                ));
            }
            md.push('\n');
        }

        if !a.mastery.is_empty() {
            md.push_str("## Topic mastery\n\n");
            md.push_str("| Examinee | Mastered | Needs study |\n");
            md.push_str("|----------|----------|-------------|\n");
            for m in &a.mastery {
                md.push_str(&format!(
                    "| {} | {} | {} |\n",
                    m.examinee,
                    m.mastered.join(", "),
                    m.needs_study.join(", ")
                ));
            }
            md.push('\n');
        }

        md
    }
}

/// Mean raw score across examinees, `0.0` when there are none.
pub fn mean_score(analysis: &Analysis) -> f64 {
    let totals: Vec<f64> = analysis.scores.iter().map(|s| s.total as f64).collect();
    mean(&totals).unwrap_or(0.0)
}

/// Render an estimate, marking degenerate values and showing `n/a` for
/// statistics that had too few examinees.
pub fn fmt_estimate(estimate: &Estimate) -> String {
    if estimate.is_insufficient() {
        "n/a".to_string()
    } else if estimate.is_degenerate() {
        format!("{:.3}*", estimate.value)
    } else {
        format!("{:.3}", estimate.value)
    }
}
