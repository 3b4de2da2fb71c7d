//! Differential Item Functioning between two examinee groups.
//!
//! Each group is calibrated separately with [`estimate_irt`] against the same
//! answer key. Per item, the parameter differences are combined into
//! `chi2 = Δa² + Δb² + Δc²` and tested against a chi-square distribution with
//! three degrees of freedom.
//!
//! Both groups need at least two examinees, otherwise no item's correlation
//! is defined and the run fails with `InsufficientData`.

use serde::{Deserialize, Serialize};

use crate::error::{PsychometricError, Result};
use crate::irt::{estimate_irt, IrtItemParameters};
use crate::model::{ResponseMatrix, ResponseRecord};
use crate::statistics::chi_square_sf;

/// Default significance level for flagging an item.
pub const DEFAULT_SIGNIFICANCE_LEVEL: f64 = 0.05;

/// One degree of freedom per compared parameter (`a`, `b`, `c`).
pub const DIF_DEGREES_OF_FREEDOM: f64 = 3.0;

/// Options for a DIF run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifOptions {
    /// Items with `p < significance_level` are flagged.
    pub significance_level: f64,
    /// Label to treat as group 1. Defaults to the first label encountered.
    pub reference_group: Option<String>,
}

impl Default for DifOptions {
    fn default() -> Self {
        Self {
            significance_level: DEFAULT_SIGNIFICANCE_LEVEL,
            reference_group: None,
        }
    }
}

/// Signed parameter differences, group 1 minus group 2.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterDelta {
    pub discrimination: f64,
    pub difficulty: f64,
    pub guessing: f64,
}

/// DIF outcome for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifResult {
    pub item: String,
    pub group1: IrtItemParameters,
    pub group2: IrtItemParameters,
    pub delta: ParameterDelta,
    pub chi2: f64,
    pub p_value: f64,
    pub dif_detected: bool,
}

/// Full DIF output: per-item results plus the per-group parameter tables
/// used for ICC overlays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifReport {
    /// Group labels, group 1 first.
    pub groups: [String; 2],
    /// Number of examinees in each group.
    pub group_sizes: [usize; 2],
    pub significance_level: f64,
    pub items: Vec<DifResult>,
    pub group1_parameters: Vec<IrtItemParameters>,
    pub group2_parameters: Vec<IrtItemParameters>,
}

impl DifReport {
    /// Items flagged as functioning differently.
    pub fn flagged(&self) -> impl Iterator<Item = &DifResult> {
        self.items.iter().filter(|r| r.dif_detected)
    }
}

/// Run DIF with the default options.
pub fn analyze_dif<G: AsRef<str>>(matrix: &ResponseMatrix, groups: &[G]) -> Result<DifReport> {
    analyze_dif_with(matrix, groups, &DifOptions::default())
}

/// Run DIF, assigning examinee `i` to `groups[i]`.
pub fn analyze_dif_with<G: AsRef<str>>(
    matrix: &ResponseMatrix,
    groups: &[G],
    options: &DifOptions,
) -> Result<DifReport> {
    if groups.len() != matrix.examinee_count() {
        return Err(PsychometricError::ShapeMismatch {
            what: "grouping vector".into(),
            expected: matrix.examinee_count(),
            found: groups.len(),
        });
    }

    let groups: Vec<&str> = groups.iter().map(AsRef::as_ref).collect();
    let mut labels: Vec<&str> = Vec::new();
    for &g in &groups {
        if !labels.contains(&g) {
            labels.push(g);
        }
    }
    if labels.len() != 2 {
        return Err(PsychometricError::InvalidGroupCount {
            found: labels.len(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
        });
    }

    if let Some(reference) = &options.reference_group {
        match labels.iter().position(|&l| l == reference.as_str()) {
            Some(0) => {}
            Some(_) => labels.swap(0, 1),
            None => {
                return Err(PsychometricError::UnknownGroup {
                    requested: reference.clone(),
                    available: labels.iter().map(|l| l.to_string()).collect(),
                })
            }
        }
    }
    let (label1, label2) = (labels[0], labels[1]);

    let partition = |label: &str| -> Vec<&ResponseRecord> {
        matrix
            .records()
            .iter()
            .zip(&groups)
            .filter(|(_, g)| **g == label)
            .map(|(r, _)| r)
            .collect()
    };
    let group1 = partition(label1);
    let group2 = partition(label2);

    tracing::info!(
        group1 = label1,
        group1_size = group1.len(),
        group2 = label2,
        group2_size = group2.len(),
        "running DIF analysis"
    );

    for (label, members) in [(label1, &group1), (label2, &group2)] {
        if members.len() < 2 {
            return Err(PsychometricError::insufficient(
                format!("item-total correlation in group '{label}'"),
                2,
                members.len(),
            ));
        }
    }

    let group1_parameters = estimate_irt(matrix.key(), &group1)?;
    let group2_parameters = estimate_irt(matrix.key(), &group2)?;

    let items: Vec<DifResult> = group1_parameters
        .iter()
        .zip(&group2_parameters)
        .map(|(p1, p2)| compare_item(p1, p2, options.significance_level))
        .collect();

    let flagged = items.iter().filter(|r| r.dif_detected).count();
    if flagged > 0 {
        tracing::info!(flagged, items = items.len(), "items flagged for DIF");
    }

    Ok(DifReport {
        groups: [label1.to_string(), label2.to_string()],
        group_sizes: [group1.len(), group2.len()],
        significance_level: options.significance_level,
        items,
        group1_parameters,
        group2_parameters,
    })
}

fn compare_item(p1: &IrtItemParameters, p2: &IrtItemParameters, significance_level: f64) -> DifResult {
    let delta = ParameterDelta {
        discrimination: p1.a() - p2.a(),
        difficulty: p1.b() - p2.b(),
        guessing: p1.c() - p2.c(),
    };
    let chi2 = delta.discrimination.powi(2) + delta.difficulty.powi(2) + delta.guessing.powi(2);
    let p_value = chi_square_sf(chi2, DIF_DEGREES_OF_FREEDOM);

    DifResult {
        item: p1.item.clone(),
        group1: p1.clone(),
        group2: p2.clone(),
        delta,
        chi2,
        p_value,
        dif_detected: p_value < significance_level,
    }
}
