//! The `irtify dif` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, Table};

use irtify_core::dif::{analyze_dif_with, DifOptions};

use super::load_matrix;
use crate::config::load_config_from;

pub fn execute(
    dataset_path: PathBuf,
    significance_level: Option<f64>,
    reference: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let significance_level = significance_level.unwrap_or(config.significance_level);
    anyhow::ensure!(
        significance_level > 0.0 && significance_level < 1.0,
        "significance level must be between 0 and 1 (exclusive)"
    );

    let (dataset, matrix) = load_matrix(&dataset_path)?;
    let groups = dataset
        .groups()
        .with_context(|| format!("data set '{}' does not assign a group to every examinee", dataset.id))?;

    let options = DifOptions {
        significance_level,
        reference_group: reference,
    };
    let report = analyze_dif_with(&matrix, &groups, &options)?;

    println!(
        "DIF: {} (n={}) vs {} (n={}), flagged at p < {}",
        report.groups[0], report.group_sizes[0], report.groups[1], report.group_sizes[1], significance_level
    );

    let mut table = Table::new();
    table.set_header(vec!["Item", "Δa", "Δb", "Δc", "χ²", "p", "DIF"]);
    for r in &report.items {
        let flag = if r.dif_detected {
            Cell::new("yes").fg(Color::Red)
        } else {
            Cell::new("no")
        };
        table.add_row(vec![
            Cell::new(&r.item),
            Cell::new(format!("{:+.3}", r.delta.discrimination)),
            Cell::new(format!("{:+.3}", r.delta.difficulty)),
            Cell::new(format!("{:+.3}", r.delta.guessing)),
            Cell::new(format!("{:.4}", r.chi2)),
            Cell::new(format!("{:.4}", r.p_value)),
            flag,
        ]);
    }
    println!("{table}");

    let flagged = report.flagged().count();
    println!("{flagged} of {} item(s) flagged.", report.items.len());

    Ok(())
}
