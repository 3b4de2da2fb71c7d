//! The `irtify ctt` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use irtify_core::ctt::{estimate_ctt, option_distribution};
use irtify_report::report::fmt_estimate;

use super::load_matrix;

pub fn execute(dataset_path: PathBuf, show_options: bool) -> Result<()> {
    let (dataset, matrix) = load_matrix(&dataset_path)?;
    let metrics = estimate_ctt(&matrix)?;

    println!("Data set: {} ({} items)", dataset.name, matrix.item_count());

    let mut table = Table::new();
    table.set_header(vec!["Item", "Difficulty", "Discrimination", "Reliability proxy"]);
    for m in &metrics {
        table.add_row(vec![
            Cell::new(&m.item),
            Cell::new(format!("{:.3}", m.difficulty)),
            Cell::new(fmt_estimate(&m.discrimination)),
            Cell::new(fmt_estimate(&m.reliability_proxy)),
        ]);
    }
    println!("{table}");

    let degenerate = metrics
        .iter()
        .filter(|m| m.discrimination.is_degenerate() || m.reliability_proxy.is_degenerate())
        .count();
    if degenerate > 0 {
        println!("* {degenerate} item(s) with a degenerate statistic (reported as 0)");
    }
    if metrics.iter().any(|m| m.reliability_proxy.is_insufficient()) {
        println!("n/a: at least two examinees are needed for discrimination");
    }

    if show_options {
        let distributions = option_distribution(&matrix);
        let categories: Vec<String> = distributions
            .first()
            .map(|d| d.counts.iter().map(|c| c.category.to_string()).collect())
            .unwrap_or_default();

        let mut table = Table::new();
        let mut header = vec!["Item".to_string()];
        header.extend(categories);
        header.push("Missing".to_string());
        table.set_header(header);
        for d in &distributions {
            let mut cells = vec![Cell::new(&d.item)];
            cells.extend(d.counts.iter().map(|c| {
                if c.is_key {
                    Cell::new(format!("{}*", c.count))
                } else {
                    Cell::new(c.count)
                }
            }));
            cells.push(Cell::new(d.missing));
            table.add_row(cells);
        }
        println!("\nOption distribution (* = key):");
        println!("{table}");
    }

    Ok(())
}
