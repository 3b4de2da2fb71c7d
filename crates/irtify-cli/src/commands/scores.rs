//! The `irtify scores` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use irtify_core::scores::{compute_scores, correctness_matrix};

use super::load_matrix;

pub fn execute(dataset_path: PathBuf, show_matrix: bool) -> Result<()> {
    let (dataset, matrix) = load_matrix(&dataset_path)?;

    println!(
        "Data set: {} ({} items, {} examinees)",
        dataset.name,
        matrix.item_count(),
        matrix.examinee_count()
    );

    let mut table = Table::new();
    table.set_header(vec!["Examinee", "Score"]);
    for score in compute_scores(&matrix) {
        table.add_row(vec![Cell::new(&score.examinee), Cell::new(score.total)]);
    }
    println!("{table}");

    if show_matrix {
        let correctness = correctness_matrix(&matrix);
        let mut table = Table::new();
        let mut header = vec!["Examinee".to_string()];
        header.extend(correctness.items.iter().cloned());
        header.push("Total".to_string());
        table.set_header(header);
        for row in &correctness.rows {
            let mut cells = vec![Cell::new(&row.examinee)];
            cells.extend(row.correct.iter().map(Cell::new));
            cells.push(Cell::new(row.total));
            table.add_row(cells);
        }
        println!("\n{table}");
    }

    Ok(())
}
