//! The `irtify irt` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use irtify_core::irt::estimate_irt;
use irtify_report::report::fmt_estimate;

use super::load_matrix;

pub fn execute(dataset_path: PathBuf) -> Result<()> {
    let (dataset, matrix) = load_matrix(&dataset_path)?;
    let params = estimate_irt(matrix.key(), matrix.records())?;

    println!("Data set: {} ({} items)", dataset.name, matrix.item_count());

    let mut table = Table::new();
    table.set_header(vec!["Item", "a", "b", "c", "Categories"]);
    for p in &params {
        table.add_row(vec![
            Cell::new(&p.item),
            Cell::new(fmt_estimate(&p.discrimination)),
            Cell::new(format!("{:.3}", p.difficulty)),
            Cell::new(format!("{:.3}", p.guessing)),
            Cell::new(p.categories_observed),
        ]);
    }
    println!("{table}");

    Ok(())
}
