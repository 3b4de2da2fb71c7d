//! The `irtify icc` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use irtify_core::icc;

use crate::config::load_config_from;

pub fn execute(a: f64, b: f64, c: f64, theta: Option<f64>, config_path: Option<PathBuf>) -> Result<()> {
    anyhow::ensure!(
        (0.0..1.0).contains(&c),
        "guessing parameter c must be in [0, 1), got {c}"
    );

    if let Some(theta) = theta {
        println!("{:.6}", icc(theta, a, b, c));
        return Ok(());
    }

    let grid = load_config_from(config_path.as_deref())?.theta_grid();
    let mut table = Table::new();
    table.set_header(vec!["theta", "P(correct)"]);
    for theta in grid.values() {
        table.add_row(vec![
            Cell::new(format!("{theta:.3}")),
            Cell::new(format!("{:.4}", icc(theta, a, b, c))),
        ]);
    }
    println!("{table}");

    Ok(())
}
