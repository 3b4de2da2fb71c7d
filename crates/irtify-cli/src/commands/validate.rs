//! The `irtify validate` command.

use std::path::PathBuf;

use anyhow::Result;

use crate::dataset::{load_datasets, validate_dataset};

pub fn execute(dataset_path: PathBuf) -> Result<()> {
    let sets = load_datasets(&dataset_path)?;
    anyhow::ensure!(!sets.is_empty(), "no data sets found in {}", dataset_path.display());

    let mut total_warnings = 0;

    for set in &sets {
        println!(
            "Data set: {} ({} items, {} examinees)",
            set.name,
            set.items.len(),
            set.examinees.len()
        );
        if !set.description.is_empty() {
            println!("  {}", set.description);
        }

        let warnings = validate_dataset(set);
        for w in &warnings {
            let prefix = w
                .subject
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All data sets valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
