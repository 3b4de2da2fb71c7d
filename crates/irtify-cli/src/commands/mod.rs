//! Subcommand implementations.

pub mod ctt;
pub mod dif;
pub mod icc;
pub mod init;
pub mod irt;
pub mod report;
pub mod scores;
pub mod validate;

use std::path::Path;

use anyhow::Result;
use irtify_core::model::ResponseMatrix;

use crate::dataset::{parse_dataset, Dataset};

/// Load one data set file and build its response matrix.
pub(crate) fn load_matrix(path: &Path) -> Result<(Dataset, ResponseMatrix)> {
    anyhow::ensure!(
        !path.is_dir(),
        "{} is a directory; this command takes a single data set file",
        path.display()
    );
    let dataset = parse_dataset(path)?;
    let matrix = dataset.to_matrix()?;
    tracing::debug!(
        dataset = %dataset.id,
        items = matrix.item_count(),
        examinees = matrix.examinee_count(),
        "loaded data set"
    );
    Ok((dataset, matrix))
}
