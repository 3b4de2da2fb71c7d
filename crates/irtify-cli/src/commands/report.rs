//! The `irtify report` command.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use comfy_table::{Cell, Table};

use irtify_core::dif::DifOptions;
use irtify_core::engine::{analyze, AnalysisRequest};
use irtify_report::html::write_html_report;
use irtify_report::report::{fmt_estimate, mean_score, AnalysisReport};

use crate::config::load_config_from;
use crate::dataset::load_datasets;

pub fn execute(
    dataset_path: PathBuf,
    output: Option<PathBuf>,
    format: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let output = output.unwrap_or_else(|| config.output_dir.clone());
    let format = format.unwrap_or_else(|| config.format.clone());

    let formats: Vec<&str> = if format == "all" {
        vec!["json", "html", "markdown"]
    } else {
        format.split(',').map(str::trim).collect()
    };
    for fmt in &formats {
        anyhow::ensure!(
            matches!(*fmt, "json" | "html" | "markdown" | "md"),
            "unknown format: '{fmt}' (expected json, html, markdown, or all)"
        );
    }

    let datasets = load_datasets(&dataset_path)?;
    anyhow::ensure!(!datasets.is_empty(), "no data sets found in {}", dataset_path.display());

    for dataset in &datasets {
        eprintln!(
            "irtify v{} - Analyzing {} items x {} examinees ({})",
            env!("CARGO_PKG_VERSION"),
            dataset.items.len(),
            dataset.examinees.len(),
            dataset.name
        );

        let start = Instant::now();
        let matrix = dataset.to_matrix()?;
        let groups = dataset.groups();
        let topics = dataset.topic_map();
        let request = AnalysisRequest {
            groups: groups.as_deref(),
            topics: Some(&topics),
            dif: DifOptions {
                significance_level: config.significance_level,
                reference_group: None,
            },
        };
        let analysis = analyze(&matrix, &request)?;
        let duration_ms = start.elapsed().as_millis() as u64;

        let report = AnalysisReport::new(dataset.summary(), analysis, config.theta_grid(), duration_ms);
        print_summary(&report);

        std::fs::create_dir_all(&output)?;
        let stem = format!("{}-{}", dataset.id, chrono::Utc::now().format("%Y-%m-%dT%H%M%S"));

        for fmt in &formats {
            match *fmt {
                "json" => {
                    let path = output.join(format!("{stem}.json"));
                    report.save_json(&path)?;
                    eprintln!("Results saved to: {}", path.display());
                }
                "html" => {
                    let path = output.join(format!("{stem}.html"));
                    write_html_report(&report, &path)?;
                    eprintln!("HTML report: {}", path.display());
                }
                _ => {
                    let path = output.join(format!("{stem}.md"));
                    std::fs::write(&path, report.to_markdown())?;
                    eprintln!("Markdown report: {}", path.display());
                }
            }
        }
    }

    Ok(())
}

fn print_summary(report: &AnalysisReport) {
    let a = &report.analysis;

    let mut table = Table::new();
    table.set_header(vec!["Item", "Difficulty", "Discrimination", "a", "b", "c", "DIF"]);

    for (ctt, irt) in a.ctt.iter().zip(&a.irt) {
        let dif = a
            .dif
            .as_ref()
            .and_then(|d| d.items.iter().find(|r| r.item == ctt.item))
            .map(|r| if r.dif_detected { "yes" } else { "no" })
            .unwrap_or("-");
        table.add_row(vec![
            Cell::new(&ctt.item),
            Cell::new(format!("{:.3}", ctt.difficulty)),
            Cell::new(fmt_estimate(&ctt.discrimination)),
            Cell::new(fmt_estimate(&irt.discrimination)),
            Cell::new(format!("{:.3}", irt.difficulty)),
            Cell::new(format!("{:.3}", irt.guessing)),
            Cell::new(dif),
        ]);
    }

    eprintln!("\nMean score: {:.2}", mean_score(a));
    eprintln!("{table}");
    if let Some(reason) = &a.dif_error {
        eprintln!("DIF not computed: {reason}");
    }
}
