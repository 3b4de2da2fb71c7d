//! End-to-end analysis tests: run `irtify report` on a data set and check the
//! numbers in the JSON it writes.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use irtify_core::statistics::EstimateStatus;
use irtify_report::report::AnalysisReport;
use tempfile::TempDir;

fn irtify() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("irtify").unwrap()
}

/// Run a JSON report for `dataset` and load the single file it produces.
fn run_report(dataset: &Path, output: &Path) -> AnalysisReport {
    irtify()
        .arg("report")
        .arg("--dataset")
        .arg(dataset)
        .arg("--output")
        .arg(output)
        .arg("--format")
        .arg("json")
        .assert()
        .success();

    let files: Vec<PathBuf> = std::fs::read_dir(output)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(files.len(), 1, "expected one report, found {files:?}");
    AnalysisReport::load_json(&files[0]).unwrap()
}

#[test]
fn e2e_worked_example() {
    let dir = TempDir::new().unwrap();
    let report = run_report(Path::new("../../datasets/worked-example.toml"), dir.path());
    let a = &report.analysis;

    assert_eq!(report.dataset.id, "worked-example");
    assert_eq!(report.dataset.item_count, 4);
    assert_eq!(report.dataset.examinee_count, 4);

    // examinee 3 answers B,B,B,A against A,B,A,A: items 2 and 4 correct
    let totals: Vec<u32> = a.scores.iter().map(|s| s.total).collect();
    assert_eq!(totals, vec![3, 3, 2, 4]);

    assert_eq!(a.ctt[0].difficulty, 0.75);
    assert_eq!(a.ctt[2].difficulty, 0.75);
    for m in &a.ctt {
        assert!((0.0..=1.0).contains(&m.difficulty));
        assert!((-1.0..=1.0).contains(&m.discrimination.value));
        // the reliability proxy is the same estimator under a second label
        assert_eq!(a.irt.iter().find(|p| p.item == m.item).unwrap().discrimination, m.reliability_proxy);
    }
    for p in &a.irt {
        assert_eq!(p.categories_observed, 2);
        assert_eq!(p.guessing, 0.5);
    }

    assert!(a.dif.is_none());
    assert!(a.topic_difficulty.is_empty());
}

#[test]
fn e2e_grouped_dataset_runs_dif_and_topics() {
    let dir = TempDir::new().unwrap();
    let report = run_report(Path::new("../../datasets/algebra-quiz.toml"), dir.path());
    let a = &report.analysis;

    let dif = a.dif.as_ref().expect("groups present, DIF should run");
    assert_eq!(dif.groups, ["F".to_string(), "M".to_string()]);
    assert_eq!(dif.group_sizes, [6, 6]);
    assert_eq!(dif.items.len(), 6);
    assert_eq!(dif.group1_parameters.len(), 6);
    for r in &dif.items {
        assert!((0.0..=1.0).contains(&r.p_value));
        assert_eq!(r.dif_detected, r.p_value < dif.significance_level);
    }

    let topics: Vec<&str> = a.topic_difficulty.iter().map(|t| t.topic.as_str()).collect();
    assert_eq!(topics, vec!["Fractions", "Ratios", "Linear equations", "Geometry"]);
    assert_eq!(a.mastery.len(), 12);

    // Q4 has one "-" response, which counts as its own category
    let q4 = a.options.iter().find(|d| d.item == "Q4").unwrap();
    assert_eq!(q4.missing, 1);
}

#[test]
fn e2e_identical_groups_show_no_dif() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mirror.toml");
    let patterns = [
        r#"["A", "B", "C"]"#,
        r#"["A", "C", "C"]"#,
        r#"["B", "B", "A"]"#,
        r#"["A", "B", "B"]"#,
    ];
    let mut content = String::from(
        "[dataset]\nid = \"mirror\"\nname = \"Mirror\"\n\n\
         [[items]]\nkey = \"A\"\n\n[[items]]\nkey = \"B\"\n\n[[items]]\nkey = \"C\"\n",
    );
    for group in ["g1", "g2"] {
        for p in &patterns {
            content.push_str(&format!("\n[[examinees]]\ngroup = \"{group}\"\nresponses = {p}\n"));
        }
    }
    std::fs::write(&path, content).unwrap();

    let output = dir.path().join("out");
    let report = run_report(&path, &output);
    let dif = report.analysis.dif.expect("dif report");

    for r in &dif.items {
        assert_eq!(r.delta.discrimination, 0.0);
        assert_eq!(r.delta.difficulty, 0.0);
        assert_eq!(r.delta.guessing, 0.0);
        assert_eq!(r.chi2, 0.0);
        assert_eq!(r.p_value, 1.0);
        assert!(!r.dif_detected);
    }
}

#[test]
fn e2e_zero_variance_item_is_reported_not_fatal() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("flat.json");
    std::fs::write(
        &path,
        r#"{
  "dataset": {"id": "flat", "name": "Flat"},
  "items": [{"key": 1}, {"key": 2}],
  "examinees": [
    {"responses": [1, 2]},
    {"responses": [1, 3]},
    {"responses": [1, 2]}
  ]
}"#,
    )
    .unwrap();

    let output = dir.path().join("out");
    let report = run_report(&path, &output);
    let first = &report.analysis.ctt[0];
    assert_eq!(first.difficulty, 1.0);
    assert_eq!(first.reliability_proxy.status, EstimateStatus::Degenerate);
    assert_eq!(first.reliability_proxy.value, 0.0);
    assert_eq!(report.analysis.degenerate_items(), vec!["1"]);
    assert_eq!(report.analysis.irt[0].guessing, 1.0);
}
