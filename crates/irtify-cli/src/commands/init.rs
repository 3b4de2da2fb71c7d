//! The `irtify init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("irtify.toml").exists() {
        println!("irtify.toml already exists, skipping.");
    } else {
        std::fs::write("irtify.toml", SAMPLE_CONFIG)?;
        println!("Created irtify.toml");
    }

    std::fs::create_dir_all("datasets")?;
    let example_path = std::path::Path::new("datasets/example.toml");
    if example_path.exists() {
        println!("datasets/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_DATASET)?;
        println!("Created datasets/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Replace datasets/example.toml with your own responses");
    println!("  2. Run: irtify validate --dataset datasets/example.toml");
    println!("  3. Run: irtify report --dataset datasets/example.toml --format all");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# irtify configuration

# DIF flag threshold: items with p < significance_level are flagged
significance_level = 0.05

# Ability grid used to sample item characteristic curves
theta_min = -3.0
theta_max = 3.0
icc_points = 100

output_dir = "./irtify-results"
format = "json"
"#;

const EXAMPLE_DATASET: &str = r#"[dataset]
id = "example"
name = "Example Quiz"
description = "Five multiple-choice items answered by eight students"
missing = ""

[[items]]
id = "Q1"
key = "A"
topics = ["Fractions"]

[[items]]
id = "Q2"
key = "C"
topics = ["Fractions", "Ratios"]

[[items]]
id = "Q3"
key = "B"
topics = ["Geometry"]

[[items]]
id = "Q4"
key = "D"
topics = ["Ratios"]

[[items]]
id = "Q5"
key = "A"
topics = ["Geometry"]

[[examinees]]
id = "s01"
group = "F"
responses = ["A", "C", "B", "D", "A"]

[[examinees]]
id = "s02"
group = "M"
responses = ["A", "C", "B", "A", "B"]

[[examinees]]
id = "s03"
group = "F"
responses = ["B", "C", "A", "D", "A"]

[[examinees]]
id = "s04"
group = "M"
responses = ["A", "B", "B", "", "C"]

[[examinees]]
id = "s05"
group = "F"
responses = ["C", "A", "D", "D", "A"]

[[examinees]]
id = "s06"
group = "M"
responses = ["A", "C", "C", "B", "A"]

[[examinees]]
id = "s07"
group = "F"
responses = ["A", "D", "B", "C", "D"]

[[examinees]]
id = "s08"
group = "M"
responses = ["D", "C", "B", "D", "A"]
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{parse_dataset_str, validate_dataset, DatasetFormat};
    use crate::config::IrtifyConfig;

    #[test]
    fn sample_config_parses() {
        let config: IrtifyConfig = toml::from_str(SAMPLE_CONFIG).unwrap();
        assert_eq!(config, IrtifyConfig::default());
    }

    #[test]
    fn example_dataset_is_valid() {
        let set = parse_dataset_str(
            EXAMPLE_DATASET,
            DatasetFormat::Toml,
            std::path::Path::new("example.toml"),
        )
        .unwrap();
        assert_eq!(set.items.len(), 5);
        assert_eq!(set.examinees.len(), 8);
        assert!(validate_dataset(&set).is_empty());
        assert!(set.to_matrix().is_ok());
    }
}
