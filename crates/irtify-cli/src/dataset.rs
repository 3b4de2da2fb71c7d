//! Dataset file parser.
//!
//! Loads response data sets from TOML or JSON files and directories, and
//! validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use irtify_core::model::{AnswerKey, Category, Item, Response, ResponseMatrix, ResponseRecord};
use irtify_core::topics::TopicMap;
use irtify_report::report::DatasetSummary;

/// A loaded data set: answer key, examinees, and the optional grouping and
/// topic labels that travel with them.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub id: String,
    pub name: String,
    pub description: String,
    pub items: Vec<DatasetItem>,
    pub examinees: Vec<Examinee>,
}

#[derive(Debug, Clone)]
pub struct DatasetItem {
    pub id: String,
    pub key: Category,
    pub topics: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Examinee {
    pub id: String,
    pub group: Option<String>,
    pub responses: Vec<Response>,
}

impl Dataset {
    pub fn answer_key(&self) -> AnswerKey {
        AnswerKey::new(
            self.items
                .iter()
                .map(|i| Item::new(i.id.clone(), i.key.clone()))
                .collect(),
        )
    }

    /// Build the response matrix, failing on ragged rows.
    pub fn to_matrix(&self) -> Result<ResponseMatrix> {
        let records = self
            .examinees
            .iter()
            .map(|e| ResponseRecord::new(e.id.clone(), e.responses.clone()))
            .collect();
        let matrix = ResponseMatrix::new(self.answer_key(), records)
            .with_context(|| format!("invalid data set '{}'", self.id))?;
        Ok(matrix)
    }

    /// Group labels, present only when every examinee carries one.
    pub fn groups(&self) -> Option<Vec<String>> {
        if self.examinees.is_empty() {
            return None;
        }
        self.examinees.iter().map(|e| e.group.clone()).collect()
    }

    pub fn topic_map(&self) -> TopicMap {
        let mut topics = TopicMap::new();
        for item in &self.items {
            if !item.topics.is_empty() {
                topics.insert(item.id.clone(), &item.topics);
            }
        }
        topics
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            item_count: self.items.len(),
            examinee_count: self.examinees.len(),
        }
    }
}

/// Intermediate structure for parsing data set files.
#[derive(Debug, Deserialize)]
struct DatasetFile {
    dataset: DatasetHeader,
    #[serde(default)]
    items: Vec<RawItem>,
    #[serde(default)]
    examinees: Vec<RawExaminee>,
}

#[derive(Debug, Deserialize)]
struct DatasetHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    /// Response token meaning "no response".
    #[serde(default)]
    missing: String,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(default)]
    id: Option<String>,
    key: RawCategory,
    #[serde(default)]
    topics: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawExaminee {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    group: Option<String>,
    responses: Vec<Option<RawCategory>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawCategory {
    Integer(i64),
    Text(String),
}

impl From<RawCategory> for Category {
    fn from(raw: RawCategory) -> Self {
        match raw {
            RawCategory::Integer(n) => Category::from(n),
            RawCategory::Text(s) => Category::from(s),
        }
    }
}

/// Serialization format of a data set file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Toml,
    Json,
}

impl DatasetFormat {
    fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "toml" => Some(DatasetFormat::Toml),
            "json" => Some(DatasetFormat::Json),
            _ => None,
        }
    }
}

/// Parse a single data set file; the format follows the extension.
pub fn parse_dataset(path: &Path) -> Result<Dataset> {
    let format = DatasetFormat::from_path(path).unwrap_or(DatasetFormat::Toml);
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read data set file: {}", path.display()))?;

    parse_dataset_str(&content, format, path)
}

/// Parse a data set from a string (useful for testing).
pub fn parse_dataset_str(content: &str, format: DatasetFormat, source_path: &Path) -> Result<Dataset> {
    let parsed: DatasetFile = match format {
        DatasetFormat::Toml => toml::from_str(content)
            .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?,
        DatasetFormat::Json => serde_json::from_str(content)
            .with_context(|| format!("failed to parse JSON: {}", source_path.display()))?,
    };

    let missing = parsed.dataset.missing;
    let to_response = |raw: Option<RawCategory>| -> Response {
        let category = Category::from(raw?);
        (category.as_str() != missing).then_some(category)
    };

    let items = parsed
        .items
        .into_iter()
        .enumerate()
        .map(|(i, item)| DatasetItem {
            id: item.id.unwrap_or_else(|| (i + 1).to_string()),
            key: item.key.into(),
            topics: item.topics,
        })
        .collect();

    let examinees = parsed
        .examinees
        .into_iter()
        .enumerate()
        .map(|(i, e)| Examinee {
            id: e.id.unwrap_or_else(|| (i + 1).to_string()),
            group: e.group,
            responses: e.responses.into_iter().map(to_response).collect(),
        })
        .collect();

    Ok(Dataset {
        id: parsed.dataset.id,
        name: parsed.dataset.name,
        description: parsed.dataset.description,
        items,
        examinees,
    })
}

/// Recursively load all `.toml` and `.json` data sets from a directory.
pub fn load_dataset_directory(dir: &Path) -> Result<Vec<Dataset>> {
    let mut sets = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            sets.extend(load_dataset_directory(&path)?);
        } else if DatasetFormat::from_path(&path).is_some() {
            match parse_dataset(&path) {
                Ok(set) => sets.push(set),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(sets)
}

/// Load a file, or every data set in a directory.
pub fn load_datasets(path: &Path) -> Result<Vec<Dataset>> {
    if path.is_dir() {
        load_dataset_directory(path)
    } else {
        Ok(vec![parse_dataset(path)?])
    }
}

/// A warning from data set validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The item or examinee the warning is about (if applicable).
    pub subject: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn about(subject: &str, message: impl Into<String>) -> Self {
        Self {
            subject: Some(subject.to_string()),
            message: message.into(),
        }
    }
}

/// Validate a data set for common issues.
pub fn validate_dataset(set: &Dataset) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    // Duplicate ids
    let mut seen_items = HashSet::new();
    for item in &set.items {
        if !seen_items.insert(&item.id) {
            warnings.push(ValidationWarning::about(&item.id, format!("duplicate item ID: {}", item.id)));
        }
    }
    let mut seen_examinees = HashSet::new();
    for e in &set.examinees {
        if !seen_examinees.insert(&e.id) {
            warnings.push(ValidationWarning::about(&e.id, format!("duplicate examinee ID: {}", e.id)));
        }
    }

    if set.examinees.len() < 2 {
        warnings.push(ValidationWarning {
            subject: None,
            message: format!(
                "{} examinee(s); correlation-based statistics need at least 2",
                set.examinees.len()
            ),
        });
    }

    // Ragged rows
    for e in &set.examinees {
        if e.responses.len() != set.items.len() {
            warnings.push(ValidationWarning::about(
                &e.id,
                format!("{} responses, expected {}", e.responses.len(), set.items.len()),
            ));
        }
    }

    // Per-item response patterns
    for (i, item) in set.items.iter().enumerate() {
        let answers: Vec<Option<&Category>> = set
            .examinees
            .iter()
            .filter_map(|e| e.responses.get(i))
            .map(Option::as_ref)
            .collect();
        if answers.is_empty() {
            continue;
        }
        if answers.iter().all(|a| *a == answers[0]) {
            warnings.push(ValidationWarning::about(
                &item.id,
                "every examinee gave the same answer; discrimination is undefined",
            ));
        }
        if !answers.iter().any(|a| *a == Some(&item.key)) {
            warnings.push(ValidationWarning::about(
                &item.id,
                format!("no examinee chose the key '{}'", item.key),
            ));
        }
    }

    // Grouping
    let grouped = set.examinees.iter().filter(|e| e.group.is_some()).count();
    if grouped > 0 && grouped < set.examinees.len() {
        warnings.push(ValidationWarning {
            subject: None,
            message: format!(
                "only {grouped} of {} examinees have a group; DIF will be skipped",
                set.examinees.len()
            ),
        });
    } else if grouped > 0 {
        let labels: HashSet<&str> = set.examinees.iter().filter_map(|e| e.group.as_deref()).collect();
        if labels.len() != 2 {
            warnings.push(ValidationWarning {
                subject: None,
                message: format!("DIF needs exactly 2 groups, found {}", labels.len()),
            });
        }
    }

    warnings
}
