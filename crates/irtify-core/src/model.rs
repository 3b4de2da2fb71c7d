//! Core data model: answer keys, examinee responses, and the response matrix.
//!
//! A [`ResponseMatrix`] is the sole input artifact of the engine. It is built
//! once from an already-separated answer key and response list and is never
//! mutated afterwards; every estimator borrows it.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PsychometricError, Result};

/// A response category such as `"A"`, `"B"` or `"2"`.
///
/// Categories compare by their textual form, so the integer `2` and the
/// string `"2"` are the same category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Category {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<i64> for Category {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

/// One examinee's answer to one item. `None` is "no response", which never
/// matches the key but still counts as an observed category.
pub type Response = Option<Category>;

/// A single test item and its keyed (correct) category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    id: String,
    key: Category,
}

impl Item {
    pub fn new(id: impl Into<String>, key: impl Into<Category>) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
        }
    }

    /// Item label, by default its 1-based position.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The correct category.
    pub fn key(&self) -> &Category {
        &self.key
    }
}

/// The ordered answer key, one [`Item`] per column of the response matrix.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnswerKey {
    items: Vec<Item>,
}

impl AnswerKey {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// Build a key whose item labels are the 1-based positions.
    pub fn from_categories<I, C>(keys: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Category>,
    {
        let items = keys
            .into_iter()
            .enumerate()
            .map(|(i, key)| Item::new((i + 1).to_string(), key))
            .collect();
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    /// Keyed category for the item at `index`.
    pub fn key(&self, index: usize) -> Option<&Category> {
        self.items.get(index).map(Item::key)
    }
}

/// One examinee's response vector, aligned with the answer key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
    id: String,
    responses: Vec<Response>,
}

impl ResponseRecord {
    pub fn new(id: impl Into<String>, responses: Vec<Response>) -> Self {
        Self {
            id: id.into(),
            responses,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn responses(&self) -> &[Response] {
        &self.responses
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// The response to `item`; `Some(None)` is an explicit non-response.
    pub fn response(&self, item: usize) -> Option<&Response> {
        self.responses.get(item)
    }

    /// Whether the response to `item` equals `key`. Missing responses and
    /// out-of-range items are incorrect.
    pub fn is_correct(&self, item: usize, key: &Category) -> bool {
        matches!(self.responses.get(item), Some(Some(answer)) if answer == key)
    }

    /// Number of items answered correctly.
    pub fn raw_score(&self, key: &AnswerKey) -> u32 {
        key.items()
            .iter()
            .enumerate()
            .filter(|(i, item)| self.is_correct(*i, item.key()))
            .count() as u32
    }
}

/// Verify every record has exactly one response per keyed item.
pub(crate) fn check_shape<R: Borrow<ResponseRecord>>(key: &AnswerKey, records: &[R]) -> Result<()> {
    for (index, record) in records.iter().enumerate() {
        let record = record.borrow();
        if record.len() != key.len() {
            return Err(PsychometricError::ShapeMismatch {
                what: format!("responses of examinee {} ('{}')", index + 1, record.id()),
                expected: key.len(),
                found: record.len(),
            });
        }
    }
    Ok(())
}

/// An answer key paired with the responses of every examinee.
///
/// Invariant: every record has `key.len()` responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseMatrix {
    key: AnswerKey,
    records: Vec<ResponseRecord>,
}

impl ResponseMatrix {
    /// Pair a key with response records, failing with
    /// [`PsychometricError::ShapeMismatch`] if any record has the wrong length.
    pub fn new(key: AnswerKey, records: Vec<ResponseRecord>) -> Result<Self> {
        check_shape(&key, &records)?;
        Ok(Self { key, records })
    }

    /// Build a matrix from plain category rows. Items and examinees are
    /// labelled by their 1-based positions and every response is present.
    pub fn from_rows<K, C, R, Row, RC>(key: K, rows: R) -> Result<Self>
    where
        K: IntoIterator<Item = C>,
        C: Into<Category>,
        R: IntoIterator<Item = Row>,
        Row: IntoIterator<Item = RC>,
        RC: Into<Category>,
    {
        let key = AnswerKey::from_categories(key);
        let records = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                ResponseRecord::new(
                    (i + 1).to_string(),
                    row.into_iter().map(|c| Some(c.into())).collect(),
                )
            })
            .collect();
        Self::new(key, records)
    }

    pub fn key(&self) -> &AnswerKey {
        &self.key
    }

    pub fn records(&self) -> &[ResponseRecord] {
        &self.records
    }

    pub fn item_count(&self) -> usize {
        self.key.len()
    }

    pub fn examinee_count(&self) -> usize {
        self.records.len()
    }

    /// Response of examinee `examinee` to item `item`.
    pub fn response(&self, examinee: usize, item: usize) -> Option<&Response> {
        self.records.get(examinee).and_then(|r| r.response(item))
    }

    pub fn is_correct(&self, examinee: usize, item: usize) -> bool {
        match (self.records.get(examinee), self.key.key(item)) {
            (Some(record), Some(key)) => record.is_correct(item, key),
            _ => false,
        }
    }
}
