//! Annotated sentences and their error assignments
//!
//! An annotation file is a JSON object with one array-valued key:
//!
//! ```json
//! { "annotations": [
//!     { "id": 1, "sentence": "...", "gold_label": "...", "predicted_label": "...",
//!       "_judgement": "FP", "comment": "...",
//!       "errors": [ { "category": "Medication", "type": "Wrong dose" } ] }
//! ] }
//! ```
//!
//! See [`Schema`] for the second field-name layout that is also accepted.

mod judgement;
mod schema;

pub use judgement::JudgementKind;
pub use schema::Schema;

pub(crate) use schema::RecordOut;

use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

use crate::{Error, Result};

/// Root key used when a file is a bare array
pub const DEFAULT_ROOT_KEY: &str = "annotations";

/// A (category, type) classification attached to one record.
///
/// The type is the source of truth; the category is denormalized from the
/// taxonomy whenever the type is edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorAssignment {
    pub category: String,
    #[serde(rename = "type")]
    pub error_type: String,
}

impl ErrorAssignment {
    pub fn new(category: impl Into<String>, error_type: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            error_type: error_type.into(),
        }
    }

    /// `category: type`, as used in tabular export
    pub fn display_pair(&self) -> String {
        format!("{}: {}", self.category, self.error_type)
    }
}

/// One judged sentence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationRecord {
    pub id: u64,
    pub sentence: String,
    pub gold_label: String,
    pub predicted_label: String,
    /// Raw judgement tag as found in the file
    pub judgement: String,
    pub reasoning: String,
    pub errors: Vec<ErrorAssignment>,
}

impl AnnotationRecord {
    pub fn judgement_kind(&self) -> JudgementKind {
        JudgementKind::classify(&self.judgement)
    }
}

/// The loaded record list plus the layout it came in.
///
/// Replaced or cleared as a unit; only individual error assignments are
/// mutated in place (see [`crate::editor`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationSet {
    records: Vec<AnnotationRecord>,
    schema: Schema,
    root_key: String,
}

impl Default for AnnotationSet {
    fn default() -> Self {
        Self::new(Vec::new(), Schema::default(), DEFAULT_ROOT_KEY)
    }
}

impl AnnotationSet {
    pub fn new(records: Vec<AnnotationRecord>, schema: Schema, root_key: impl Into<String>) -> Self {
        Self {
            records,
            schema,
            root_key: root_key.into(),
        }
    }

    /// Parse an annotation file.
    ///
    /// Accepts an object with exactly one array-valued key, or a bare array.
    /// Input order is preserved. Any structural problem fails the whole load.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(text)?;

        let (root_key, items) = match root {
            Value::Array(items) => (DEFAULT_ROOT_KEY.to_string(), items),
            Value::Object(map) => {
                let mut arrays: Vec<(String, Vec<Value>)> = map
                    .into_iter()
                    .filter_map(|(k, v)| match v {
                        Value::Array(items) => Some((k, items)),
                        _ => None,
                    })
                    .collect();
                match arrays.len() {
                    1 => arrays.remove(0),
                    0 => {
                        return Err(Error::Parse(
                            "annotation file has no array of records".to_string(),
                        ))
                    }
                    n => {
                        let keys: Vec<&str> = arrays.iter().map(|(k, _)| k.as_str()).collect();
                        return Err(Error::Parse(format!(
                            "annotation file has {} record arrays ({}); expected one",
                            n,
                            keys.join(", ")
                        )));
                    }
                }
            }
            _ => {
                return Err(Error::Parse(
                    "annotation file must be an object holding an array of records".to_string(),
                ))
            }
        };

        let schema = Schema::detect(&items);

        let mut records = Vec::with_capacity(items.len());
        let mut used = HashSet::with_capacity(items.len());
        let mut missing = Vec::new();
        for (i, item) in items.into_iter().enumerate() {
            let (id, record) = schema::decode_record(schema, item, i as u64 + 1)?;
            match id {
                Some(id) if !used.insert(id) => {
                    return Err(Error::Parse(format!("record {}: duplicate id {}", i + 1, id)));
                }
                Some(_) => {}
                None => missing.push(i),
            }
            records.push(record);
        }

        // A record without an id takes its 1-based position, or the next
        // number not already claimed by an explicit id.
        for i in missing {
            let mut id = i as u64 + 1;
            while !used.insert(id) {
                id += 1;
            }
            records[i].id = id;
        }

        Ok(Self {
            records,
            schema,
            root_key,
        })
    }

    pub fn records(&self) -> &[AnnotationRecord] {
        &self.records
    }

    pub fn schema(&self) -> Schema {
        self.schema
    }

    pub fn root_key(&self) -> &str {
        &self.root_key
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&AnnotationRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: u64) -> Option<&mut AnnotationRecord> {
        self.records.iter_mut().find(|r| r.id == id)
    }

    /// Records whose raw judgement equals `judgement`, in input order
    pub fn with_judgement<'a>(
        &'a self,
        judgement: &'a str,
    ) -> impl Iterator<Item = &'a AnnotationRecord> + 'a {
        self.records.iter().filter(move |r| r.judgement == judgement)
    }
}
