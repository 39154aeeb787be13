//! On-disk field layouts for annotation files
//!
//! Two builds of the annotation tool wrote different field names for the
//! same record. Both are read; the layout found on load is remembered and
//! used again on export so an exported file mirrors its input.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{AnnotationRecord, ErrorAssignment};
use crate::{Error, Result};

/// Fields whose presence marks the LLM-evaluation layout
const LLM_MARKER_FIELDS: &[&str] = &[
    "LLM_prediction",
    "gold_standard",
    "predication_label",
    "LLM_reasoning",
];

/// Field-name layout of an annotation file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Schema {
    /// `gold_label`, `predicted_label`, `_judgement` (or `tag`), `comment`
    #[default]
    Tagged,
    /// `gold_standard`, `LLM_prediction`, `predication_label`, `LLM_reasoning`
    Llm,
}

impl Schema {
    /// Pick the layout for a list of raw record values.
    ///
    /// Any record carrying an LLM marker field switches the whole file.
    pub fn detect(items: &[Value]) -> Self {
        let is_llm = items.iter().any(|item| {
            item.as_object()
                .map(|obj| LLM_MARKER_FIELDS.iter().any(|f| obj.contains_key(*f)))
                .unwrap_or(false)
        });
        if is_llm {
            Schema::Llm
        } else {
            Schema::Tagged
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Schema::Tagged => "tagged",
            Schema::Llm => "llm",
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireError {
    #[serde(default)]
    category: Option<String>,
    #[serde(default, rename = "type")]
    error_type: Option<String>,
}

impl From<WireError> for ErrorAssignment {
    fn from(w: WireError) -> Self {
        ErrorAssignment {
            category: w.category.unwrap_or_default(),
            error_type: w.error_type.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TaggedRecordIn {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    sentence: Option<String>,
    #[serde(default)]
    gold_label: Option<String>,
    #[serde(default)]
    predicted_label: Option<String>,
    #[serde(default, rename = "_judgement")]
    judgement: Option<String>,
    #[serde(default)]
    tag: Option<String>,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    errors: Option<Vec<WireError>>,
}

#[derive(Debug, Deserialize)]
struct LlmRecordIn {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    sentence: Option<String>,
    #[serde(default)]
    gold_standard: Option<String>,
    #[serde(default, rename = "LLM_prediction")]
    llm_prediction: Option<String>,
    #[serde(default)]
    predication_label: Option<String>,
    #[serde(default, rename = "LLM_reasoning")]
    llm_reasoning: Option<String>,
    #[serde(default)]
    errors: Option<Vec<WireError>>,
}

/// Decode one raw record value. `position` is 1-based and only used in
/// error messages.
///
/// Returns the explicit id (if the record has one) alongside the record;
/// a record without an id comes back with `id == 0` for the caller to fill.
pub(crate) fn decode_record(
    schema: Schema,
    value: Value,
    position: u64,
) -> Result<(Option<u64>, AnnotationRecord)> {
    let (id, record) = match schema {
        Schema::Tagged => {
            let r: TaggedRecordIn = serde_json::from_value(value)
                .map_err(|e| Error::Parse(format!("record {}: {}", position, e)))?;
            let id = decode_id(r.id, position)?;
            let record = AnnotationRecord {
                id: id.unwrap_or(0),
                sentence: r.sentence.unwrap_or_default(),
                gold_label: r.gold_label.unwrap_or_default(),
                predicted_label: r.predicted_label.unwrap_or_default(),
                judgement: r.judgement.or(r.tag).unwrap_or_default(),
                reasoning: r.comment.unwrap_or_default(),
                errors: decode_errors(r.errors),
            };
            (id, record)
        }
        Schema::Llm => {
            let r: LlmRecordIn = serde_json::from_value(value)
                .map_err(|e| Error::Parse(format!("record {}: {}", position, e)))?;
            let id = decode_id(r.id, position)?;
            let record = AnnotationRecord {
                id: id.unwrap_or(0),
                sentence: r.sentence.unwrap_or_default(),
                gold_label: r.gold_standard.unwrap_or_default(),
                predicted_label: r.llm_prediction.unwrap_or_default(),
                judgement: r.predication_label.unwrap_or_default(),
                reasoning: r.llm_reasoning.unwrap_or_default(),
                errors: decode_errors(r.errors),
            };
            (id, record)
        }
    };
    Ok((id, record))
}

fn decode_errors(errors: Option<Vec<WireError>>) -> Vec<ErrorAssignment> {
    errors
        .unwrap_or_default()
        .into_iter()
        .map(ErrorAssignment::from)
        .collect()
}

/// Ids are numeric; a numeric string is accepted, anything else is a schema error
fn decode_id(id: Option<Value>, position: u64) -> Result<Option<u64>> {
    match id {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_u64().map(Some).ok_or_else(|| {
            Error::Parse(format!("record {}: id {} is not a non-negative integer", position, n))
        }),
        Some(Value::String(s)) => s.trim().parse::<u64>().map(Some).map_err(|_| {
            Error::Parse(format!("record {}: id '{}' is not numeric", position, s))
        }),
        Some(other) => Err(Error::Parse(format!(
            "record {}: id must be a number, found {}",
            position, other
        ))),
    }
}

#[derive(Serialize)]
pub(crate) struct ErrorOut<'a> {
    category: &'a str,
    #[serde(rename = "type")]
    error_type: &'a str,
}

#[derive(Serialize)]
pub(crate) struct TaggedRecordOut<'a> {
    id: u64,
    sentence: &'a str,
    gold_label: &'a str,
    predicted_label: &'a str,
    #[serde(rename = "_judgement")]
    judgement: &'a str,
    comment: &'a str,
    errors: Vec<ErrorOut<'a>>,
}

#[derive(Serialize)]
pub(crate) struct LlmRecordOut<'a> {
    id: u64,
    sentence: &'a str,
    gold_standard: &'a str,
    #[serde(rename = "LLM_prediction")]
    llm_prediction: &'a str,
    predication_label: &'a str,
    #[serde(rename = "LLM_reasoning")]
    llm_reasoning: &'a str,
    errors: Vec<ErrorOut<'a>>,
}

/// A record borrowed into the on-disk layout of `schema`, with fixed field order
#[derive(Serialize)]
#[serde(untagged)]
pub(crate) enum RecordOut<'a> {
    Tagged(TaggedRecordOut<'a>),
    Llm(LlmRecordOut<'a>),
}

impl<'a> RecordOut<'a> {
    pub(crate) fn new(schema: Schema, r: &'a AnnotationRecord) -> Self {
        let errors = r
            .errors
            .iter()
            .map(|e| ErrorOut {
                category: &e.category,
                error_type: &e.error_type,
            })
            .collect();

        match schema {
            Schema::Tagged => RecordOut::Tagged(TaggedRecordOut {
                id: r.id,
                sentence: &r.sentence,
                gold_label: &r.gold_label,
                predicted_label: &r.predicted_label,
                judgement: &r.judgement,
                comment: &r.reasoning,
                errors,
            }),
            Schema::Llm => RecordOut::Llm(LlmRecordOut {
                id: r.id,
                sentence: &r.sentence,
                gold_standard: &r.gold_label,
                llm_prediction: &r.predicted_label,
                predication_label: &r.judgement,
                llm_reasoning: &r.reasoning,
                errors,
            }),
        }
    }
}
