//! Serialization of the (possibly edited) record set back to files
//!
//! JSON export mirrors the input layout (root key and field names) so the
//! file can be loaded again unchanged. CSV export is a flat table meant for
//! spreadsheets.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::annotations::{AnnotationRecord, AnnotationSet, RecordOut};
use crate::{Error, Result};

/// Suffix appended to the original basename
pub const EXPORT_SUFFIX: &str = "_updated";

/// Basename used when the original filename is unknown
const FALLBACK_BASENAME: &str = "annotations";

/// Fixed CSV header
pub const CSV_COLUMNS: [&str; 7] = [
    "id",
    "sentence",
    "gold_label",
    "predicted_label",
    "judgement",
    "reasoning",
    "errors",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv; charset=utf-8",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(Error::Config(format!("unknown export format '{}'", other))),
        }
    }
}

/// A rendered export ready to be saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub body: String,
}

/// Render `set` in `format`, naming the file after `original_name`
pub fn export(set: &AnnotationSet, format: ExportFormat, original_name: Option<&str>) -> Result<ExportFile> {
    let body = match format {
        ExportFormat::Json => to_json(set)?,
        ExportFormat::Csv => to_csv(set.records()),
    };
    Ok(ExportFile {
        file_name: export_file_name(original_name, format),
        content_type: format.content_type(),
        body,
    })
}

/// Pretty-printed JSON in the set's own layout
pub fn to_json(set: &AnnotationSet) -> Result<String> {
    let rows: Vec<RecordOut<'_>> = set
        .records()
        .iter()
        .map(|r| RecordOut::new(set.schema(), r))
        .collect();

    let mut root = BTreeMap::new();
    root.insert(set.root_key(), rows);

    serde_json::to_string_pretty(&root).map_err(|e| Error::Serialize(e.to_string()))
}

/// One header row plus one row per record, CRLF-terminated
pub fn to_csv(records: &[AnnotationRecord]) -> String {
    let mut out = String::new();
    push_row(&mut out, CSV_COLUMNS.iter().copied());

    for r in records {
        let id = r.id.to_string();
        let errors = r
            .errors
            .iter()
            .map(|e| e.display_pair())
            .collect::<Vec<_>>()
            .join("; ");
        push_row(
            &mut out,
            [
                id.as_str(),
                r.sentence.as_str(),
                r.gold_label.as_str(),
                r.predicted_label.as_str(),
                r.judgement.as_str(),
                r.reasoning.as_str(),
                errors.as_str(),
            ],
        );
    }
    out
}

fn push_row<'a>(out: &mut String, fields: impl IntoIterator<Item = &'a str>) {
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_field(out, field);
    }
    out.push_str("\r\n");
}

fn push_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\r', '\n']) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}

/// Split CSV text into rows of fields, undoing [`to_csv`] quoting.
///
/// Accepts CRLF or LF row endings; a trailing line ending does not produce
/// an empty row.
pub fn split_csv(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut row_started = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                other => field.push(other),
            }
            continue;
        }

        match c {
            '"' => {
                in_quotes = true;
                row_started = true;
            }
            ',' => {
                row.push(std::mem::take(&mut field));
                row_started = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
                row_started = false;
            }
            other => {
                field.push(other);
                row_started = true;
            }
        }
    }

    if row_started || !field.is_empty() {
        row.push(field);
        rows.push(row);
    }
    rows
}

/// `<original basename without extension>_updated.<ext>`.
///
/// Directory components (either separator, since browsers may report a
/// Windows path) are dropped. Only the last extension is stripped.
pub fn export_file_name(original: Option<&str>, format: ExportFormat) -> String {
    let base = original
        .map(|name| name.rsplit(['/', '\\']).next().unwrap_or(name))
        .map(|name| match name.rsplit_once('.') {
            Some((stem, _)) => stem,
            None => name,
        })
        .map(str::trim)
        .filter(|stem| !stem.is_empty())
        .unwrap_or(FALLBACK_BASENAME);

    format!("{}{}.{}", base, EXPORT_SUFFIX, format.extension())
}
