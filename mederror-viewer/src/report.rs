//! Headless summary and export over files on disk
//!
//! Shared by the `mederror-report` binary; works on the same [`Session`]
//! the HTTP service uses.

use mederror_common::aggregate::Summary;
use mederror_common::agreement::{label_agreement, Agreement};
use mederror_common::export::{split_csv, ExportFile, ExportFormat};
use mederror_common::{Error, Result, Session};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Everything printed by the report
#[derive(Debug, Serialize)]
pub struct Report {
    pub annotations: Option<String>,
    pub taxonomy: Option<String>,
    pub schema: String,
    pub summary: Summary,
    pub agreement: Agreement,
}

/// `None` if no annotations are loaded
pub fn build_report(session: &Session) -> Option<Report> {
    let loaded = session.annotations_source()?;
    let summary = session.summary()?;

    Some(Report {
        annotations: loaded.filename.clone(),
        taxonomy: session.taxonomy_source().and_then(|t| t.filename.clone()),
        schema: loaded.value.schema().name().to_string(),
        summary,
        agreement: label_agreement(loaded.value.records(), false),
    })
}

/// Plain-text rendering for the terminal
pub fn render_text(report: &Report) -> String {
    let mut out = String::new();
    let s = &report.summary;

    // Writing to a String cannot fail
    let _ = writeln!(
        out,
        "Annotations: {} ({} layout)",
        report.annotations.as_deref().unwrap_or("-"),
        report.schema
    );
    if let Some(taxonomy) = &report.taxonomy {
        let _ = writeln!(out, "Taxonomy:    {}", taxonomy);
    }
    let _ = writeln!(
        out,
        "Records: {}  with errors: {}  disagreeing: {}  assignments: {}  not in taxonomy: {}",
        s.record_count,
        s.records_with_errors,
        s.disagreements,
        s.assignment_count,
        s.dangling_assignments
    );

    let _ = writeln!(out, "\nJudgements");
    for entry in s.judgements.sorted_by_count() {
        let label = entry.kind.map(|k| k.label()).unwrap_or("");
        let _ = writeln!(out, "  {:<24} {:>6}  {}", entry.key, entry.count, label);
    }

    let _ = writeln!(out, "\nErrors");
    if s.errors.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for category in s.errors.categories() {
        let _ = writeln!(out, "  {:<24} {:>6}", category.category, category.total);
        for entry in category.types.sorted_by_count() {
            let _ = writeln!(out, "    {:<22} {:>6}", entry.key, entry.count);
        }
    }

    let a = &report.agreement;
    let _ = writeln!(
        out,
        "\nLabel agreement: accuracy {:.3}  precision {:.3}  recall {:.3}  f1 {:.3}",
        a.accuracy, a.precision, a.recall, a.f1
    );
    out
}

/// Write `file` into `dir` under its derived name
pub fn write_export(dir: &Path, file: &ExportFile) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(&file.file_name);
    std::fs::write(&path, &file.body)?;
    info!("Wrote {}", path.display());
    Ok(path)
}

/// Export the session in `format` to `dir`.
///
/// CSV output is re-split after writing and must yield one row per record
/// plus the header.
pub fn export_to_dir(session: &Session, format: ExportFormat, dir: &Path) -> Result<PathBuf> {
    let file = session
        .export(format)?
        .ok_or_else(|| Error::Config("no annotations loaded".to_string()))?;
    let path = write_export(dir, &file)?;

    if format == ExportFormat::Csv {
        let expected = session.annotations().map(|s| s.len() + 1).unwrap_or(1);
        let rows = split_csv(&file.body).len();
        if rows != expected {
            warn!("CSV export has {} rows, expected {}", rows, expected);
            return Err(Error::Serialize(format!(
                "CSV export has {} rows, expected {}",
                rows, expected
            )));
        }
    }
    Ok(path)
}
