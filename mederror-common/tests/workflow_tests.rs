//! End-to-end review workflow over files on disk
//!
//! Load taxonomy + annotations from files, reassign, export, reload the
//! export, and check that nothing but the edited assignment changed.

use mederror_common::aggregate::{error_histogram, judgement_histogram};
use mederror_common::annotations::Schema;
use mederror_common::editor::EditOutcome;
use mederror_common::export::{split_csv, ExportFormat, CSV_COLUMNS};
use mederror_common::{AnnotationSet, ErrorAssignment, Session};
use std::path::PathBuf;

const TAXONOMY: &str = "\
Medication:
  Wrong dose: Dose differs from the prescribed amount
  Wrong drug: Drug name mismatched
Temporal:
  Wrong frequency: Frequency misread
  Wrong dose: Duplicate name, owned by Medication
";

const LLM_RECORDS: &str = r#"[
  {"id": 10, "sentence": "Aspirin 81 mg daily", "gold_standard": "81 mg",
   "LLM_prediction": "18 mg", "predication_label": "FP", "LLM_reasoning": "digits swapped",
   "errors": [{"category": "Temporal", "type": "Wrong frequency"}]},
  {"id": 11, "sentence": "Metformin, twice a day", "gold_standard": "BID",
   "LLM_prediction": "", "predication_label": "FN", "LLM_reasoning": "",
   "errors": []}
]"#;

fn write_fixture(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_llm_layout_review_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::new();
    session
        .load_taxonomy_file(&write_fixture(&dir, "taxonomy.yaml", TAXONOMY))
        .unwrap();
    session
        .load_annotations_file(&write_fixture(&dir, "eval_run.json", LLM_RECORDS))
        .unwrap();

    let set = session.annotations().unwrap();
    assert_eq!(set.schema(), Schema::Llm);
    assert_eq!(set.root_key(), "annotations");

    let (outcome, _) = session.reassign(10, 0, "Wrong dose");
    assert_eq!(
        outcome,
        EditOutcome::Reassigned {
            category: "Medication".to_string()
        }
    );

    let json = session.export(ExportFormat::Json).unwrap().unwrap();
    assert_eq!(json.file_name, "eval_run_updated.json");
    let reloaded = AnnotationSet::from_json_str(&json.body).unwrap();
    assert_eq!(reloaded.schema(), Schema::Llm);
    assert_eq!(&reloaded, session.annotations().unwrap());
    assert_eq!(
        reloaded.get(10).unwrap().errors,
        vec![ErrorAssignment::new("Medication", "Wrong dose")]
    );
    assert_eq!(reloaded.get(11).unwrap().gold_label, "BID");

    let h = judgement_histogram(reloaded.records());
    assert_eq!(h.get("FP"), Some(1));
    assert_eq!(h.get("FN"), Some(1));
    assert_eq!(error_histogram(reloaded.records()).get("Medication", "Wrong dose"), Some(1));
}

#[test]
fn test_csv_export_recovers_fields() {
    let mut session = Session::new();
    session
        .load_annotations(LLM_RECORDS, Some("eval_run.json".to_string()))
        .unwrap();

    let csv = session.export(ExportFormat::Csv).unwrap().unwrap();
    assert_eq!(csv.file_name, "eval_run_updated.csv");

    let rows = split_csv(&csv.body);
    assert_eq!(rows[0], CSV_COLUMNS.to_vec());
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1][1], "Aspirin 81 mg daily");
    assert_eq!(rows[1][6], "Temporal: Wrong frequency");
    assert_eq!(rows[2][1], "Metformin, twice a day");
    assert_eq!(rows[2][4], "FN");
}
