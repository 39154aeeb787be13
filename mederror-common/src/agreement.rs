//! Agreement between predicted and gold labels
//!
//! Accuracy plus support-weighted precision, recall and F1 over every label
//! seen in either column. A label with no predictions (or no gold rows)
//! scores 0 for the undefined ratio instead of failing.

use serde::Serialize;

use crate::annotations::AnnotationRecord;

/// Agreement metrics over one record set
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Agreement {
    /// Number of records compared
    pub support: usize,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

struct LabelCounts {
    label: String,
    gold: usize,
    predicted: usize,
    matched: usize,
}

pub fn label_agreement(records: &[AnnotationRecord], case_sensitive: bool) -> Agreement {
    if records.is_empty() {
        return Agreement::default();
    }

    let normalize = |s: &str| {
        if case_sensitive {
            s.to_string()
        } else {
            s.to_lowercase()
        }
    };

    let mut labels: Vec<LabelCounts> = Vec::new();

    let mut matches = 0usize;
    for record in records {
        let gold = normalize(&record.gold_label);
        let predicted = normalize(&record.predicted_label);

        let g = slot(&mut labels, &gold);
        labels[g].gold += 1;
        let p = slot(&mut labels, &predicted);
        labels[p].predicted += 1;

        if gold == predicted {
            labels[g].matched += 1;
            matches += 1;
        }
    }

    let total = records.len() as f64;
    let (mut precision, mut recall, mut f1) = (0.0, 0.0, 0.0);
    for l in &labels {
        if l.gold == 0 {
            continue;
        }
        let p = ratio(l.matched, l.predicted);
        let r = ratio(l.matched, l.gold);
        let f = if p + r > 0.0 { 2.0 * p * r / (p + r) } else { 0.0 };
        let weight = l.gold as f64 / total;
        precision += p * weight;
        recall += r * weight;
        f1 += f * weight;
    }

    Agreement {
        support: records.len(),
        accuracy: matches as f64 / total,
        precision,
        recall,
        f1,
    }
}

fn slot(labels: &mut Vec<LabelCounts>, label: &str) -> usize {
    match labels.iter().position(|l| l.label == label) {
        Some(i) => i,
        None => {
            labels.push(LabelCounts {
                label: label.to_string(),
                gold: 0,
                predicted: 0,
                matched: 0,
            });
            labels.len() - 1
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}
