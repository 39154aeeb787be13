//! Frequency tables over the current record set
//!
//! Everything here is recomputed from scratch on each call. Keys iterate in
//! first-seen order, so the same input order always yields the same
//! iteration order.

use serde::Serialize;

use crate::annotations::{AnnotationRecord, JudgementKind};
use crate::taxonomy::Taxonomy;

/// One key and its count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistogramEntry {
    pub key: String,
    pub count: usize,
    /// Classification of the key; only set on judgement histograms
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<JudgementKind>,
}

/// Single-level frequency count in first-seen key order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Histogram {
    entries: Vec<HistogramEntry>,
}

impl Histogram {
    fn increment(&mut self, key: &str) {
        match self.entries.iter_mut().find(|e| e.key == key) {
            Some(entry) => entry.count += 1,
            None => self.entries.push(HistogramEntry {
                key: key.to_string(),
                count: 1,
                kind: None,
            }),
        }
    }

    pub fn get(&self, key: &str) -> Option<usize> {
        self.entries.iter().find(|e| e.key == key).map(|e| e.count)
    }

    pub fn entries(&self) -> &[HistogramEntry] {
        &self.entries
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Entries by descending count; ties keep first-seen order
    pub fn sorted_by_count(&self) -> Vec<&HistogramEntry> {
        let mut sorted: Vec<&HistogramEntry> = self.entries.iter().collect();
        sorted.sort_by(|a, b| b.count.cmp(&a.count));
        sorted
    }
}

/// Counts for one category of the error histogram
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    pub category: String,
    pub total: usize,
    pub types: Histogram,
}

/// Two-level count: category, then type within category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorHistogram {
    categories: Vec<CategoryCounts>,
}

impl ErrorHistogram {
    fn increment(&mut self, category: &str, error_type: &str) {
        let idx = match self.categories.iter().position(|c| c.category == category) {
            Some(idx) => idx,
            None => {
                self.categories.push(CategoryCounts {
                    category: category.to_string(),
                    total: 0,
                    types: Histogram::default(),
                });
                self.categories.len() - 1
            }
        };
        let counts = &mut self.categories[idx];
        counts.total += 1;
        counts.types.increment(error_type);
    }

    pub fn get(&self, category: &str, error_type: &str) -> Option<usize> {
        self.category(category).and_then(|c| c.types.get(error_type))
    }

    pub fn category(&self, category: &str) -> Option<&CategoryCounts> {
        self.categories.iter().find(|c| c.category == category)
    }

    pub fn categories(&self) -> &[CategoryCounts] {
        &self.categories
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Total number of assignments counted
    pub fn total(&self) -> usize {
        self.categories.iter().map(|c| c.total).sum()
    }
}

/// Count records per distinct raw judgement value.
///
/// Keys stay raw; each entry also carries the [`JudgementKind`] its key
/// classifies as.
pub fn judgement_histogram(records: &[AnnotationRecord]) -> Histogram {
    let mut histogram = Histogram::default();
    for record in records {
        histogram.increment(&record.judgement);
    }
    for entry in &mut histogram.entries {
        entry.kind = Some(JudgementKind::classify(&entry.key));
    }
    histogram
}

/// Count every error assignment by (category, type).
///
/// A record with N assignments contributes N counts.
pub fn error_histogram<'a>(records: impl IntoIterator<Item = &'a AnnotationRecord>) -> ErrorHistogram {
    let mut histogram = ErrorHistogram::default();
    for record in records {
        for assignment in &record.errors {
            histogram.increment(&assignment.category, &assignment.error_type);
        }
    }
    histogram
}

/// Error histogram restricted to records with the given raw judgement
pub fn error_histogram_for(records: &[AnnotationRecord], judgement: &str) -> ErrorHistogram {
    error_histogram(records.iter().filter(|r| r.judgement == judgement))
}

/// Headline numbers for the summary panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub record_count: usize,
    pub assignment_count: usize,
    pub records_with_errors: usize,
    /// Records judged FP, FN or partial
    pub disagreements: usize,
    /// Assignments whose type is not in the taxonomy (0 without a taxonomy)
    pub dangling_assignments: usize,
    pub judgements: Histogram,
    pub errors: ErrorHistogram,
}

pub fn summary(records: &[AnnotationRecord], taxonomy: Option<&Taxonomy>) -> Summary {
    let assignment_count = records.iter().map(|r| r.errors.len()).sum();
    let records_with_errors = records.iter().filter(|r| !r.errors.is_empty()).count();
    let disagreements = records.iter().filter(|r| r.judgement_kind().is_error()).count();
    let dangling_assignments = match taxonomy {
        Some(t) => records
            .iter()
            .flat_map(|r| r.errors.iter())
            .filter(|e| !t.contains_type(&e.error_type))
            .count(),
        None => 0,
    };

    Summary {
        record_count: records.len(),
        assignment_count,
        records_with_errors,
        disagreements,
        dangling_assignments,
        judgements: judgement_histogram(records),
        errors: error_histogram(records),
    }
}
