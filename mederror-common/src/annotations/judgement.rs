//! Judgement tag classification
//!
//! Records keep the raw tag exactly as found in the file; histograms key on
//! that raw string. [`JudgementKind`] is only used for display labels and
//! colouring, so unfamiliar spellings degrade to [`JudgementKind::Other`].

use serde::Serialize;

/// Outcome class of a judged sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JudgementKind {
    TruePositive,
    FalsePositive,
    FalseNegative,
    TrueNegative,
    Partial,
    Other,
}

impl JudgementKind {
    /// Classify a raw tag leniently.
    ///
    /// Case, `_`, `-` and spaces are ignored, so `FP`, `fp`,
    /// `false_positive` and `False Positive` all classify the same.
    pub fn classify(raw: &str) -> Self {
        let folded: String = raw
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match folded.as_str() {
            "tp" | "truepositive" => JudgementKind::TruePositive,
            "fp" | "falsepositive" => JudgementKind::FalsePositive,
            "fn" | "falsenegative" => JudgementKind::FalseNegative,
            "tn" | "truenegative" => JudgementKind::TrueNegative,
            "partial" | "pp" | "partialpositive" | "partialmatch" => JudgementKind::Partial,
            _ => JudgementKind::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            JudgementKind::TruePositive => "True positive",
            JudgementKind::FalsePositive => "False positive",
            JudgementKind::FalseNegative => "False negative",
            JudgementKind::TrueNegative => "True negative",
            JudgementKind::Partial => "Partial",
            JudgementKind::Other => "Other",
        }
    }

    /// Whether this outcome represents a disagreement with the gold label
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            JudgementKind::FalsePositive | JudgementKind::FalseNegative | JudgementKind::Partial
        )
    }
}
