//! In-place re-categorization of error assignments

use serde::Serialize;
use tracing::debug;

use crate::annotations::AnnotationSet;
use crate::taxonomy::Taxonomy;

/// What a reassignment actually did.
///
/// None of these is an error: unresolvable targets and unknown types are
/// tolerated so a stale UI never fails an edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EditOutcome {
    /// Type set and category taken from the owning taxonomy category
    Reassigned { category: String },
    /// Type set; not found in the taxonomy, so the category was kept
    TypeOnly { category: String },
    /// Record id or error index did not resolve; nothing changed
    NoTarget,
}

impl EditOutcome {
    pub fn changed_anything(&self) -> bool {
        !matches!(self, EditOutcome::NoTarget)
    }
}

/// Set the type of one error assignment and re-derive its category.
///
/// `error_index` is 0-based within the record's error list.
pub fn reassign(
    set: &mut AnnotationSet,
    taxonomy: Option<&Taxonomy>,
    record_id: u64,
    error_index: usize,
    new_type: &str,
) -> EditOutcome {
    let Some(record) = set.get_mut(record_id) else {
        debug!(record_id, "reassign: no such record");
        return EditOutcome::NoTarget;
    };
    let Some(assignment) = record.errors.get_mut(error_index) else {
        debug!(record_id, error_index, "reassign: error index out of range");
        return EditOutcome::NoTarget;
    };

    assignment.error_type = new_type.to_string();

    match taxonomy.and_then(|t| t.owning_category(new_type)) {
        Some(category) => {
            assignment.category = category.to_string();
            debug!(record_id, error_index, category, new_type, "reassigned error");
            EditOutcome::Reassigned {
                category: category.to_string(),
            }
        }
        None => {
            debug!(record_id, error_index, new_type, "type not in taxonomy; category kept");
            EditOutcome::TypeOnly {
                category: assignment.category.clone(),
            }
        }
    }
}
