//! Explicit state for one viewer session
//!
//! Holds the current taxonomy and record set together with the filenames
//! they came from. Every load parses completely before anything is
//! replaced, so a failed load leaves the previous data active. Mutating
//! methods return the [`SessionEvent`] describing the change; broadcasting
//! it is up to the caller.

use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::{info, warn};

use crate::aggregate::{self, Summary};
use crate::annotations::AnnotationSet;
use crate::editor::{self, EditOutcome};
use crate::error::read_user_file;
use crate::events::SessionEvent;
use crate::export::{self, ExportFile, ExportFormat};
use crate::taxonomy::Taxonomy;
use crate::Result;

/// A loaded value and where it came from
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub value: T,
    pub filename: Option<String>,
    /// Session generation at which this value was installed
    pub generation: u64,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct Session {
    taxonomy: Option<Loaded<Taxonomy>>,
    annotations: Option<Loaded<AnnotationSet>>,
    generation: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Incremented by every successful load or clear
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn taxonomy(&self) -> Option<&Taxonomy> {
        self.taxonomy.as_ref().map(|l| &l.value)
    }

    pub fn taxonomy_source(&self) -> Option<&Loaded<Taxonomy>> {
        self.taxonomy.as_ref()
    }

    pub fn annotations(&self) -> Option<&AnnotationSet> {
        self.annotations.as_ref().map(|l| &l.value)
    }

    pub fn annotations_source(&self) -> Option<&Loaded<AnnotationSet>> {
        self.annotations.as_ref()
    }

    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Parse and install a taxonomy; on error the current one stays
    pub fn load_taxonomy(&mut self, text: &str, filename: Option<String>) -> Result<SessionEvent> {
        match Taxonomy::from_yaml_str(text) {
            Ok(taxonomy) => Ok(self.install_taxonomy(taxonomy, filename)),
            Err(e) => {
                warn!("Rejected taxonomy {}: {}", display_name(&filename), e);
                Err(e)
            }
        }
    }

    /// Replace the taxonomy with an already-parsed one
    pub fn install_taxonomy(&mut self, taxonomy: Taxonomy, filename: Option<String>) -> SessionEvent {
        let generation = self.next_generation();
        let (categories, types) = (taxonomy.category_count(), taxonomy.type_count());
        info!(
            "Loaded taxonomy {} ({} categories, {} types)",
            display_name(&filename),
            categories,
            types
        );

        self.taxonomy = Some(Loaded {
            value: taxonomy,
            filename: filename.clone(),
            generation,
            loaded_at: Utc::now(),
        });

        SessionEvent::TaxonomyLoaded {
            filename,
            categories,
            types,
            generation,
            timestamp: Utc::now(),
        }
    }

    /// Parse and install an annotation file; on error the current set stays
    pub fn load_annotations(&mut self, text: &str, filename: Option<String>) -> Result<SessionEvent> {
        match AnnotationSet::from_json_str(text) {
            Ok(set) => Ok(self.install_annotations(set, filename)),
            Err(e) => {
                warn!("Rejected annotations {}: {}", display_name(&filename), e);
                Err(e)
            }
        }
    }

    /// Replace the record set with an already-parsed one
    pub fn install_annotations(&mut self, set: AnnotationSet, filename: Option<String>) -> SessionEvent {
        let generation = self.next_generation();
        let records = set.len();
        let schema = set.schema().name().to_string();
        info!(
            "Loaded annotations {} ({} records, {} layout)",
            display_name(&filename),
            records,
            schema
        );

        self.annotations = Some(Loaded {
            value: set,
            filename: filename.clone(),
            generation,
            loaded_at: Utc::now(),
        });

        SessionEvent::AnnotationsLoaded {
            filename,
            records,
            schema,
            generation,
            timestamp: Utc::now(),
        }
    }

    pub fn load_taxonomy_file(&mut self, path: &Path) -> Result<SessionEvent> {
        let text = read_user_file(path)?;
        self.load_taxonomy(&text, file_name_of(path))
    }

    pub fn load_annotations_file(&mut self, path: &Path) -> Result<SessionEvent> {
        let text = read_user_file(path)?;
        self.load_annotations(&text, file_name_of(path))
    }

    pub fn clear_annotations(&mut self) -> SessionEvent {
        let generation = self.next_generation();
        if self.annotations.take().is_some() {
            info!("Cleared annotations");
        }
        SessionEvent::AnnotationsCleared {
            generation,
            timestamp: Utc::now(),
        }
    }

    /// Reassign one error's type; see [`editor::reassign`].
    ///
    /// Returns the event to broadcast when something changed.
    pub fn reassign(
        &mut self,
        record_id: u64,
        error_index: usize,
        new_type: &str,
    ) -> (EditOutcome, Option<SessionEvent>) {
        let taxonomy = self.taxonomy.as_ref().map(|l| &l.value);
        let Some(loaded) = self.annotations.as_mut() else {
            return (EditOutcome::NoTarget, None);
        };

        let outcome = editor::reassign(&mut loaded.value, taxonomy, record_id, error_index, new_type);
        let event = match &outcome {
            EditOutcome::Reassigned { category } | EditOutcome::TypeOnly { category } => {
                Some(SessionEvent::RecordEdited {
                    record_id,
                    error_index,
                    category: category.clone(),
                    error_type: new_type.to_string(),
                    timestamp: Utc::now(),
                })
            }
            EditOutcome::NoTarget => None,
        };
        (outcome, event)
    }

    /// Summary over the current records, `None` if nothing is loaded
    pub fn summary(&self) -> Option<Summary> {
        self.annotations()
            .map(|set| aggregate::summary(set.records(), self.taxonomy()))
    }

    /// Render the current records, `None` if nothing is loaded
    pub fn export(&self, format: ExportFormat) -> Result<Option<ExportFile>> {
        let Some(loaded) = self.annotations.as_ref() else {
            return Ok(None);
        };
        let file = export::export(&loaded.value, format, loaded.filename.as_deref())?;
        info!("Exported {} records as {}", loaded.value.len(), file.file_name);
        Ok(Some(file))
    }
}

fn file_name_of(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

fn display_name(filename: &Option<String>) -> &str {
    filename.as_deref().unwrap_or("<unnamed>")
}
