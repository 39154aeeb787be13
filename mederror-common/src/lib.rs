//! # MedError Common Library
//!
//! Core of the medical-text error-annotation viewer:
//! - Taxonomy loading (YAML category → type → description)
//! - Annotation record loading (JSON, two record layouts)
//! - Judgement and error histograms, label agreement
//! - Error reassignment and JSON/CSV export
//! - Session state, change events and configuration

pub mod aggregate;
pub mod agreement;
pub mod annotations;
pub mod config;
pub mod editor;
pub mod error;
pub mod events;
pub mod export;
pub mod session;
pub mod sse;
pub mod taxonomy;

pub use annotations::{AnnotationRecord, AnnotationSet, ErrorAssignment};
pub use error::{Error, Result};
pub use session::Session;
pub use taxonomy::Taxonomy;
