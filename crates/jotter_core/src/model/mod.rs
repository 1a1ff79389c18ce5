//! Domain model for typed note records.
//!
//! # Responsibility
//! - Define the tagged field-value variants shared by every template.
//! - Define the canonical note record and its lifecycle view.
//!
//! # Invariants
//! - Every record is identified by a stable path-derived `NoteId`.
//! - Completion is persisted state; irrelevance is a derived view.

pub mod field;
pub mod note;
