//! Note record and lifecycle status.

use crate::ident::{self, NoteId};
use crate::model::field::FieldValue;
use crate::temporal::When;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Closed enumeration of registered note templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteKind {
    DueDate,
    Event,
    Note,
    Prediction,
    Task,
    Metric,
}

impl NoteKind {
    pub const ALL: [NoteKind; 6] = [
        NoteKind::DueDate,
        NoteKind::Event,
        NoteKind::Note,
        NoteKind::Prediction,
        NoteKind::Task,
        NoteKind::Metric,
    ];

    /// Stable name used in trailers, file names, and template lookups.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DueDate => "due_date",
            Self::Event => "event",
            Self::Note => "note",
            Self::Prediction => "prediction",
            Self::Task => "task",
            Self::Metric => "metric",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim() {
            "due_date" | "due-date" => Some(Self::DueDate),
            "event" => Some(Self::Event),
            "note" => Some(Self::Note),
            "prediction" => Some(Self::Prediction),
            "task" => Some(Self::Task),
            "metric" => Some(Self::Metric),
            _ => None,
        }
    }
}

impl std::fmt::Display for NoteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle view of one record at a given instant.
///
/// `Completed` is persisted and terminal. `Irrelevant` is derived from the
/// relevance window every time it is asked for, so it reverses if the
/// window moves back into the future.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteStatus {
    Open,
    Completed,
    Irrelevant,
}

/// One parsed note file.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteRecord {
    /// Template this record was validated against.
    pub kind: NoteKind,
    /// Typed field values keyed by schema field name.
    pub fields: BTreeMap<String, FieldValue>,
    /// Free-text body preceding the trailer.
    pub body: String,
    /// Storage path; assigned when the record is bound to a file.
    pub path: PathBuf,
    /// Identifier derived from the storage path.
    pub id: NoteId,
    /// Creation instant, also the anchor for relative field expressions.
    pub created: NaiveDateTime,
    /// Persisted completion flag.
    pub completed: bool,
    /// Lowercased tags.
    pub tags: Vec<String>,
    /// Relevance window, computed once at load time from the schema rule.
    pub irrelevant_after: When,
}

impl NoteRecord {
    /// Binds the record to its storage path, rederiving the identifier.
    pub fn at_path(mut self, path: PathBuf) -> Self {
        self.id = ident::derive(&path);
        self.path = path;
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Evaluates lifecycle status at `now`. Completion always wins.
    pub fn status(&self, now: NaiveDateTime) -> NoteStatus {
        if self.completed {
            NoteStatus::Completed
        } else if self.irrelevant_after.is_past(now) {
            NoteStatus::Irrelevant
        } else {
            NoteStatus::Open
        }
    }
}
