//! Core engine for jotter, a file-backed personal note collection.
//! This crate is the single source of truth for template, identifier,
//! and lifecycle invariants.

pub mod config;
pub mod ident;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;
pub mod template;
pub mod temporal;

pub use config::{ConfigError, EngineConfig};
pub use ident::{IdentError, NoteId};
pub use logging::{default_log_level, init_logging};
pub use model::field::{Estimate, FieldKind, FieldValidationError, FieldValue};
pub use model::note::{NoteKind, NoteRecord, NoteStatus};
pub use service::note_service::{
    ListFilter, NoteService, ScanFailure, ScanReport, ServiceError,
};
pub use store::{trailer::Trailer, Document, FileStore, StoreError};
pub use template::{FieldDef, IrrelevanceRule, Registry, TemplateError, TemplateSchema};
pub use temporal::{ExprError, When};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
