//! Collection scanning and lifecycle transitions.
//!
//! # Responsibility
//! - Enumerate and parse every note in the store, isolating per-file
//!   failures.
//! - List open records in deterministic relevance order.
//! - Perform the complete transition and identifier-to-path resolution.
//!
//! # Invariants
//! - One malformed file never blocks the rest of the collection.
//! - Completion is terminal: once persisted it wins over any window.
//! - Listing order is ascending by window, `never` last, ties broken by
//!   identifier.

use crate::config::{ConfigError, EngineConfig};
use crate::ident::{self, IdentError, NoteId};
use crate::model::note::{NoteKind, NoteRecord, NoteStatus};
use crate::store::trailer::Trailer;
use crate::store::{format_created, Document, FileStore, StoreError};
use crate::template::{Registry, TemplateError};
use chrono::NaiveDateTime;
use log::{info, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failures raised by collection-level operations.
#[derive(Debug)]
pub enum ServiceError {
    Config(ConfigError),
    Store(StoreError),
    Template(TemplateError),
    Ident(IdentError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Template(err) => write!(f, "{err}"),
            Self::Ident(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Template(err) => Some(err),
            Self::Ident(err) => Some(err),
        }
    }
}

impl From<ConfigError> for ServiceError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<TemplateError> for ServiceError {
    fn from(value: TemplateError) -> Self {
        Self::Template(value)
    }
}

impl From<IdentError> for ServiceError {
    fn from(value: IdentError) -> Self {
        Self::Ident(value)
    }
}

/// One file that failed to parse during a scan.
#[derive(Debug)]
pub struct ScanFailure {
    pub path: PathBuf,
    pub error: StoreError,
}

/// Everything a full scan produced: parsed records plus isolated failures.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub records: Vec<NoteRecord>,
    pub failures: Vec<ScanFailure>,
}

/// Listing options.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    /// Restrict to one kind; `None` lists all kinds.
    pub kind: Option<NoteKind>,
    /// Keep records whose relevance window has already passed.
    pub include_irrelevant: bool,
    /// Keep records already completed.
    pub include_completed: bool,
}

/// Collection scanner and lifecycle engine over one note store.
pub struct NoteService {
    store: FileStore,
    registry: Registry,
}

impl NoteService {
    /// Builds the service from validated configuration.
    pub fn new(config: &EngineConfig) -> ServiceResult<Self> {
        let registry = match config.template_root() {
            Some(root) => Registry::with_custom_root(root)?,
            None => Registry::builtin(),
        };
        Ok(Self {
            store: FileStore::new(config.store_root.clone()),
            registry,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Lazily parses every note file; each item is one parsed record or
    /// one isolated failure. Restart by calling again.
    pub fn scan_iter(
        &self,
    ) -> ServiceResult<impl Iterator<Item = Result<NoteRecord, ScanFailure>> + '_> {
        let paths = self.store.paths()?;
        Ok(paths.into_iter().map(move |path| {
            self.store
                .read_note(&path, &self.registry)
                .map_err(|error| ScanFailure { path, error })
        }))
    }

    /// Parses the whole store, collecting failures instead of aborting.
    pub fn scan(&self) -> ServiceResult<ScanReport> {
        let mut report = ScanReport::default();
        for outcome in self.scan_iter()? {
            match outcome {
                Ok(record) => report.records.push(record),
                Err(failure) => {
                    warn!(
                        "event=scan_skip module=service path={} reason={}",
                        failure.path.display(),
                        failure.error
                    );
                    report.failures.push(failure);
                }
            }
        }
        Ok(report)
    }

    /// Lists records at `now`, sorted ascending by relevance window with
    /// `never` last; ties broken by identifier for determinism.
    pub fn list(&self, filter: &ListFilter, now: NaiveDateTime) -> ServiceResult<Vec<NoteRecord>> {
        let mut records: Vec<NoteRecord> = self
            .scan()?
            .records
            .into_iter()
            .filter(|record| match filter.kind {
                Some(kind) => record.kind == kind,
                None => true,
            })
            .filter(|record| match record.status(now) {
                NoteStatus::Open => true,
                NoteStatus::Completed => filter.include_completed,
                NoteStatus::Irrelevant => filter.include_irrelevant,
            })
            .collect();
        records.sort_by(|a, b| {
            a.irrelevant_after
                .cmp(&b.irrelevant_after)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(records)
    }

    /// Instantiates a new record through the registry and persists it.
    pub fn record(
        &self,
        kind_name: &str,
        raw_fields: &BTreeMap<String, String>,
        body: &str,
        now: NaiveDateTime,
    ) -> ServiceResult<NoteRecord> {
        let record = self.registry.instantiate(kind_name, raw_fields, body, now)?;
        let path = self.store.path_for_new(record.kind.as_str(), now);

        let mut pairs: Vec<(&str, &str)> = vec![("type", record.kind.as_str())];
        let created = format_created(now);
        pairs.push(("created", &created));
        for (key, value) in raw_fields {
            pairs.push((key.as_str(), value.as_str()));
        }
        pairs.push(("completed", "false"));

        let document = Document {
            body: render_body(body),
            trailer: Trailer::from_pairs(pairs),
        };
        self.store.write_document(&path, &document)?;

        let record = record.at_path(path);
        info!(
            "event=note_recorded module=service kind={} id={} path={}",
            record.kind.as_str(),
            record.id,
            record.path.display()
        );
        Ok(record)
    }

    /// Marks the identified note completed and rewrites its file.
    ///
    /// Re-completing an already-completed note is an idempotent no-op.
    /// Only the `completed`/`completed_at` trailer lines change; every
    /// other trailer byte survives the rewrite untouched.
    pub fn complete(&self, id: &NoteId, now: NaiveDateTime) -> ServiceResult<()> {
        let path = self.resolve_for_edit(id)?;
        // Validate before mutating so a malformed note fails loudly here
        // rather than surfacing later as a scan error.
        let record = self.store.read_note(&path, &self.registry)?;
        if record.completed {
            info!(
                "event=note_complete module=service id={id} status=noop reason=already_completed"
            );
            return Ok(());
        }

        let mut document = self.store.read_document(&path)?;
        document.trailer.set("completed", "true");
        document.trailer.set("completed_at", &format_created(now));
        self.store.write_document(&path, &document)?;
        info!(
            "event=note_complete module=service id={id} path={}",
            path.display()
        );
        Ok(())
    }

    /// Resolves an identifier to its storage path for an external editor.
    pub fn resolve_for_edit(&self, id: &NoteId) -> ServiceResult<PathBuf> {
        let paths = self.store.paths()?;
        Ok(ident::resolve(id, &paths)?)
    }
}

/// Normalizes a body for persistence: trailing newline before the
/// delimiter, blank line separating text from trailer.
fn render_body(body: &str) -> String {
    let trimmed = body.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}\n\n")
    }
}
