//! File-backed note store.
//!
//! # Responsibility
//! - Enumerate, read, and atomically rewrite individual note files.
//! - Keep the on-disk format (free-text body + key-value trailer)
//!   round-trippable without disturbing human-written content.
//!
//! # Invariants
//! - Writes go through write-to-temp-then-rename; an existing file is
//!   never left half-written.
//! - A single unreadable or malformed file is a per-item error, never a
//!   store-wide failure.

pub mod trailer;

use crate::model::note::NoteRecord;
use crate::template::{Registry, TemplateError};
use chrono::{NaiveDateTime, ParseError};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use trailer::Trailer;
use walkdir::WalkDir;

/// Timestamp format used in trailers and generated file names.
const CREATED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const FILE_NAME_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Trailer keys managed by the engine rather than by a template schema.
const RESERVED_KEYS: [&str; 4] = ["type", "created", "completed", "completed_at"];

pub type StoreResult<T> = Result<T, StoreError>;

/// Per-file store failures.
#[derive(Debug)]
pub enum StoreError {
    Io { path: PathBuf, source: io::Error },
    MissingTrailer(PathBuf),
    Malformed { path: PathBuf, reason: String },
    Template { path: PathBuf, source: TemplateError },
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn malformed(path: &Path, reason: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "io error on `{}`: {source}", path.display())
            }
            Self::MissingTrailer(path) => {
                write!(f, "`{}` has no trailer section", path.display())
            }
            Self::Malformed { path, reason } => {
                write!(f, "malformed note `{}`: {reason}", path.display())
            }
            Self::Template { path, source } => {
                write!(f, "invalid note `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Template { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// A note file split into its verbatim body and parsed trailer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Everything before the trailer delimiter, byte-for-byte.
    pub body: String,
    pub trailer: Trailer,
}

impl Document {
    /// Splits raw file text at the last `---` delimiter line.
    pub fn parse(path: &Path, text: &str) -> StoreResult<Self> {
        let mut delimiter: Option<(usize, usize)> = None;
        let mut offset = 0;
        for line in text.split_inclusive('\n') {
            if line.trim_end_matches(['\n', '\r']).trim() == "---" {
                delimiter = Some((offset, offset + line.len()));
            }
            offset += line.len();
        }
        let (body_end, trailer_start) =
            delimiter.ok_or_else(|| StoreError::MissingTrailer(path.to_path_buf()))?;
        Ok(Self {
            body: text[..body_end].to_string(),
            trailer: Trailer::parse(&text[trailer_start..]),
        })
    }

    /// Renders the document back to file text.
    pub fn render(&self) -> String {
        format!("{}---\n{}", self.body, self.trailer.to_text())
    }
}

/// Directory-of-files note store.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Enumerates every regular, non-hidden file under the root, sorted by
    /// file name for deterministic scans.
    pub fn paths(&self) -> StoreResult<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.map_err(|err| {
                let path = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| self.root.clone());
                StoreError::Malformed {
                    path,
                    reason: err.to_string(),
                }
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            paths.push(entry.into_path());
        }
        Ok(paths)
    }

    /// Reads and validates one note file through the registry.
    pub fn read_note(&self, path: &Path, registry: &Registry) -> StoreResult<NoteRecord> {
        let document = self.read_document(path)?;
        let trailer = &document.trailer;

        let kind_name = trailer
            .get("type")
            .ok_or_else(|| StoreError::malformed(path, "missing `type` key in trailer"))?
            .to_string();
        let created_raw = trailer
            .get("created")
            .ok_or_else(|| StoreError::malformed(path, "missing `created` key in trailer"))?;
        let created = parse_created(created_raw)
            .map_err(|err| StoreError::malformed(path, format!("bad `created` value: {err}")))?;
        let completed = matches!(trailer.get("completed"), Some("true"));

        let mut raw_fields = BTreeMap::new();
        for (key, value) in trailer.entries() {
            if RESERVED_KEYS.contains(&key) {
                continue;
            }
            raw_fields.insert(key.to_string(), value.to_string());
        }

        let mut record = registry
            .instantiate(&kind_name, &raw_fields, document.body.trim_end(), created)
            .map_err(|source| StoreError::Template {
                path: path.to_path_buf(),
                source,
            })?;
        record.completed = completed;
        Ok(record.at_path(path.to_path_buf()))
    }

    /// Reads a note file without interpreting it, for in-place mutation.
    pub fn read_document(&self, path: &Path) -> StoreResult<Document> {
        let text = fs::read_to_string(path).map_err(|err| StoreError::io(path, err))?;
        Document::parse(path, &text)
    }

    /// Rewrites a note file atomically.
    pub fn write_document(&self, path: &Path, document: &Document) -> StoreResult<()> {
        let parent = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or(&self.root);
        let file_name = path
            .file_name()
            .ok_or_else(|| StoreError::malformed(path, "path has no file name"))?;
        let tmp = parent.join(format!(".{}.tmp", file_name.to_string_lossy()));
        fs::write(&tmp, document.render()).map_err(|err| StoreError::io(&tmp, err))?;
        fs::rename(&tmp, path).map_err(|err| StoreError::io(path, err))
    }

    /// Target path for a freshly recorded note.
    ///
    /// Names carry second granularity, so a same-second collision gets a
    /// numeric suffix; an existing note is never overwritten.
    pub fn path_for_new(&self, kind_name: &str, created: NaiveDateTime) -> PathBuf {
        let stem = format!("{}-{kind_name}", created.format(FILE_NAME_FORMAT));
        let candidate = self.root.join(format!("{stem}.md"));
        if !candidate.exists() {
            return candidate;
        }
        let mut counter = 2u32;
        loop {
            let candidate = self.root.join(format!("{stem}-{counter}.md"));
            if !candidate.exists() {
                return candidate;
            }
            counter += 1;
        }
    }
}

pub(crate) fn parse_created(raw: &str) -> Result<NaiveDateTime, ParseError> {
    NaiveDateTime::parse_from_str(raw, CREATED_FORMAT)
}

pub(crate) fn format_created(created: NaiveDateTime) -> String {
    created.format(CREATED_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::{Document, StoreError};
    use std::path::Path;

    const NOTE: &str = "Water the plants.\n\n---\ntype: task\ncreated: 2026-08-28T10:00:00\ntask: water plants\ncompleted: false\n";

    #[test]
    fn split_at_last_delimiter_preserves_body() {
        let doc = Document::parse(Path::new("x.md"), NOTE).unwrap();
        assert_eq!(doc.body, "Water the plants.\n\n");
        assert_eq!(doc.trailer.get("task"), Some("water plants"));
        assert_eq!(doc.render(), NOTE);
    }

    #[test]
    fn body_may_contain_earlier_delimiters() {
        let text = "intro\n---\nmiddle section\n---\ntype: note\ncreated: 2026-08-28T10:00:00\n";
        let doc = Document::parse(Path::new("x.md"), text).unwrap();
        assert_eq!(doc.body, "intro\n---\nmiddle section\n");
        assert_eq!(doc.trailer.get("type"), Some("note"));
        assert_eq!(doc.render(), text);
    }

    #[test]
    fn missing_delimiter_is_a_missing_trailer() {
        let err = Document::parse(Path::new("x.md"), "just text\n").unwrap_err();
        assert!(matches!(err, StoreError::MissingTrailer(_)));
    }
}
