//! Path-derived note identifiers.
//!
//! # Responsibility
//! - Derive short, stable, human-typeable identifiers from note file names.
//! - Resolve an identifier back to its path over a known path set.
//!
//! # Invariants
//! - Derivation is a pure function of the file name component.
//! - Prefix collisions are surfaced as errors, never resolved to the
//!   first match.

use sha2::{Digest, Sha256};
use std::error::Error;
use std::fmt::{Display, Formatter, Write};
use std::path::{Path, PathBuf};

/// Hex characters kept from the digest. Ten characters give 40 bits of
/// identifier space, far beyond personal-collection scale.
pub const ID_WIDTH: usize = 10;

/// Short hash identifier for one note file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NoteId(String);

impl NoteId {
    /// Wraps user-typed identifier input, normalized to lowercase.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub type IdentResult<T> = Result<T, IdentError>;

/// Identifier resolution failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentError {
    /// No known path derives to the identifier.
    NotFound(NoteId),
    /// More than one known path derives to the identifier.
    Ambiguous(NoteId),
}

impl Display for IdentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "no note matches identifier `{id}`"),
            Self::Ambiguous(id) => {
                write!(f, "identifier `{id}` matches more than one note")
            }
        }
    }
}

impl Error for IdentError {}

/// Derives the identifier for a note file.
///
/// Only the file name component participates, so a note keeps its
/// identifier when the store root moves.
pub fn derive(path: &Path) -> NoteId {
    let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    let digest = Sha256::digest(name.as_bytes());
    let mut hex = String::with_capacity(ID_WIDTH);
    for byte in digest.iter().take(ID_WIDTH.div_ceil(2)) {
        let _ = write!(hex, "{byte:02x}");
    }
    hex.truncate(ID_WIDTH);
    NoteId(hex)
}

/// Resolves an identifier by rederiving over every known path.
///
/// Linear scan by design; the collection is personal-scale.
pub fn resolve(id: &NoteId, paths: &[PathBuf]) -> IdentResult<PathBuf> {
    let mut matches = paths.iter().filter(|path| derive(path) == *id);
    match (matches.next(), matches.next()) {
        (Some(path), None) => Ok(path.clone()),
        (Some(_), Some(_)) => Err(IdentError::Ambiguous(id.clone())),
        _ => Err(IdentError::NotFound(id.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::{derive, resolve, IdentError, NoteId, ID_WIDTH};
    use std::path::{Path, PathBuf};

    #[test]
    fn derivation_is_deterministic_and_name_sensitive() {
        let a = derive(Path::new("store/20260828T100000-task.md"));
        let b = derive(Path::new("store/20260828T100000-task.md"));
        let c = derive(Path::new("store/20260828T100001-task.md"));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_str().len(), ID_WIDTH);
        assert!(a.as_str().chars().all(|ch| ch.is_ascii_hexdigit()));
    }

    #[test]
    fn resolve_is_the_inverse_of_derive() {
        let paths: Vec<PathBuf> = ["a-task.md", "b-event.md", "c-note.md"]
            .iter()
            .map(|name| PathBuf::from("store").join(name))
            .collect();
        for path in &paths {
            assert_eq!(resolve(&derive(path), &paths).unwrap(), *path);
        }
    }

    #[test]
    fn unknown_identifier_is_not_found() {
        let paths = vec![PathBuf::from("a-task.md")];
        let err = resolve(&NoteId::new("ffffffffff"), &paths).unwrap_err();
        assert!(matches!(err, IdentError::NotFound(_)));
    }

    #[test]
    fn equal_file_names_in_different_directories_are_ambiguous() {
        let paths = vec![
            PathBuf::from("left").join("same.md"),
            PathBuf::from("right").join("same.md"),
        ];
        let err = resolve(&derive(&paths[0]), &paths).unwrap_err();
        assert!(matches!(err, IdentError::Ambiguous(_)));
    }

    #[test]
    fn user_input_is_normalized() {
        let id = NoteId::new(" ABCDEF0123 ");
        assert_eq!(id.as_str(), "abcdef0123");
    }
}
