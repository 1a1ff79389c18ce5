//! Template registry and schema-driven instantiation.
//!
//! # Responsibility
//! - Hold one immutable schema per registered note kind.
//! - Validate raw field input into typed `NoteRecord`s.
//! - Apply per-kind irrelevance rules, honoring explicit overrides.
//!
//! # Invariants
//! - Field names are unique within a schema.
//! - Every schema carries an irrelevance rule; `Never` is the default.
//! - The kind set is closed; custom roots override schemas, never add kinds.

mod builtin;
mod custom;

use crate::model::field::{FieldKind, FieldValidationError, FieldValue};
use crate::model::note::{NoteKind, NoteRecord};
use crate::temporal::{self, ExprError, When};
use chrono::NaiveDateTime;
use log::{info, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Trailer key for the explicit relevance-window override every template
/// accepts.
pub const FIELD_IRRELEVANT_AFTER: &str = "irrelevant_after";
/// Trailer key for the common optional tag list.
pub const FIELD_TAGS: &str = "tags";

/// One declared schema field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    /// Raw default input, validated like supplied input when used.
    pub default: Option<String>,
}

impl FieldDef {
    pub fn required(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: true,
            default: None,
        }
    }

    pub fn optional(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: false,
            default: None,
        }
    }

    pub fn with_default(mut self, raw: &str) -> Self {
        self.default = Some(raw.to_string());
        self
    }
}

/// How a schema computes the relevance window from field values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrrelevanceRule {
    /// Take the named date field's value; absent field means `Never`.
    FromField(String),
    /// Always `Never`; relevance driven only by explicit completion.
    Never,
}

/// Immutable definition of one note kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSchema {
    pub kind: NoteKind,
    pub fields: Vec<FieldDef>,
    pub rule: IrrelevanceRule,
}

impl TemplateSchema {
    fn field_def(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|def| def.name == name)
    }

    fn check_unique_field_names(&self) -> Result<(), TemplateError> {
        let mut seen = BTreeSet::new();
        for def in &self.fields {
            if !seen.insert(def.name.as_str()) {
                return Err(TemplateError::DuplicateField {
                    kind: self.kind.as_str().to_string(),
                    field: def.name.clone(),
                });
            }
        }
        Ok(())
    }
}

pub type TemplateResult<T> = Result<T, TemplateError>;

/// Template lookup, validation, and custom-schema loading failures.
#[derive(Debug)]
pub enum TemplateError {
    UnknownTemplateType(String),
    MissingRequiredField { kind: String, field: String },
    FieldValidation(FieldValidationError),
    DuplicateField { kind: String, field: String },
    Expr(ExprError),
    CustomSchema { path: PathBuf, reason: String },
}

impl Display for TemplateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownTemplateType(name) => {
                write!(f, "unknown template type `{name}`")
            }
            Self::MissingRequiredField { kind, field } => {
                write!(f, "template `{kind}` requires field `{field}`")
            }
            Self::FieldValidation(err) => write!(f, "{err}"),
            Self::DuplicateField { kind, field } => {
                write!(f, "template `{kind}` declares field `{field}` twice")
            }
            Self::Expr(err) => write!(f, "{err}"),
            Self::CustomSchema { path, reason } => {
                write!(f, "invalid custom template `{}`: {reason}", path.display())
            }
        }
    }
}

impl Error for TemplateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::FieldValidation(err) => Some(err),
            Self::Expr(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FieldValidationError> for TemplateError {
    fn from(value: FieldValidationError) -> Self {
        Self::FieldValidation(value)
    }
}

impl From<ExprError> for TemplateError {
    fn from(value: ExprError) -> Self {
        Self::Expr(value)
    }
}

/// Registry of all usable template schemas.
#[derive(Debug)]
pub struct Registry {
    schemas: BTreeMap<NoteKind, TemplateSchema>,
}

impl Registry {
    /// Builds the registry from the built-in schema set only.
    pub fn builtin() -> Self {
        Self {
            schemas: builtin::schemas(),
        }
    }

    /// Builds the registry with a custom template root consulted before
    /// the built-in set.
    ///
    /// A `<kind>.yaml` file under `root` replaces that kind's built-in
    /// schema. Malformed files fail construction; they are never skipped.
    pub fn with_custom_root(root: &Path) -> TemplateResult<Self> {
        let mut schemas = builtin::schemas();
        for (kind, schema) in custom::load_overrides(root)? {
            info!(
                "event=template_override module=template kind={} root={}",
                kind.as_str(),
                root.display()
            );
            schemas.insert(kind, schema);
        }
        Ok(Self { schemas })
    }

    /// Looks up the schema registered for a kind name.
    pub fn schema_for(&self, kind_name: &str) -> TemplateResult<&TemplateSchema> {
        let kind = NoteKind::parse(kind_name)
            .ok_or_else(|| TemplateError::UnknownTemplateType(kind_name.to_string()))?;
        self.schemas
            .get(&kind)
            .ok_or_else(|| TemplateError::UnknownTemplateType(kind_name.to_string()))
    }

    /// Validates raw field input against a schema and builds a record.
    ///
    /// `created` doubles as the anchor for relative date expressions, so a
    /// persisted `due: 3 days` resolves identically on every rescan. The
    /// returned record is unbound; callers attach the storage path via
    /// `NoteRecord::at_path`.
    pub fn instantiate(
        &self,
        kind_name: &str,
        raw_fields: &BTreeMap<String, String>,
        body: &str,
        created: NaiveDateTime,
    ) -> TemplateResult<NoteRecord> {
        let schema = self.schema_for(kind_name)?;
        schema.check_unique_field_names()?;

        if schema.kind == NoteKind::Metric {
            // The metric template is intentionally a stub: value and
            // timestamp only, no irrelevance behavior of its own.
            warn!("event=template_stub module=template kind=metric status=partial");
        }

        for name in raw_fields.keys() {
            let known = schema.field_def(name).is_some()
                || name == FIELD_IRRELEVANT_AFTER
                || name == FIELD_TAGS;
            if !known {
                return Err(FieldValidationError {
                    field: name.clone(),
                    reason: format!(
                        "not declared by template `{}`",
                        schema.kind.as_str()
                    ),
                }
                .into());
            }
        }

        let mut fields = BTreeMap::new();
        for def in &schema.fields {
            let raw = raw_fields
                .get(&def.name)
                .map(String::as_str)
                .or(def.default.as_deref());
            match raw {
                Some(raw) => {
                    let value = def.kind.validate(&def.name, raw, created)?;
                    fields.insert(def.name.clone(), value);
                }
                None if def.required => {
                    return Err(TemplateError::MissingRequiredField {
                        kind: schema.kind.as_str().to_string(),
                        field: def.name.clone(),
                    });
                }
                None => {}
            }
        }

        let irrelevant_after =
            compute_window(schema, &fields, raw_fields.get(FIELD_IRRELEVANT_AFTER), created)?;
        let tags = parse_tags(raw_fields.get(FIELD_TAGS).map(String::as_str));

        Ok(NoteRecord {
            kind: schema.kind,
            fields,
            body: body.to_string(),
            path: PathBuf::new(),
            id: crate::ident::derive(Path::new("")),
            created,
            completed: false,
            tags,
            irrelevant_after,
        })
    }
}

/// Applies the explicit override, falling back to the schema rule.
fn compute_window(
    schema: &TemplateSchema,
    fields: &BTreeMap<String, FieldValue>,
    override_raw: Option<&String>,
    created: NaiveDateTime,
) -> TemplateResult<When> {
    if let Some(raw) = override_raw {
        return Ok(temporal::parse(raw, created)?);
    }
    match &schema.rule {
        IrrelevanceRule::FromField(name) => match fields.get(name.as_str()) {
            Some(FieldValue::Date(when)) => Ok(*when),
            _ => Ok(When::Never),
        },
        IrrelevanceRule::Never => Ok(When::Never),
    }
}

/// Splits tag input, normalized to lowercase the way tags are stored.
///
/// Accepts either a comma-separated list or a YAML flow sequence.
fn parse_tags(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        if let Ok(list) = serde_yaml::from_str::<Vec<String>>(trimmed) {
            return normalize_tags(list);
        }
    }
    normalize_tags(trimmed.split(',').map(str::to_string).collect())
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = tags
        .into_iter()
        .map(|tag| tag.trim().to_ascii_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect();
    normalized.sort();
    normalized.dedup();
    normalized
}
