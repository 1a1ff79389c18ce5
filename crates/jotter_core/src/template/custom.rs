//! Custom template root loading.
//!
//! A custom root holds `<kind>.yaml` files that replace the built-in
//! schema for that kind. Declarations are data only; the kind set stays
//! closed and statically analyzable.

use crate::model::field::FieldKind;
use crate::model::note::NoteKind;
use crate::template::{FieldDef, IrrelevanceRule, TemplateError, TemplateResult, TemplateSchema};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct SchemaFile {
    #[serde(default)]
    fields: Vec<FieldSpec>,
    /// Name of the date field driving irrelevance, or `never`.
    #[serde(default)]
    irrelevant_after: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FieldSpec {
    name: String,
    kind: String,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    default: Option<String>,
    #[serde(default)]
    choices: Vec<String>,
}

/// Loads every override present under `root`.
///
/// Only files named after a registered kind are consulted; anything else
/// in the directory is ignored. A present but malformed override is an
/// error, not a skip.
pub(super) fn load_overrides(
    root: &Path,
) -> TemplateResult<Vec<(NoteKind, TemplateSchema)>> {
    let mut overrides = Vec::new();
    for kind in NoteKind::ALL {
        let path = root.join(format!("{}.yaml", kind.as_str()));
        if !path.is_file() {
            continue;
        }
        let text = std::fs::read_to_string(&path).map_err(|err| TemplateError::CustomSchema {
            path: path.clone(),
            reason: err.to_string(),
        })?;
        let file: SchemaFile =
            serde_yaml::from_str(&text).map_err(|err| TemplateError::CustomSchema {
                path: path.clone(),
                reason: err.to_string(),
            })?;
        let schema = build_schema(kind, file, &path)?;
        schema.check_unique_field_names().map_err(|err| {
            TemplateError::CustomSchema {
                path: path.clone(),
                reason: err.to_string(),
            }
        })?;
        overrides.push((kind, schema));
    }
    Ok(overrides)
}

fn build_schema(
    kind: NoteKind,
    file: SchemaFile,
    path: &Path,
) -> TemplateResult<TemplateSchema> {
    let invalid = |reason: String| TemplateError::CustomSchema {
        path: path.to_path_buf(),
        reason,
    };

    let mut fields = Vec::with_capacity(file.fields.len());
    for spec in file.fields {
        let field_kind = match spec.kind.as_str() {
            "text" => FieldKind::Text,
            "date" => FieldKind::Date,
            "duration" => FieldKind::Duration,
            "estimate" => FieldKind::Estimate,
            "choice" => {
                if spec.choices.is_empty() {
                    return Err(invalid(format!(
                        "choice field `{}` declares no choices",
                        spec.name
                    )));
                }
                FieldKind::Choice(spec.choices)
            }
            other => {
                return Err(invalid(format!(
                    "field `{}` has unknown kind `{other}`",
                    spec.name
                )));
            }
        };
        fields.push(FieldDef {
            name: spec.name,
            kind: field_kind,
            required: spec.required,
            default: spec.default,
        });
    }

    let rule = match file.irrelevant_after.as_deref() {
        None | Some("never") => IrrelevanceRule::Never,
        Some(field) => {
            let declared = fields
                .iter()
                .any(|def| def.name == field && def.kind == FieldKind::Date);
            if !declared {
                return Err(invalid(format!(
                    "irrelevant_after names `{field}`, which is not a declared date field"
                )));
            }
            IrrelevanceRule::FromField(field.to_string())
        }
    };

    Ok(TemplateSchema { kind, fields, rule })
}
