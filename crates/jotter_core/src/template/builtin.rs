//! Built-in template schema set.

use crate::model::field::FieldKind;
use crate::model::note::NoteKind;
use crate::template::{FieldDef, IrrelevanceRule, TemplateSchema};
use std::collections::BTreeMap;

/// Returns the schema shipped for every registered note kind.
pub(super) fn schemas() -> BTreeMap<NoteKind, TemplateSchema> {
    let mut schemas = BTreeMap::new();

    schemas.insert(
        NoteKind::Task,
        TemplateSchema {
            kind: NoteKind::Task,
            fields: vec![
                FieldDef::required("task", FieldKind::Text),
                FieldDef::optional("due", FieldKind::Date),
            ],
            rule: IrrelevanceRule::FromField("due".to_string()),
        },
    );

    schemas.insert(
        NoteKind::DueDate,
        TemplateSchema {
            kind: NoteKind::DueDate,
            fields: vec![FieldDef::required("due", FieldKind::Date)],
            rule: IrrelevanceRule::FromField("due".to_string()),
        },
    );

    schemas.insert(
        NoteKind::Event,
        TemplateSchema {
            kind: NoteKind::Event,
            fields: vec![
                FieldDef::required("event", FieldKind::Text),
                FieldDef::optional("starts", FieldKind::Date),
            ],
            rule: IrrelevanceRule::Never,
        },
    );

    // A prediction behaves as a task without a date: never auto-irrelevant,
    // resolved only by explicit completion.
    schemas.insert(
        NoteKind::Prediction,
        TemplateSchema {
            kind: NoteKind::Prediction,
            fields: vec![
                FieldDef::required("task", FieldKind::Text),
                FieldDef::optional("expected_completion", FieldKind::Date),
                FieldDef::optional("estimate", FieldKind::Estimate),
            ],
            rule: IrrelevanceRule::Never,
        },
    );

    schemas.insert(
        NoteKind::Note,
        TemplateSchema {
            kind: NoteKind::Note,
            fields: Vec::new(),
            rule: IrrelevanceRule::Never,
        },
    );

    // Intentionally partial; see the stub warning in Registry::instantiate.
    schemas.insert(
        NoteKind::Metric,
        TemplateSchema {
            kind: NoteKind::Metric,
            fields: vec![
                FieldDef::required("value", FieldKind::Estimate),
                FieldDef::optional("timestamp", FieldKind::Date),
            ],
            rule: IrrelevanceRule::Never,
        },
    );

    schemas
}
