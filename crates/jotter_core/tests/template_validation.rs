use chrono::{NaiveDate, NaiveDateTime};
use jotter_core::{Estimate, FieldValue, Registry, TemplateError, When};
use std::collections::BTreeMap;

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 8, 28)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

fn fields(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

fn end_of(y: i32, m: u32, d: u32) -> When {
    When::At(
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap(),
    )
}

#[test]
fn empty_task_input_names_the_missing_field() {
    let registry = Registry::builtin();
    let err = registry
        .instantiate("task", &BTreeMap::new(), "", now())
        .unwrap_err();
    match err {
        TemplateError::MissingRequiredField { kind, field } => {
            assert_eq!(kind, "task");
            assert_eq!(field, "task");
        }
        other => panic!("expected MissingRequiredField, got {other}"),
    }
}

#[test]
fn unregistered_type_is_rejected() {
    let registry = Registry::builtin();
    let err = registry
        .instantiate("reminder", &BTreeMap::new(), "", now())
        .unwrap_err();
    assert!(matches!(err, TemplateError::UnknownTemplateType(name) if name == "reminder"));
}

#[test]
fn undeclared_field_is_rejected_with_its_name() {
    let registry = Registry::builtin();
    let err = registry
        .instantiate("task", &fields(&[("task", "x"), ("venue", "home")]), "", now())
        .unwrap_err();
    match err {
        TemplateError::FieldValidation(err) => assert_eq!(err.field, "venue"),
        other => panic!("expected FieldValidation, got {other}"),
    }
}

#[test]
fn task_window_follows_its_due_field() {
    let registry = Registry::builtin();
    let with_due = registry
        .instantiate(
            "task",
            &fields(&[("task", "file taxes"), ("due", "2026-09-01")]),
            "",
            now(),
        )
        .unwrap();
    assert_eq!(with_due.irrelevant_after, end_of(2026, 9, 1));

    let without_due = registry
        .instantiate("task", &fields(&[("task", "someday")]), "", now())
        .unwrap();
    assert_eq!(without_due.irrelevant_after, When::Never);
}

#[test]
fn relative_due_is_anchored_at_creation() {
    let registry = Registry::builtin();
    let record = registry
        .instantiate(
            "task",
            &fields(&[("task", "follow up"), ("due", "3 days")]),
            "",
            now(),
        )
        .unwrap();
    let expected = now() + chrono::Duration::days(3);
    assert_eq!(record.irrelevant_after, When::At(expected));
    // Same raw input and same created instant resolve identically later.
    let again = registry
        .instantiate(
            "task",
            &fields(&[("task", "follow up"), ("due", "3 days")]),
            "",
            now(),
        )
        .unwrap();
    assert_eq!(again.irrelevant_after, record.irrelevant_after);
}

#[test]
fn event_is_never_irrelevant_unless_overridden() {
    let registry = Registry::builtin();
    let plain = registry
        .instantiate("event", &fields(&[("event", "concert")]), "", now())
        .unwrap();
    assert_eq!(plain.irrelevant_after, When::Never);

    let overridden = registry
        .instantiate(
            "event",
            &fields(&[("event", "concert"), ("irrelevant_after", "2026-09-10")]),
            "",
            now(),
        )
        .unwrap();
    assert_eq!(overridden.irrelevant_after, end_of(2026, 9, 10));
}

#[test]
fn prediction_relevance_is_completion_driven_only() {
    let registry = Registry::builtin();
    let record = registry
        .instantiate(
            "prediction",
            &fields(&[
                ("task", "ship the feature"),
                ("expected_completion", "2 business days"),
                ("estimate", "5~1.5"),
            ]),
            "",
            now(),
        )
        .unwrap();
    // An expected completion date never drives irrelevance.
    assert_eq!(record.irrelevant_after, When::Never);
    assert_eq!(
        record.field("estimate"),
        Some(&FieldValue::Estimate(Estimate::Spread { mean: 5.0, std: 1.5 }))
    );
}

#[test]
fn note_defaults_to_never_with_explicit_override() {
    let registry = Registry::builtin();
    let plain = registry
        .instantiate("note", &BTreeMap::new(), "remember this", now())
        .unwrap();
    assert_eq!(plain.irrelevant_after, When::Never);
    assert_eq!(plain.body, "remember this");

    let fading = registry
        .instantiate(
            "note",
            &fields(&[("irrelevant_after", "2 weeks")]),
            "",
            now(),
        )
        .unwrap();
    assert_eq!(
        fading.irrelevant_after,
        When::At(now() + chrono::Duration::weeks(2))
    );
}

#[test]
fn metric_accepts_value_and_timestamp_only() {
    let registry = Registry::builtin();
    let record = registry
        .instantiate(
            "metric",
            &fields(&[("value", "72.5"), ("timestamp", "2026-08-28")]),
            "",
            now(),
        )
        .unwrap();
    assert_eq!(record.irrelevant_after, When::Never);
    assert_eq!(record.field("value"), Some(&FieldValue::Estimate(Estimate::Point(72.5))));

    let err = registry
        .instantiate("metric", &BTreeMap::new(), "", now())
        .unwrap_err();
    assert!(matches!(
        err,
        TemplateError::MissingRequiredField { field, .. } if field == "value"
    ));
}

#[test]
fn bad_date_input_reports_field_and_offending_text() {
    let registry = Registry::builtin();
    let err = registry
        .instantiate(
            "task",
            &fields(&[("task", "x"), ("due", "whenever i feel like it")]),
            "",
            now(),
        )
        .unwrap_err();
    match err {
        TemplateError::FieldValidation(err) => {
            assert_eq!(err.field, "due");
            assert!(err.reason.contains("whenever i feel like it"));
        }
        other => panic!("expected FieldValidation, got {other}"),
    }
}

#[test]
fn tags_are_normalized_and_deduplicated() {
    let registry = Registry::builtin();
    let record = registry
        .instantiate(
            "task",
            &fields(&[("task", "x"), ("tags", "Home, errands, HOME")]),
            "",
            now(),
        )
        .unwrap();
    assert_eq!(record.tags, ["errands", "home"]);
}
