use chrono::{NaiveDate, NaiveDateTime};
use jotter_core::{EngineConfig, NoteService};
use tempfile::TempDir;

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 8, 28)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

// A hand-written note with idiosyncratic spacing the engine must not touch.
const HAND_WRITTEN: &str = "Call the dentist about the crown.

Maybe ask about the invoice too.

---
type: task
created: 2026-08-20T09:15:00
task:    call dentist
due:  2026-09-05
completed: false
tags: health,  admin
";

#[test]
fn completing_rewrites_only_the_completion_lines() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("20260820T091500-task.md");
    std::fs::write(&path, HAND_WRITTEN).unwrap();

    let config = EngineConfig::new(dir.path()).unwrap();
    let service = NoteService::new(&config).unwrap();
    let id = jotter_core::ident::derive(&path);
    service.complete(&id, now()).unwrap();

    let after = std::fs::read_to_string(&path).unwrap();
    let before_lines: Vec<&str> = HAND_WRITTEN.lines().collect();
    let after_lines: Vec<&str> = after.lines().collect();

    // One appended line (completed_at); everything else aligned by index.
    assert_eq!(after_lines.len(), before_lines.len() + 1);
    for (before, after) in before_lines.iter().zip(after_lines.iter()) {
        if before.starts_with("completed:") {
            assert_eq!(*after, "completed: true");
        } else {
            // Unmutated content survives byte-identically, odd spacing included.
            assert_eq!(after, before);
        }
    }
    assert_eq!(
        after_lines.last().copied(),
        Some("completed_at: 2026-08-28T10:00:00")
    );
}

#[test]
fn trailer_comments_with_colons_do_not_fail_the_note() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("20260820T091600-note.md");
    let text = "Keep this around.

---
type: note
created: 2026-08-20T09:16:00
# remember: ask about the invoice
completed: false
";
    std::fs::write(&path, text).unwrap();

    let config = EngineConfig::new(dir.path()).unwrap();
    let service = NoteService::new(&config).unwrap();
    let report = service.scan().unwrap();
    assert!(report.failures.is_empty());
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].body, "Keep this around.");
}

#[test]
fn parse_mutate_rewrite_recovers_the_body_verbatim() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("20260820T091500-task.md");
    std::fs::write(&path, HAND_WRITTEN).unwrap();

    let config = EngineConfig::new(dir.path()).unwrap();
    let service = NoteService::new(&config).unwrap();
    service.complete(&jotter_core::ident::derive(&path), now()).unwrap();

    let after = std::fs::read_to_string(&path).unwrap();
    let body_before = HAND_WRITTEN.split("---").next().unwrap();
    assert!(after.starts_with(body_before));
}
