//! Key-value trailer with lossless line-level round-trip.
//!
//! # Invariants
//! - Reading never rewrites; mutation touches exactly the matching
//!   `key:` line and leaves every other line byte-identical.
//! - Lines that are not `key: value` pairs (blanks, comments) are
//!   preserved verbatim.

/// The human-editable trailer of a note file, kept as raw lines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Trailer {
    lines: Vec<String>,
}

impl Trailer {
    /// Parses trailer text into preserved lines.
    pub fn parse(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    /// Builds a fresh trailer from ordered key-value pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            lines: pairs
                .into_iter()
                .map(|(key, value)| format!("{key}: {value}"))
                .collect(),
        }
    }

    /// Returns the trimmed raw value of the first line carrying `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.lines.iter().find_map(|line| {
            let (found, value) = line.split_once(':')?;
            (found.trim() == key).then(|| value.trim())
        })
    }

    /// Replaces the value of the first line carrying `key`, or appends a
    /// new line when the key is absent.
    pub fn set(&mut self, key: &str, value: &str) {
        let rendered = format!("{key}: {value}");
        for line in &mut self.lines {
            if let Some((found, _)) = line.split_once(':') {
                if found.trim() == key {
                    *line = rendered;
                    return;
                }
            }
        }
        self.lines.push(rendered);
    }

    /// Iterates `(key, value)` for every key-value line, in file order.
    /// Comment lines are preserved content, never entries, even when they
    /// contain a colon.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.lines.iter().filter_map(|line| {
            if line.trim_start().starts_with('#') {
                return None;
            }
            let (key, value) = line.split_once(':')?;
            let key = key.trim();
            (!key.is_empty()).then_some((key, value.trim()))
        })
    }

    /// Renders the trailer back to text, one line per entry.
    pub fn to_text(&self) -> String {
        let mut text = self.lines.join("\n");
        if !text.is_empty() {
            text.push('\n');
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::Trailer;

    const SAMPLE: &str = "type: task\n# personal reminder\ntask: water plants\ncompleted: false\n";

    #[test]
    fn get_reads_trimmed_values() {
        let trailer = Trailer::parse(SAMPLE);
        assert_eq!(trailer.get("type"), Some("task"));
        assert_eq!(trailer.get("task"), Some("water plants"));
        assert_eq!(trailer.get("missing"), None);
    }

    #[test]
    fn set_touches_only_the_matching_line() {
        let mut trailer = Trailer::parse(SAMPLE);
        trailer.set("completed", "true");
        assert_eq!(
            trailer.to_text(),
            "type: task\n# personal reminder\ntask: water plants\ncompleted: true\n"
        );
    }

    #[test]
    fn set_appends_when_the_key_is_absent() {
        let mut trailer = Trailer::parse("type: note\n");
        trailer.set("completed_at", "2026-08-28T10:00:00");
        assert_eq!(
            trailer.to_text(),
            "type: note\ncompleted_at: 2026-08-28T10:00:00\n"
        );
    }

    #[test]
    fn unmutated_content_round_trips_byte_identically() {
        let trailer = Trailer::parse(SAMPLE);
        assert_eq!(trailer.to_text(), SAMPLE);
    }

    #[test]
    fn entries_skip_non_pair_lines() {
        let trailer = Trailer::parse(SAMPLE);
        let keys: Vec<&str> = trailer.entries().map(|(key, _)| key).collect();
        assert_eq!(keys, ["type", "task", "completed"]);
    }

    #[test]
    fn comments_with_colons_are_preserved_but_never_entries() {
        let text = "type: note\n# remember: call back tomorrow\ncompleted: false\n";
        let trailer = Trailer::parse(text);
        let keys: Vec<&str> = trailer.entries().map(|(key, _)| key).collect();
        assert_eq!(keys, ["type", "completed"]);
        assert_eq!(trailer.to_text(), text);
    }
}
