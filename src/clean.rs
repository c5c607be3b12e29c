//! Matrix identifier cleanup.
//!
//! Exported Matrix dumps carry fully-qualified identifiers like
//! `!abc123:matrix.example.org` and `@bob_99:example.org`, sometimes with a
//! layer of stray quoting on top. The coding workflow only wants the local
//! part: the room id keeps its `!` sigil, usernames drop the `@`.
//!
//! Cleaning operates on raw [`serde_json::Value`] records so every field
//! the export carries besides `chat_id` / `sender_alias` survives
//! untouched.
//!
//! # Example
//!
//! ```
//! use chatcode::clean::IdCleaner;
//!
//! let cleaner = IdCleaner::new();
//! assert_eq!(cleaner.clean_room_id("!abc123:matrix.example.org"), "!abc123");
//! assert_eq!(cleaner.clean_user_id("@bob_99:example.org"), "bob_99");
//! assert_eq!(cleaner.clean_user_id("\"plainname\""), "plainname");
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde_json::Value;

use crate::error::{ChatcodeError, Result};

/// Cleans protocol suffixes off Matrix room and user identifiers.
///
/// Identifiers that don't match the expected shape fall back to the
/// quote-stripped input rather than failing.
pub struct IdCleaner {
    room: Regex,
    user: Regex,
}

impl IdCleaner {
    pub fn new() -> Self {
        Self {
            // room id: token after the '!' sigil, before ':server'
            room: Regex::new(r"!(\w+)").unwrap(),
            // username: token after an optional '@', before ':server'
            user: Regex::new(r"@?([\w-]+)").unwrap(),
        }
    }

    /// Extracts the local room id, keeping the `!` sigil.
    ///
    /// No match returns the input with quotes stripped.
    pub fn clean_room_id(&self, raw: &str) -> String {
        let stripped = raw.replace('"', "");
        match self.room.captures(&stripped) {
            Some(caps) => format!("!{}", &caps[1]),
            None => stripped,
        }
    }

    /// Extracts the local username, dropping any `@` prefix.
    ///
    /// No match returns the input with quotes stripped.
    pub fn clean_user_id(&self, raw: &str) -> String {
        let stripped = raw.replace('"', "");
        match self.user.captures(&stripped) {
            Some(caps) => caps[1].to_string(),
            None => stripped,
        }
    }

    /// Cleans the `chat_id` and `sender_alias` fields of each record,
    /// leaving every other field as-is.
    pub fn clean_records(&self, records: Vec<Value>) -> Vec<Value> {
        records
            .into_iter()
            .map(|mut record| {
                if let Some(obj) = record.as_object_mut() {
                    if let Some(Value::String(chat_id)) = obj.get("chat_id") {
                        let cleaned = self.clean_room_id(chat_id);
                        obj.insert("chat_id".to_string(), Value::String(cleaned));
                    }
                    if let Some(Value::String(sender)) = obj.get("sender_alias") {
                        let cleaned = self.clean_user_id(sender);
                        obj.insert("sender_alias".to_string(), Value::String(cleaned));
                    }
                }
                record
            })
            .collect()
    }

    /// Cleans one JSON dump, optionally writing the result.
    ///
    /// A top-level object (instead of the usual array) is treated as a
    /// single record; anything else is an error.
    pub fn clean_file(&self, input: &Path, output: Option<&Path>) -> Result<Vec<Value>> {
        let content = fs::read_to_string(input)?;
        let data: Value = serde_json::from_str(&content)
            .map_err(|e| ChatcodeError::parse_json(e, Some(input.to_path_buf())))?;

        let records = match data {
            Value::Array(items) => items,
            obj @ Value::Object(_) => vec![obj],
            other => {
                return Err(ChatcodeError::invalid_input(format!(
                    "expected a list of messages in {}, got {}",
                    input.display(),
                    json_type_name(&other)
                )));
            }
        };

        let cleaned = self.clean_records(records);

        if let Some(path) = output {
            fs::write(path, serde_json::to_string_pretty(&cleaned)?)?;
        }

        Ok(cleaned)
    }
}

impl Default for IdCleaner {
    fn default() -> Self {
        Self::new()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// Outcome of a batch cleaning run: what was written, what was skipped.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Successfully cleaned files with their record counts.
    pub cleaned: Vec<(PathBuf, usize)>,
    /// Files that were skipped, with the reason.
    pub skipped: Vec<(PathBuf, ChatcodeError)>,
}

/// Cleans every file in `input_dir` whose name matches `pattern`
/// (shell-style, `*` and `?` wildcards), writing `cleaned_<name>` files
/// into `output_dir`.
///
/// Unreadable or malformed files are recorded in the report and skipped;
/// they never abort the batch.
pub fn batch_clean(
    cleaner: &IdCleaner,
    input_dir: &Path,
    output_dir: &Path,
    pattern: &str,
) -> Result<BatchReport> {
    let matcher = pattern_to_regex(pattern)?;
    fs::create_dir_all(output_dir)?;

    let mut paths: Vec<PathBuf> = fs::read_dir(input_dir)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| matcher.is_match(name))
        })
        .collect();
    paths.sort();

    let mut report = BatchReport::default();
    for path in paths {
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        let out = output_dir.join(format!("cleaned_{file_name}"));
        match cleaner.clean_file(&path, Some(&out)) {
            Ok(records) => report.cleaned.push((path, records.len())),
            Err(e) => report.skipped.push((path, e)),
        }
    }

    Ok(report)
}

/// Compiles a shell-style file pattern (`*.json`) into an anchored regex.
fn pattern_to_regex(pattern: &str) -> Result<Regex> {
    let mut translated = String::from("^");
    for ch in pattern.chars() {
        match ch {
            '*' => translated.push_str(".*"),
            '?' => translated.push('.'),
            other => translated.push_str(&regex::escape(&other.to_string())),
        }
    }
    translated.push('$');
    Regex::new(&translated).map_err(|e| {
        ChatcodeError::invalid_input(format!("bad file pattern '{pattern}': {e}"))
    })
}

/// Per-room and per-user message counts over a cleaned dump.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanSummary {
    /// Total records.
    pub total: usize,
    /// Message count per chat room, sorted by room id.
    pub rooms: Vec<(String, usize)>,
    /// Message count per user, sorted by username.
    pub users: Vec<(String, usize)>,
}

/// Tallies rooms and users across cleaned records.
pub fn summarize(records: &[Value]) -> CleanSummary {
    let mut rooms: BTreeMap<String, usize> = BTreeMap::new();
    let mut users: BTreeMap<String, usize> = BTreeMap::new();

    for record in records {
        if let Some(room) = record.get("chat_id").and_then(Value::as_str) {
            *rooms.entry(room.to_string()).or_insert(0) += 1;
        }
        if let Some(user) = record.get("sender_alias").and_then(Value::as_str) {
            *users.entry(user.to_string()).or_insert(0) += 1;
        }
    }

    CleanSummary {
        total: records.len(),
        rooms: rooms.into_iter().collect(),
        users: users.into_iter().collect(),
    }
}

impl fmt::Display for CleanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary:")?;
        writeln!(f, "Total messages: {}", self.total)?;
        writeln!(f, "Unique chat rooms: {}", self.rooms.len())?;
        write!(f, "Unique users: {}", self.users.len())?;

        if !self.rooms.is_empty() {
            write!(f, "\n\nChat rooms:")?;
            for (room, count) in &self.rooms {
                write!(f, "\n  {room}: {count} messages")?;
            }
        }
        if !self.users.is_empty() {
            write!(f, "\n\nUsers:")?;
            for (user, count) in &self.users {
                write!(f, "\n  {user}: {count} messages")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clean_room_id() {
        let cleaner = IdCleaner::new();
        assert_eq!(
            cleaner.clean_room_id("!abc123:matrix.example.org"),
            "!abc123"
        );
        assert_eq!(cleaner.clean_room_id("\"!abc123:server\""), "!abc123");
    }

    #[test]
    fn test_clean_room_id_no_match_strips_quotes() {
        let cleaner = IdCleaner::new();
        assert_eq!(cleaner.clean_room_id("\"general\""), "general");
    }

    #[test]
    fn test_clean_user_id() {
        let cleaner = IdCleaner::new();
        assert_eq!(cleaner.clean_user_id("@bob_99:example.org"), "bob_99");
        assert_eq!(cleaner.clean_user_id("bob_99:example.org"), "bob_99");
        assert_eq!(cleaner.clean_user_id("@some-user:server"), "some-user");
    }

    #[test]
    fn test_clean_user_id_plain_name() {
        let cleaner = IdCleaner::new();
        assert_eq!(cleaner.clean_user_id("\"plainname\""), "plainname");
    }

    #[test]
    fn test_clean_records_preserves_other_fields() {
        let cleaner = IdCleaner::new();
        let records = vec![json!({
            "chat_id": "!room1:server.org",
            "sender_alias": "@alice:server.org",
            "message": "hello",
            "timestamp": "2024-03-01T09:00:00Z"
        })];

        let cleaned = cleaner.clean_records(records);
        assert_eq!(cleaned[0]["chat_id"], "!room1");
        assert_eq!(cleaned[0]["sender_alias"], "alice");
        assert_eq!(cleaned[0]["message"], "hello");
        assert_eq!(cleaned[0]["timestamp"], "2024-03-01T09:00:00Z");
    }

    #[test]
    fn test_clean_records_skips_non_string_fields() {
        let cleaner = IdCleaner::new();
        let records = vec![json!({"chat_id": 42, "sender_alias": null})];
        let cleaned = cleaner.clean_records(records);
        assert_eq!(cleaned[0]["chat_id"], 42);
        assert_eq!(cleaned[0]["sender_alias"], Value::Null);
    }

    #[test]
    fn test_clean_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("dump.json");
        let output = dir.path().join("cleaned_dump.json");
        fs::write(
            &input,
            r#"[{"chat_id": "!r:s.org", "sender_alias": "@u:s.org", "message": "hi"}]"#,
        )
        .unwrap();

        let cleaner = IdCleaner::new();
        let records = cleaner.clean_file(&input, Some(&output)).unwrap();
        assert_eq!(records.len(), 1);

        let written: Vec<Value> =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written[0]["chat_id"], "!r");
        assert_eq!(written[0]["sender_alias"], "u");
    }

    #[test]
    fn test_clean_file_single_object() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("one.json");
        fs::write(&input, r#"{"chat_id": "!r:s.org"}"#).unwrap();

        let records = IdCleaner::new().clean_file(&input, None).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["chat_id"], "!r");
    }

    #[test]
    fn test_clean_file_rejects_scalar() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bad.json");
        fs::write(&input, "42").unwrap();

        let err = IdCleaner::new().clean_file(&input, None).unwrap_err();
        assert!(err.to_string().contains("expected a list"));
    }

    #[test]
    fn test_clean_file_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.json");
        fs::write(&input, "{oops").unwrap();

        let err = IdCleaner::new().clean_file(&input, None).unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_batch_clean_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        fs::write(dir.path().join("good.json"), r#"[{"chat_id": "!r:s"}]"#).unwrap();
        fs::write(dir.path().join("bad.json"), "{oops").unwrap();
        fs::write(dir.path().join("ignored.txt"), "not json").unwrap();

        let report = batch_clean(&IdCleaner::new(), dir.path(), &out, "*.json").unwrap();
        assert_eq!(report.cleaned.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert!(out.join("cleaned_good.json").exists());
        assert!(!out.join("cleaned_ignored.txt").exists());
    }

    #[test]
    fn test_pattern_to_regex() {
        let rx = pattern_to_regex("*.json").unwrap();
        assert!(rx.is_match("chat.json"));
        assert!(!rx.is_match("chat.jsonl"));
        assert!(!rx.is_match("chat.txt"));

        let rx = pattern_to_regex("log_?.json").unwrap();
        assert!(rx.is_match("log_1.json"));
        assert!(!rx.is_match("log_12.json"));
    }

    #[test]
    fn test_summarize() {
        let records = vec![
            json!({"chat_id": "!a", "sender_alias": "alice"}),
            json!({"chat_id": "!a", "sender_alias": "bob"}),
            json!({"chat_id": "!b", "sender_alias": "alice"}),
        ];
        let summary = summarize(&records);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.rooms, vec![("!a".into(), 2), ("!b".into(), 1)]);
        assert_eq!(summary.users, vec![("alice".into(), 2), ("bob".into(), 1)]);

        let text = summary.to_string();
        assert!(text.contains("Total messages: 3"));
        assert!(text.contains("!a: 2 messages"));
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize(&[]);
        assert_eq!(summary.total, 0);
        assert!(summary.to_string().contains("Total messages: 0"));
    }
}
