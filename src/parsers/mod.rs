//! Chat-log parsers.
//!
//! - [`MatrixParser`] - the research chat-log JSON dumps (pairwise and
//!   group-chat record shapes)
//! - [`load_chat_logs`] - multi-file ingest with skip-and-continue error
//!   handling for batch runs

use std::path::PathBuf;

use crate::Message;
use crate::error::{ChatcodeError, file_not_found};

mod matrix;

pub use matrix::{MatrixParser, parse_timestamp};

/// Result of ingesting a set of chat-log files.
///
/// Per-file failures never abort the ingest; they are collected in
/// `skipped` so the caller can report them.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    /// All messages from the files that parsed, in file order.
    pub messages: Vec<Message>,
    /// Files that contributed nothing, with the reason.
    pub skipped: Vec<(PathBuf, ChatcodeError)>,
}

/// Parses every path with [`MatrixParser`], skipping files that are
/// missing or malformed.
pub fn load_chat_logs(paths: &[PathBuf]) -> LoadOutcome {
    let parser = MatrixParser::new();
    let mut outcome = LoadOutcome::default();

    for path in paths {
        if !path.exists() {
            outcome.skipped.push((path.clone(), file_not_found(path)));
            continue;
        }
        match parser.parse(path) {
            Ok(mut messages) => outcome.messages.append(&mut messages),
            Err(e) => outcome.skipped.push((path.clone(), e)),
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_chat_logs_skip_and_continue() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.json");
        let bad = dir.path().join("bad.json");
        let missing = dir.path().join("missing.json");
        std::fs::write(
            &good,
            r#"[{"ts": "2024-03-01T09:00:00", "from": "a", "to": "b", "body": "hi"}]"#,
        )
        .unwrap();
        std::fs::write(&bad, "{oops").unwrap();

        let outcome = load_chat_logs(&[good, bad.clone(), missing.clone()]);

        assert_eq!(outcome.messages.len(), 1);
        assert_eq!(outcome.skipped.len(), 2);
        assert_eq!(outcome.skipped[0].0, bad);
        assert!(outcome.skipped[0].1.is_parse());
        assert_eq!(outcome.skipped[1].0, missing);
        assert!(outcome.skipped[1].1.is_io());
    }

    #[test]
    fn test_load_chat_logs_empty_input() {
        let outcome = load_chat_logs(&[]);
        assert!(outcome.messages.is_empty());
        assert!(outcome.skipped.is_empty());
    }
}
