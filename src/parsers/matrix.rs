//! Matrix chat-log JSON parser.
//!
//! Handles both record shapes the research exports use:
//!
//! ```json
//! [
//!   {"ts": "2024-03-01T09:00:00", "from": "alice", "to": "bob", "body": "hi"},
//!   {"timestamp": "2024-03-01T09:00:00Z", "chat_id": "!abc123",
//!    "sender_alias": "alice", "message": "hi", "message_translated": "hallo"}
//! ]
//! ```
//!
//! Field pairs (`ts`/`timestamp`, `from`/`sender_alias`, `body`/`message`)
//! are accepted interchangeably; unknown fields are ignored. Timestamps are
//! ISO-8601, with or without an offset (naive times count as UTC). A record
//! that fails to parse fails the whole file — batch callers treat that as a
//! skip, not a crash.

use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::Message;
use crate::error::{ChatcodeError, Result};

/// Parser for the research chat-log JSON dumps.
///
/// # Example
///
/// ```rust,no_run
/// use chatcode::parsers::MatrixParser;
///
/// let parser = MatrixParser::new();
/// let messages = parser.parse("chat_log.json".as_ref())?;
/// # Ok::<(), chatcode::ChatcodeError>(())
/// ```
pub struct MatrixParser;

impl MatrixParser {
    pub fn new() -> Self {
        Self
    }

    pub fn name(&self) -> &'static str {
        "Matrix JSON"
    }

    /// Parses a chat-log file into messages.
    pub fn parse(&self, path: &Path) -> Result<Vec<Message>> {
        let content = fs::read_to_string(path)?;
        self.parse_str(&content)
            .map_err(|e| e.with_path(Some(path.to_path_buf())))
    }

    /// Parses chat-log JSON from a string.
    pub fn parse_str(&self, content: &str) -> Result<Vec<Message>> {
        let records: Vec<MatrixRecord> =
            serde_json::from_str(content).map_err(|e| ChatcodeError::parse_json(e, None))?;

        records
            .into_iter()
            .map(|record| {
                let timestamp = parse_timestamp(&record.timestamp)?;
                let mut message = Message::new(timestamp, record.sender_alias, record.message);
                if let Some(to) = record.to {
                    message = message.with_receiver(to);
                }
                if let Some(chat_id) = record.chat_id {
                    message = message.with_chat_id(chat_id);
                }
                if let Some(translated) = record.message_translated {
                    message = message.with_translated(translated);
                }
                Ok(message)
            })
            .collect()
    }
}

impl Default for MatrixParser {
    fn default() -> Self {
        Self::new()
    }
}

// Internal structure covering both export record shapes
#[derive(Debug, Deserialize)]
struct MatrixRecord {
    /// ISO-8601 timestamp string
    #[serde(alias = "ts")]
    timestamp: String,
    /// Sender identifier
    #[serde(alias = "from")]
    sender_alias: String,
    /// Receiver identifier (pairwise logs only)
    #[serde(default)]
    to: Option<String>,
    /// Room identifier (group logs only)
    #[serde(default)]
    chat_id: Option<String>,
    /// Message text
    #[serde(alias = "body")]
    message: String,
    /// Translated text, if the export carried one
    #[serde(default)]
    message_translated: Option<String>,
}

/// Parses an ISO-8601 timestamp, treating naive times as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(ChatcodeError::parse_timestamp(raw))
}
