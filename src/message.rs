//! Normalized message type for exported chat logs.
//!
//! All parsers convert their native record shapes into [`Message`], so the
//! segmentation and rendering code never sees format differences.
//!
//! A message always carries a timestamp and a sender — every downstream
//! operation sorts or groups on those two fields. The receiver is only
//! present in pairwise direct-message logs, the chat id only in group-chat
//! logs, and a translation only where the export provided one.
//!
//! # Example
//!
//! ```
//! use chatcode::Message;
//! use chrono::{TimeZone, Utc};
//!
//! let ts = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
//! let msg = Message::new(ts, "alice", "good morning").with_receiver("bob");
//!
//! assert_eq!(msg.sender, "alice");
//! assert_eq!(msg.receiver.as_deref(), Some("bob"));
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single chat message, normalized from any supported log shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// When the message was sent.
    pub timestamp: DateTime<Utc>,

    /// Sender identifier (raw or canonicalized, depending on pipeline stage).
    pub sender: String,

    /// Receiver identifier; present only in pairwise direct-message logs.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub receiver: Option<String>,

    /// Room identifier; present only in group-chat logs.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub chat_id: Option<String>,

    /// Text content of the message.
    pub content: String,

    /// Translated text, where the export carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub translated: Option<String>,
}

impl Message {
    /// Creates a new message with timestamp, sender and content.
    ///
    /// Receiver, chat id and translation are set to `None`.
    pub fn new(
        timestamp: DateTime<Utc>,
        sender: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            sender: sender.into(),
            receiver: None,
            chat_id: None,
            content: content.into(),
            translated: None,
        }
    }

    /// Builder method to set the receiver.
    #[must_use]
    pub fn with_receiver(mut self, receiver: impl Into<String>) -> Self {
        self.receiver = Some(receiver.into());
        self
    }

    /// Builder method to set the chat id.
    #[must_use]
    pub fn with_chat_id(mut self, chat_id: impl Into<String>) -> Self {
        self.chat_id = Some(chat_id.into());
        self
    }

    /// Builder method to set the translated text.
    #[must_use]
    pub fn with_translated(mut self, translated: impl Into<String>) -> Self {
        self.translated = Some(translated.into());
        self
    }

    /// Calendar date of the message, used for unit grouping.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// Returns the translation if it exists and differs from the original
    /// text. Identical translations are noise and get dropped at render time.
    pub fn translation(&self) -> Option<&str> {
        match self.translated.as_deref() {
            Some(t) if !t.is_empty() && t != self.content => Some(t),
            _ => None,
        }
    }

    /// Returns `true` if this message's content is empty or whitespace-only.
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}
