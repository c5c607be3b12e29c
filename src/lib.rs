//! # Chatcode
//!
//! A Rust library for preparing exported chat logs for qualitative coding.
//!
//! ## Overview
//!
//! Chatcode covers the batch steps of a chat-coding research workflow:
//!
//! - **Cleaning** — strip Matrix server suffixes and stray quoting from
//!   `chat_id` / `sender_alias` fields of exported JSON dumps
//! - **Conversation assembly** — normalize participants through an alias
//!   table and bucket messages into unordered-pair conversations
//! - **Turn segmentation** — partition time-sorted messages into speaker
//!   turns (same sender, gaps of at most 30 minutes), optionally grouped
//!   into same-day units
//! - **Annotation pages** — render self-contained HTML pages with
//!   configurable dropdown widgets and client-side CSV export
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chatcode::prelude::*;
//! use std::path::Path;
//!
//! fn main() -> Result<()> {
//!     let parser = MatrixParser::new();
//!     let mut messages = parser.parse(Path::new("chat_log.json"))?;
//!     messages.sort_by_key(|m| m.timestamp);
//!
//!     let turns = segment_turns(messages);
//!     let html = render_group_page("!abc123", "alice", &turns, &sample_configs());
//!
//!     std::fs::write("group_chat_abc123.html", html)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! - [`core`] — Turn segmentation, unit grouping, alias normalization,
//!   conversation bucketing
//! - [`parsers`] — Chat-log JSON parsers ([`MatrixParser`](parsers::MatrixParser))
//! - [`clean`] — Identifier cleanup ([`IdCleaner`](clean::IdCleaner), batch mode, summaries)
//! - [`annotate`] — Dropdown configuration schema and HTML page rendering
//! - [`cli`] — CLI argument types (requires the `cli` feature)
//! - [`error`] — Unified error types ([`ChatcodeError`], [`Result`])
//! - [`prelude`] — Convenient re-exports

pub mod annotate;
pub mod clean;
#[cfg(feature = "cli")]
pub mod cli;
pub mod core;
pub mod error;
pub mod message;
pub mod parsers;

// Re-export the main types at the crate root for convenience
pub use error::{ChatcodeError, Result};
pub use message::Message;

/// Convenient re-exports for common usage.
///
/// Import everything you need with a single line:
///
/// ```rust
/// use chatcode::prelude::*;
/// ```
pub mod prelude {
    // Core message type
    pub use crate::Message;

    // Error types
    pub use crate::error::{ChatcodeError, Result};

    // Segmentation
    pub use crate::core::{
        TURN_BREAK_SECONDS, Turn, Unit, group_by_date, segment_turns, segment_units,
    };

    // Participants and conversations
    pub use crate::core::{
        AliasTable, ConversationKey, ConversationMap, ConversationTurns, most_active_sender,
    };

    // Identifier cleaning
    pub use crate::clean::{IdCleaner, summarize};

    // Parsing
    pub use crate::parsers::{MatrixParser, load_chat_logs};

    // Annotation pages
    pub use crate::annotate::{
        DropdownConfig, DropdownOptions, load_dropdown_configs, render_conversation_page,
        render_group_page, sample_configs,
    };
}
