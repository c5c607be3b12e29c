//! Core processing logic for chatcode.
//!
//! This module contains:
//! - [`turns`] - Turn segmentation and same-day unit grouping
//! - [`alias`] - Participant alias normalization and conversation keys
//! - [`conversations`] - Conversation bucketing and turn assembly
//!
//! # Quick Start
//!
//! ```rust
//! use chatcode::core::{
//!     AliasTable, ConversationMap, Turn, Unit,
//!     segment_turns, segment_units,
//! };
//! ```

pub mod alias;
pub mod conversations;
pub mod turns;

// Re-export main types for convenience
pub use alias::{AliasEntry, AliasTable, ConversationKey};
pub use conversations::{ConversationMap, ConversationTurns, most_active_sender};
pub use turns::{TURN_BREAK_SECONDS, Turn, Unit, group_by_date, segment_turns, segment_units};

// Re-export Message from the crate root
pub use crate::Message;
