//! Conversation bucketing and turn assembly.
//!
//! [`ConversationMap`] takes a flat pile of pairwise messages, canonicalizes
//! the participants through an [`AliasTable`], buckets them by unordered
//! pair and sorts each bucket by time. [`ConversationTurns`] is the final
//! derived artifact: every bucket grouped into same-day units and segmented
//! into speaker turns, ready for rendering.
//!
//! Both structures are plain read-only values built once per batch run and
//! passed explicitly to whatever consumes them.

use std::collections::BTreeMap;
use std::collections::HashMap;

use crate::Message;
use crate::core::alias::{AliasTable, ConversationKey};
use crate::core::turns::{Unit, segment_units};

/// Pairwise messages bucketed by canonical participant pair.
#[derive(Debug, Clone, Default)]
pub struct ConversationMap {
    conversations: BTreeMap<ConversationKey, Vec<Message>>,
    ingested: usize,
}

impl ConversationMap {
    /// Buckets messages by the unordered pair of canonical sender/receiver.
    ///
    /// Sender and receiver are rewritten to their canonical names, so
    /// downstream code (alignment in the renderer, most notably) compares
    /// against canonical identities only. Each bucket is sorted by
    /// timestamp. Messages without a receiver get an empty-string
    /// counterpart, matching how bare records behave in the source dumps.
    pub fn from_messages(messages: Vec<Message>, aliases: &AliasTable) -> Self {
        let ingested = messages.len();
        let mut conversations: BTreeMap<ConversationKey, Vec<Message>> = BTreeMap::new();

        for mut msg in messages {
            let sender = aliases.canonical(&msg.sender).to_string();
            let receiver = aliases
                .canonical(msg.receiver.as_deref().unwrap_or_default())
                .to_string();
            let key = ConversationKey::new(sender.clone(), receiver.clone());

            msg.sender = sender;
            msg.receiver = Some(receiver);
            conversations.entry(key).or_default().push(msg);
        }

        for bucket in conversations.values_mut() {
            bucket.sort_by_key(|msg| msg.timestamp);
        }

        Self {
            conversations,
            ingested,
        }
    }

    /// Number of distinct conversations.
    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    /// Returns `true` if no conversations were built.
    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    /// Messages ingested before bucketing.
    pub fn ingested(&self) -> usize {
        self.ingested
    }

    /// Messages currently held across all buckets. Anything other than
    /// [`ingested`](Self::ingested) indicates a bookkeeping bug upstream.
    pub fn message_count(&self) -> usize {
        self.conversations.values().map(Vec::len).sum()
    }

    /// The sorted messages between two users, looked up in either order.
    pub fn get(&self, user_i: &str, user_j: &str) -> Option<&[Message]> {
        self.conversations
            .get(&ConversationKey::new(user_i, user_j))
            .map(Vec::as_slice)
    }

    /// Iterates conversations in deterministic key order.
    pub fn iter(&self) -> impl Iterator<Item = (&ConversationKey, &[Message])> {
        self.conversations
            .iter()
            .map(|(key, messages)| (key, messages.as_slice()))
    }

    /// Segments every conversation into date units and speaker turns.
    pub fn into_turns(self) -> ConversationTurns {
        let conversations = self
            .conversations
            .into_iter()
            .map(|(key, messages)| (key, segment_units(messages)))
            .collect();
        ConversationTurns { conversations }
    }
}

/// Fully segmented conversations: key -> date units -> speaker turns.
#[derive(Debug, Clone, Default)]
pub struct ConversationTurns {
    conversations: BTreeMap<ConversationKey, Vec<Unit>>,
}

impl ConversationTurns {
    /// Number of conversations.
    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    /// Returns `true` if there are no conversations.
    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    /// The units between two users, looked up in either order.
    pub fn get(&self, user_i: &str, user_j: &str) -> Option<&[Unit]> {
        self.conversations
            .get(&ConversationKey::new(user_i, user_j))
            .map(Vec::as_slice)
    }

    /// Iterates conversations in deterministic key order.
    pub fn iter(&self) -> impl Iterator<Item = (&ConversationKey, &[Unit])> {
        self.conversations
            .iter()
            .map(|(key, units)| (key, units.as_slice()))
    }
}

/// The sender with the most messages, ties broken by first appearance.
///
/// Used by the group-chat pipeline to pick a "main user" when none is
/// given. Returns `None` for an empty slice.
pub fn most_active_sender(messages: &[Message]) -> Option<&str> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for msg in messages {
        *counts.entry(msg.sender.as_str()).or_insert(0) += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for msg in messages {
        let count = counts[msg.sender.as_str()];
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((msg.sender.as_str(), count));
        }
    }
    best.map(|(sender, _)| sender)
}
