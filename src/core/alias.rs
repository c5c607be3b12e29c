//! Participant alias normalization.
//!
//! Research subjects show up in chat dumps under several raw usernames. An
//! [`AliasTable`] maps every known alias to one canonical primary name so
//! that all of a participant's messages land in the same conversation
//! bucket. Unknown identifiers pass through unchanged.
//!
//! The table loads from a JSON array of entries:
//!
//! ```json
//! [
//!   { "primary": "Robert", "aliases": ["bob", "bobby"] }
//! ]
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ChatcodeError, Result};

/// One alias-table entry: a canonical primary name and its aliases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliasEntry {
    /// Canonical name for this participant.
    pub primary: String,
    /// Raw usernames that should resolve to `primary`.
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Lookup table from raw identifiers to canonical participant names.
///
/// A primary always maps to itself; identifiers not in the table are
/// returned unchanged by [`canonical`](Self::canonical).
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    mapping: HashMap<String, String>,
}

impl AliasTable {
    /// Creates an empty table (every identifier passes through unchanged).
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from entries. Entries with an empty primary are
    /// skipped.
    pub fn from_entries(entries: impl IntoIterator<Item = AliasEntry>) -> Self {
        let mut mapping = HashMap::new();
        for entry in entries {
            if entry.primary.is_empty() {
                continue;
            }
            mapping.insert(entry.primary.clone(), entry.primary.clone());
            for alias in entry.aliases {
                mapping.insert(alias, entry.primary.clone());
            }
        }
        Self { mapping }
    }

    /// Loads a table from a JSON file of [`AliasEntry`] values.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let entries: Vec<AliasEntry> = serde_json::from_str(&content)
            .map_err(|e| ChatcodeError::parse_json(e, Some(path.to_path_buf())))?;
        Ok(Self::from_entries(entries))
    }

    /// Resolves a raw identifier to its canonical name.
    pub fn canonical<'a>(&'a self, raw: &'a str) -> &'a str {
        self.mapping.get(raw).map(String::as_str).unwrap_or(raw)
    }

    /// Number of known identifiers (primaries plus aliases).
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    /// Returns `true` if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

/// Conversation identity: an unordered pair of canonical participant names.
///
/// The pair is stored sorted, so `new("bob", "alice")` and
/// `new("alice", "bob")` compare equal and index the same bucket. `Ord`
/// makes conversation maps iterate deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConversationKey {
    first: String,
    second: String,
}

impl ConversationKey {
    /// Builds a key from two participant names, in either order.
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Self {
                first: a,
                second: b,
            }
        } else {
            Self {
                first: b,
                second: a,
            }
        }
    }

    /// Lexicographically smaller participant.
    pub fn first(&self) -> &str {
        &self.first
    }

    /// Lexicographically larger participant.
    pub fn second(&self) -> &str {
        &self.second
    }

    /// Returns `true` if `user` is one of the two participants.
    pub fn contains(&self, user: &str) -> bool {
        self.first == user || self.second == user
    }
}

impl std::fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} & {}", self.first, self.second)
    }
}
