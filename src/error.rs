//! Unified error types for chatcode.
//!
//! This module provides a single [`ChatcodeError`] enum that covers all error
//! cases in the library, with a crate-wide [`Result`] alias.
//!
//! Library users get typed errors they can match on; the CLI turns them into
//! printed diagnostics. Batch operations never bubble a per-file error up as
//! a hard failure — they collect it and continue with the remaining files.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// A specialized [`Result`] type for chatcode operations.
pub type Result<T> = std::result::Result<T, ChatcodeError>;

/// The error type for all chatcode operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatcodeError {
    /// An I/O error occurred (missing input, permission denied, full disk).
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Failed to parse a chat-log file.
    ///
    /// Contains the underlying parse error and, if available, the file path.
    #[error("Failed to parse chat log{}: {source}", path.as_ref().map(|p| format!(" (file: {})", p.display())).unwrap_or_default())]
    Parse {
        /// The underlying parse error
        #[source]
        source: ParseErrorKind,
        /// The file path, if available
        path: Option<PathBuf>,
    },

    /// JSON serialization error while writing output.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input doesn't have the expected structure.
    ///
    /// This occurs when a chat dump is neither a JSON array nor a single
    /// object, or when a batch file pattern cannot be compiled.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description of what's wrong
        message: String,
    },

    /// A dropdown configuration failed validation at load time.
    #[error("Invalid dropdown configuration '{name}': {message}")]
    InvalidDropdown {
        /// The `name` field of the offending configuration
        name: String,
        /// Description of what's wrong
        message: String,
    },

    /// No conversation exists between the requested user pair.
    #[error("No conversation found between {user_i} and {user_j}")]
    MissingConversation {
        /// First requested participant
        user_i: String,
        /// Second requested participant
        user_j: String,
    },
}

/// Kinds of parse errors that can occur.
#[derive(Debug, Error)]
pub enum ParseErrorKind {
    /// JSON parsing error
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// Timestamp not in a recognized ISO-8601 shape
    #[error("unrecognized timestamp '{0}'")]
    Timestamp(String),
    /// Generic parsing error
    #[error("{0}")]
    Other(String),
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl ChatcodeError {
    /// Creates a parse error from a JSON decoding failure.
    pub fn parse_json(source: serde_json::Error, path: Option<PathBuf>) -> Self {
        ChatcodeError::Parse {
            source: ParseErrorKind::Json(source),
            path: None,
        }
        .with_path(path)
    }

    /// Creates a parse error for an unrecognized timestamp string.
    pub fn parse_timestamp(input: impl Into<String>) -> Self {
        ChatcodeError::Parse {
            source: ParseErrorKind::Timestamp(input.into()),
            path: None,
        }
    }

    /// Attaches a file path to a parse error; other variants pass through.
    #[must_use]
    pub fn with_path(self, new_path: Option<PathBuf>) -> Self {
        match self {
            ChatcodeError::Parse { source, path } => ChatcodeError::Parse {
                source,
                path: new_path.or(path),
            },
            other => other,
        }
    }

    /// Creates an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        ChatcodeError::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a dropdown validation error.
    pub fn invalid_dropdown(name: impl Into<String>, message: impl Into<String>) -> Self {
        ChatcodeError::InvalidDropdown {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a missing-conversation error for a user pair.
    pub fn missing_conversation(user_i: impl Into<String>, user_j: impl Into<String>) -> Self {
        ChatcodeError::MissingConversation {
            user_i: user_i.into(),
            user_j: user_j.into(),
        }
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, ChatcodeError::Io(_))
    }

    /// Returns `true` if this is a parse error.
    pub fn is_parse(&self) -> bool {
        matches!(self, ChatcodeError::Parse { .. })
    }

    /// Returns `true` if this is a missing-conversation error.
    pub fn is_missing_conversation(&self) -> bool {
        matches!(self, ChatcodeError::MissingConversation { .. })
    }
}

/// Shorthand for the "file does not exist" error batch loops record when
/// they skip a path without trying to open it.
pub fn file_not_found(path: &Path) -> ChatcodeError {
    ChatcodeError::Io(io::Error::new(
        io::ErrorKind::NotFound,
        format!("file not found: {}", path.display()),
    ))
}

// ============================================================================
// Tests
// ============================================================================
