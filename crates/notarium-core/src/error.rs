//! Error types for the notarium client.

use thiserror::Error;

use crate::models::{FileId, NoteId};

/// Result type alias using notarium's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for notarium operations.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP/network request failed (wraps reqwest::Error)
    #[error("Request error: {0}")]
    Request(String),

    /// Backend answered with a non-success status
    #[error("Backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    /// Reparent target is the note itself or one of its descendants
    #[error("Cycle error: note {note_id} cannot be moved under {target_id}")]
    Cycle { note_id: NoteId, target_id: NoteId },

    /// Invalid input, rejected before any request is sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// Note not found
    #[error("Note not found: {0}")]
    NoteNotFound(NoteId),

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(FileId),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
