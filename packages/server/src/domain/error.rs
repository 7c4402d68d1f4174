//! Domain-level error types.

use std::path::PathBuf;

use thiserror::Error;

use super::ConnectionId;

/// Value object validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("display name must not be empty")]
    EmptyDisplayName,

    #[error("display name is longer than {max} characters")]
    DisplayNameTooLong { max: usize },

    #[error("display name must not contain control characters")]
    InvalidDisplayName,
}

/// Session registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Connection identities are unique; seeing one twice is an invariant violation.
    #[error("connection {0} is already registered")]
    DuplicateConnection(ConnectionId),

    #[error("registry is full ({max} connections)")]
    CapacityExceeded { max: usize },
}

/// Transcript persistence errors
#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("failed to read transcript {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write transcript {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
